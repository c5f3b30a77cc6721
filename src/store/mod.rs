//! Backing store for projects.
//!
//! A project's backing store is a directory holding a `project.json` file
//! plus a `thumbnails/` subdirectory with one PNG per entry. The store is
//! the single owner of all persisted project state; the container and the
//! entry handles read through it and never cache independently.

mod json;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use image::DynamicImage;

use crate::error::ProjectError;
use crate::model::PathClass;

/// File name of the project file inside the backing store directory.
pub const PROJECT_FILE_NAME: &str = "project.json";

/// Directory name for entry thumbnails inside the backing store.
const THUMBNAIL_DIR: &str = "thumbnails";

/// Shared handle to a project store.
///
/// Single-threaded by design: the container, its entries view, and every
/// entry handle alias the same store, so the whole object graph is
/// deliberately `!Send`/`!Sync`.
pub(crate) type SharedStore = Rc<RefCell<ProjectStore>>;

/// One image registration record inside the store.
#[derive(Debug, Clone)]
pub(crate) struct EntryRecord {
    pub id: u64,
    pub image_name: String,
    pub image_uri: String,
    pub metadata: HashMap<String, String>,
    /// Thumbnail file name under `thumbnails/`, once persisted
    pub thumbnail_file: Option<String>,
    /// Thumbnail attached since the last sync, not yet written
    pub pending_thumbnail: Option<DynamicImage>,
}

/// In-memory state of one backing store.
#[derive(Debug)]
pub(crate) struct ProjectStore {
    file: PathBuf,
    uri: String,
    uri_previous: Option<String>,
    version: String,
    timestamp_creation: i64,
    timestamp_modification: i64,
    path_classes: Vec<PathClass>,
    entries: Vec<EntryRecord>,
    next_entry_id: u64,
}

impl ProjectStore {
    /// Create a fresh, empty store rooted at `file`.
    ///
    /// Nothing is written to disk until [`ProjectStore::sync_changes`].
    pub fn create(file: PathBuf) -> Self {
        let now = now_millis();
        let uri = file_uri(&file);
        Self {
            file,
            uri,
            uri_previous: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp_creation: now,
            timestamp_modification: now,
            path_classes: Vec::new(),
            entries: Vec::new(),
            next_entry_id: 1,
        }
    }

    /// Load an existing store from its project file.
    pub fn load(file: PathBuf) -> Result<Self, ProjectError> {
        json::load(file)
    }

    /// Flush all pending state to disk.
    ///
    /// Writes pending thumbnails as PNGs, refreshes the modification
    /// timestamp, and rewrites the project file. All fallible work runs
    /// before any in-memory state changes, so a failed sync leaves the
    /// store exactly as it was.
    pub fn sync_changes(&mut self) -> Result<(), ProjectError> {
        let dir = self.dir().to_path_buf();
        std::fs::create_dir_all(&dir)?;

        let has_pending = self.entries.iter().any(|e| e.pending_thumbnail.is_some());
        if has_pending {
            std::fs::create_dir_all(dir.join(THUMBNAIL_DIR))?;
        }
        let mut written: Vec<(u64, String)> = Vec::new();
        for entry in &self.entries {
            if let Some(thumbnail) = &entry.pending_thumbnail {
                let file_name = format!("{}.png", entry.id);
                thumbnail.save(dir.join(THUMBNAIL_DIR).join(&file_name))?;
                written.push((entry.id, file_name));
            }
        }

        let modified = now_millis();
        json::save(self, modified, &written)?;

        for (id, file_name) in written {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
                entry.pending_thumbnail = None;
                entry.thumbnail_file = Some(file_name);
            }
        }
        self.timestamp_modification = modified;
        log::debug!("synced project store at {:?}", self.file);
        Ok(())
    }

    /// Path of the project file.
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Directory containing the backing store.
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new(""))
    }

    /// URI identifying the project's current location.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Last known prior location, if the store has been relocated.
    pub fn uri_previous(&self) -> Option<&str> {
        self.uri_previous.as_deref()
    }

    /// Project name, derived from the URI.
    ///
    /// The default project file name is not descriptive, so the
    /// containing directory names the project in that case.
    pub fn name(&self) -> String {
        let stem = self
            .file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if format!("{stem}.json") == PROJECT_FILE_NAME {
            if let Some(dir_name) = self.dir().file_name() {
                return dir_name.to_string_lossy().into_owned();
            }
        }
        stem
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn timestamp_creation(&self) -> i64 {
        self.timestamp_creation
    }

    pub fn timestamp_modification(&self) -> i64 {
        self.timestamp_modification
    }

    /// Ordered snapshot of the taxonomy.
    pub fn path_classes(&self) -> Vec<PathClass> {
        self.path_classes.clone()
    }

    /// Replace the taxonomy wholesale.
    pub fn set_path_classes(&mut self, path_classes: Vec<PathClass>) {
        self.path_classes = path_classes;
        self.touch();
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entry ids in backing-store order.
    pub fn entry_ids(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Register a new entry for an image URI and return its id.
    pub fn add_entry(&mut self, image_uri: String) -> u64 {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        self.entries.push(EntryRecord {
            id,
            image_name: String::new(),
            image_uri,
            metadata: HashMap::new(),
            thumbnail_file: None,
            pending_thumbnail: None,
        });
        self.touch();
        id
    }

    pub fn entry(&self, id: u64) -> Option<&EntryRecord> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entry_mut(&mut self, id: u64) -> Option<&mut EntryRecord> {
        let entry = self.entries.iter_mut().find(|e| e.id == id);
        if entry.is_some() {
            self.timestamp_modification = now_millis();
        }
        entry
    }

    /// Thumbnail for an entry: the pending image if one is attached,
    /// otherwise read back from the thumbnails directory.
    pub fn thumbnail(&self, id: u64) -> Result<Option<DynamicImage>, ProjectError> {
        let Some(entry) = self.entry(id) else {
            return Ok(None);
        };
        if let Some(pending) = &entry.pending_thumbnail {
            return Ok(Some(pending.clone()));
        }
        match &entry.thumbnail_file {
            Some(file_name) => {
                let path = self.dir().join(THUMBNAIL_DIR).join(file_name);
                Ok(Some(image::open(path)?))
            }
            None => Ok(None),
        }
    }

    fn touch(&mut self) {
        self.timestamp_modification = now_millis();
    }
}

/// Current system time in epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// `file://` URI for a filesystem path.
pub(crate) fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
