//! Project container for whole-slide image collections.
//!
//! A project is a named, persisted collection of image entries plus the
//! path-class taxonomy used to label regions of interest. All persisted
//! state lives in the backing store (a directory with a `project.json`);
//! the container orchestrates loading, image registration through the
//! server registry, taxonomy assignment, and saving.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorChoice};
use crate::error::ProjectError;
use crate::model::{ImageEntries, ImageEntry, PathClass};
use crate::server::ServerRegistry;
use crate::store::{PROJECT_FILE_NAME, ProjectStore, SharedStore, file_uri};

/// A project: one backing store plus the server registry used to resolve
/// image files into entries.
///
/// Exactly one `Project` may be open on a given backing store path within
/// a process; concurrent instances over the same path are unsupported.
pub struct Project {
    store: SharedStore,
    registry: ServerRegistry,
}

impl Project {
    /// Open the project at `path`, loading it when a backing store is
    /// already there and creating a fresh one otherwise.
    ///
    /// `path` may be the project file itself or the directory holding it;
    /// a directory resolves to its `project.json`. A fresh project lives
    /// in memory only until [`Project::save`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let file = resolve_project_file(path.as_ref())?;
        let store = if file.is_file() {
            log::debug!("loading project from {file:?}");
            ProjectStore::load(file)?
        } else {
            log::debug!("creating project at {file:?}");
            ProjectStore::create(file)
        };
        Ok(Self {
            store: Rc::new(RefCell::new(store)),
            registry: ServerRegistry::new(),
        })
    }

    /// Create a project in one call from plain settings.
    ///
    /// Fails if `project_path` exists. The taxonomy is assigned before
    /// any image is added, so tooling inspecting available classes at
    /// entry-creation time already sees them; `image_metadata` is merged
    /// into every new entry (collisions overwrite).
    pub fn from_settings(
        project_path: impl AsRef<Path>,
        image_paths: &[PathBuf],
        path_classes: Option<&[ClassSettings]>,
        image_metadata: Option<&HashMap<String, String>>,
        save: bool,
    ) -> Result<Self, ProjectError> {
        let project_path = project_path.as_ref();
        if project_path.exists() {
            return Err(ProjectError::AlreadyExists {
                path: project_path.to_path_buf(),
            });
        }
        std::fs::create_dir_all(project_path)?;

        let mut project = Self::open(project_path)?;

        if let Some(settings) = path_classes {
            let classes = build_classes(settings)?;
            project.set_path_classes(classes);
        }

        for image_path in image_paths {
            let entry = project.add_image(image_path)?;
            if let Some(metadata) = image_metadata {
                entry.update_metadata(metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }

        if save {
            project.save()?;
        }
        Ok(project)
    }

    /// Register an image file as a new entry.
    ///
    /// The preferred supporting builder from the registry constructs a
    /// server, which provides the entry's display name and its default
    /// thumbnail (middle z-slice, timepoint 0, full resolution). All
    /// fallible work happens before the entry is registered, so a failure
    /// leaves the entry collection untouched. Nothing is persisted until
    /// [`Project::save`].
    pub fn add_image(&mut self, filename: impl AsRef<Path>) -> Result<ImageEntry, ProjectError> {
        let image_path = std::path::absolute(filename.as_ref())?;

        let builders = self.registry.builders_for(&image_path);
        let Some(builder) = builders.first() else {
            return Err(ProjectError::unsupported_image(image_path));
        };

        let server = builder.build(&image_path)?;
        let image_name = server.displayable_name();
        let thumbnail = server.default_thumbnail(server.n_z_slices() / 2, 0)?;

        let id = self.store.borrow_mut().add_entry(file_uri(&image_path));
        let entry = ImageEntry::new(self.store.clone(), id);
        entry.set_image_name(image_name);
        entry.set_thumbnail(thumbnail);
        log::info!("added image {:?} as entry {id}", entry.image_name());
        Ok(entry)
    }

    /// The project's image entries.
    pub fn images(&self) -> ImageEntries {
        ImageEntries::new(self.store.clone())
    }

    /// Ordered snapshot of the taxonomy (not a live view).
    pub fn path_classes(&self) -> Vec<PathClass> {
        self.store.borrow().path_classes()
    }

    /// Replace the taxonomy wholesale with the given ordered classes.
    pub fn set_path_classes(&mut self, path_classes: impl IntoIterator<Item = PathClass>) {
        self.store
            .borrow_mut()
            .set_path_classes(path_classes.into_iter().collect());
    }

    /// Flush taxonomy and entry state to the backing store.
    pub fn save(&mut self) -> Result<(), ProjectError> {
        self.store.borrow_mut().sync_changes()
    }

    /// URI identifying the project's current location.
    pub fn uri(&self) -> String {
        self.store.borrow().uri().to_string()
    }

    /// Last known prior location, if the store has been relocated.
    pub fn uri_previous(&self) -> Option<String> {
        self.store.borrow().uri_previous().map(String::from)
    }

    /// Path of the project file.
    pub fn path(&self) -> PathBuf {
        self.store.borrow().file().to_path_buf()
    }

    /// Project name, derived from the URI.
    pub fn name(&self) -> String {
        self.store.borrow().name()
    }

    /// Version recorded in the backing store.
    pub fn version(&self) -> String {
        self.store.borrow().version().to_string()
    }

    /// Creation time, epoch milliseconds.
    pub fn timestamp_creation(&self) -> i64 {
        self.store.borrow().timestamp_creation()
    }

    /// Last modification time, epoch milliseconds.
    pub fn timestamp_modification(&self) -> i64 {
        self.store.borrow().timestamp_modification()
    }

    /// The server registry used to resolve image files.
    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Mutable access to the registry, e.g. to register custom builders.
    pub fn registry_mut(&mut self) -> &mut ServerRegistry {
        &mut self.registry
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("name", &self.name())
            .field("images", &self.images().len())
            .finish()
    }
}

/// Settings for constructing one path class in [`Project::from_settings`].
///
/// `parent` refers to the id of a class defined earlier in the same list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSettings {
    /// Leaf name of the class
    pub name: String,
    /// Id of the parent class, defined earlier in the list
    #[serde(default)]
    pub parent: Option<String>,
    /// Explicit `#RRGGBB` color; derived from the name when omitted
    #[serde(default)]
    pub color: Option<String>,
}

fn build_classes(settings: &[ClassSettings]) -> Result<Vec<PathClass>, ProjectError> {
    let mut classes: Vec<PathClass> = Vec::with_capacity(settings.len());
    for setting in settings {
        let parent = match &setting.parent {
            Some(parent_id) => Some(
                classes
                    .iter()
                    .find(|c| c.id() == parent_id)
                    .ok_or_else(|| {
                        ProjectError::invalid_record(format!(
                            "parent class {parent_id:?} is not defined earlier in the list"
                        ))
                    })?
                    .clone(),
            ),
            None => None,
        };
        let color = match &setting.color {
            Some(hex) => ColorChoice::Rgb(Color::from_hex(hex)?),
            None => ColorChoice::Auto,
        };
        classes.push(PathClass::create(
            Some(&setting.name),
            parent.as_ref(),
            color,
        )?);
    }
    Ok(classes)
}

/// Resolve an open path to the project file it denotes.
///
/// The result is canonical for existing files and absolute otherwise, so
/// the recorded uri never depends on how the caller spelled the path and
/// relocation detection cannot misfire on a relative or `..`-spelled
/// open of an unmoved project.
fn resolve_project_file(path: &Path) -> Result<PathBuf, ProjectError> {
    let file = if path.is_file()
        || (!path.is_dir() && path.extension().is_some_and(|ext| ext == "json"))
    {
        path.to_path_buf()
    } else {
        path.join(PROJECT_FILE_NAME)
    };
    if file.is_file() {
        Ok(std::fs::canonicalize(&file)?)
    } else {
        Ok(std::path::absolute(&file)?)
    }
}
