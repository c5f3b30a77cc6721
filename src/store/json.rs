//! Serialized form of the project file.
//!
//! The on-disk structures are kept separate from the runtime store and
//! converted at the load/save boundary, so serde attributes never leak
//! into the working types.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::ProjectError;
use crate::model::PathClass;
use crate::store::{EntryRecord, ProjectStore, file_uri};

/// Project file contents.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    version: String,
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri_previous: Option<String>,
    timestamp_creation: i64,
    timestamp_modification: i64,
    #[serde(default)]
    path_classes: Vec<ClassFile>,
    #[serde(default)]
    images: Vec<EntryFile>,
}

/// One stored path class: ancestry id plus optional leaf color.
#[derive(Debug, Serialize, Deserialize)]
struct ClassFile {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

/// One stored image entry.
#[derive(Debug, Serialize, Deserialize)]
struct EntryFile {
    id: u64,
    image_name: String,
    image_uri: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thumbnail: Option<String>,
}

impl From<&PathClass> for ClassFile {
    fn from(class: &PathClass) -> Self {
        Self {
            id: class.id().to_string(),
            color: class.color().map(Color::to_hex),
        }
    }
}

impl TryFrom<&ClassFile> for PathClass {
    type Error = ProjectError;

    fn try_from(data: &ClassFile) -> Result<Self, ProjectError> {
        let color = data.color.as_deref().map(Color::from_hex).transpose()?;
        PathClass::from_parts(&data.id, color)
    }
}

impl From<&EntryRecord> for EntryFile {
    fn from(entry: &EntryRecord) -> Self {
        Self {
            id: entry.id,
            image_name: entry.image_name.clone(),
            image_uri: entry.image_uri.clone(),
            metadata: entry.metadata.clone(),
            thumbnail: entry.thumbnail_file.clone(),
        }
    }
}

impl From<EntryFile> for EntryRecord {
    fn from(data: EntryFile) -> Self {
        Self {
            id: data.id,
            image_name: data.image_name,
            image_uri: data.image_uri,
            metadata: data.metadata,
            thumbnail_file: data.thumbnail,
            pending_thumbnail: None,
        }
    }
}

/// Load a store from its project file.
pub(super) fn load(file: PathBuf) -> Result<ProjectStore, ProjectError> {
    let text = std::fs::read_to_string(&file)?;
    let data: ProjectFile = serde_json::from_str(&text)?;

    if data.version != env!("CARGO_PKG_VERSION") {
        log::warn!(
            "project version mismatch: expected {}, got {}",
            env!("CARGO_PKG_VERSION"),
            data.version
        );
    }

    let path_classes = data
        .path_classes
        .iter()
        .map(PathClass::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    // Detect relocation: the recorded uri stays authoritative as the
    // previous location once the file is found somewhere else.
    let current_uri = file_uri(&file);
    let (uri, uri_previous) = if data.uri != current_uri {
        (current_uri, Some(data.uri))
    } else {
        (data.uri, data.uri_previous)
    };

    let next_entry_id = data.images.iter().map(|e| e.id + 1).max().unwrap_or(1);
    let entries: Vec<EntryRecord> = data.images.into_iter().map(EntryRecord::from).collect();
    log::debug!("loaded project store at {file:?} with {} entries", entries.len());

    Ok(ProjectStore {
        file,
        uri,
        uri_previous,
        version: data.version,
        timestamp_creation: data.timestamp_creation,
        timestamp_modification: data.timestamp_modification,
        path_classes,
        entries,
        next_entry_id,
    })
}

/// Write a store back to its project file.
///
/// Serializes from the staged view the caller is about to commit: the
/// new modification timestamp and the thumbnail files written during
/// this sync. The in-memory store is not touched, so the caller can
/// commit only after the write succeeded.
pub(super) fn save(
    store: &ProjectStore,
    timestamp_modification: i64,
    thumbnails: &[(u64, String)],
) -> Result<(), ProjectError> {
    let images = store
        .entries
        .iter()
        .map(|entry| {
            let mut file = EntryFile::from(entry);
            if let Some((_, name)) = thumbnails.iter().find(|(id, _)| *id == entry.id) {
                file.thumbnail = Some(name.clone());
            }
            file
        })
        .collect();
    let data = ProjectFile {
        version: store.version.clone(),
        uri: store.uri.clone(),
        uri_previous: store.uri_previous.clone(),
        timestamp_creation: store.timestamp_creation,
        timestamp_modification,
        path_classes: store.path_classes.iter().map(ClassFile::from).collect(),
        images,
    };
    let json = serde_json::to_string_pretty(&data)?;
    std::fs::write(&store.file, json)?;
    Ok(())
}
