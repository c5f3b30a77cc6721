//! Image entry handle.

use std::collections::HashMap;

use image::DynamicImage;

use crate::error::ProjectError;
use crate::store::SharedStore;

/// One image's registration record inside a project.
///
/// An entry is a handle onto the project's backing store; every accessor
/// reads through to the store, so handles never go stale while the
/// project is mutated elsewhere in the process.
#[derive(Clone)]
pub struct ImageEntry {
    store: SharedStore,
    id: u64,
}

impl ImageEntry {
    pub(crate) fn new(store: SharedStore, id: u64) -> Self {
        Self { store, id }
    }

    /// Store-internal id of this entry.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Display name of the image.
    pub fn image_name(&self) -> String {
        self.store
            .borrow()
            .entry(self.id)
            .map(|e| e.image_name.clone())
            .unwrap_or_default()
    }

    /// Set the display name of the image.
    pub fn set_image_name(&self, name: impl Into<String>) {
        if let Some(entry) = self.store.borrow_mut().entry_mut(self.id) {
            entry.image_name = name.into();
        }
    }

    /// URI of the registered image file.
    pub fn image_uri(&self) -> String {
        self.store
            .borrow()
            .entry(self.id)
            .map(|e| e.image_uri.clone())
            .unwrap_or_default()
    }

    /// Snapshot of the entry metadata.
    pub fn metadata(&self) -> HashMap<String, String> {
        self.store
            .borrow()
            .entry(self.id)
            .map(|e| e.metadata.clone())
            .unwrap_or_default()
    }

    /// Value for one metadata key.
    pub fn metadata_value(&self, key: &str) -> Option<String> {
        self.store
            .borrow()
            .entry(self.id)
            .and_then(|e| e.metadata.get(key).cloned())
    }

    /// Insert one metadata key/value pair.
    pub fn insert_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        if let Some(entry) = self.store.borrow_mut().entry_mut(self.id) {
            entry.metadata.insert(key.into(), value.into());
        }
    }

    /// Merge key/value pairs into the metadata.
    ///
    /// Existing keys are overwritten on collision; keys not present in
    /// `pairs` are kept untouched.
    pub fn update_metadata<K, V>(&self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        if let Some(entry) = self.store.borrow_mut().entry_mut(self.id) {
            for (key, value) in pairs {
                entry.metadata.insert(key.into(), value.into());
            }
        }
    }

    /// The entry thumbnail, if one is attached or persisted.
    pub fn thumbnail(&self) -> Result<Option<DynamicImage>, ProjectError> {
        self.store.borrow().thumbnail(self.id)
    }

    /// Attach a thumbnail; written out on the next project save.
    pub fn set_thumbnail(&self, thumbnail: DynamicImage) {
        if let Some(entry) = self.store.borrow_mut().entry_mut(self.id) {
            entry.pending_thumbnail = Some(thumbnail);
        }
    }
}

impl std::fmt::Debug for ImageEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageEntry")
            .field("id", &self.id)
            .field("image_name", &self.image_name())
            .finish()
    }
}
