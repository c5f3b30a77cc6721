//! Lazy view over a project's image entries.

use crate::error::ProjectError;
use crate::model::ImageEntry;
use crate::store::SharedStore;

/// Sized, iterable view over the entries of one project.
///
/// The view holds no entry data of its own: length and iteration are
/// recomputed from the backing store on every call, so it never goes
/// stale within a process.
#[derive(Clone)]
pub struct ImageEntries {
    store: SharedStore,
}

impl ImageEntries {
    pub(crate) fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Number of entries in the backing store.
    pub fn len(&self) -> usize {
        self.store.borrow().len()
    }

    /// Whether the project has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry at a position in backing-store order.
    pub fn get(&self, index: usize) -> Option<ImageEntry> {
        let id = *self.store.borrow().entry_ids().get(index)?;
        Some(ImageEntry::new(self.store.clone(), id))
    }

    /// Iterate over the entries in backing-store order.
    pub fn iter(&self) -> impl Iterator<Item = ImageEntry> + use<> {
        let store = self.store.clone();
        let ids = store.borrow().entry_ids();
        ids.into_iter()
            .map(move |id| ImageEntry::new(store.clone(), id))
    }

    /// Membership test for an entry.
    ///
    /// Declared but not supported: a correct test needs a unique
    /// per-image identity that the backing layer does not yet define, so
    /// this always fails rather than guessing one.
    pub fn contains(&self, _entry: &ImageEntry) -> Result<bool, ProjectError> {
        Err(ProjectError::UnsupportedOperation(
            "entry membership test requires a per-image identity scheme".into(),
        ))
    }
}

impl IntoIterator for &ImageEntries {
    type Item = ImageEntry;
    type IntoIter = std::vec::IntoIter<ImageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter().collect::<Vec<_>>().into_iter()
    }
}

impl std::fmt::Debug for ImageEntries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.iter().map(|e| e.image_name()).collect();
        f.debug_tuple("ImageEntries").field(&names).finish()
    }
}
