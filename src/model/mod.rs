//! Data models for projects and their taxonomy.

mod entries;
mod entry;
mod path_class;

pub use entries::ImageEntries;
pub use entry::ImageEntry;
pub use path_class::{CLASS_SEPARATOR, PathClass};
