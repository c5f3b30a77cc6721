//! WSAT - Whole-Slide Annotation Toolkit
//!
//! A project container for whole-slide image analysis: persisted
//! collections of image entries, each labeled through a hierarchical
//! path-class taxonomy with deterministic identity and default coloring.
//!
//! ```rust,no_run
//! use wsat::{PathClass, Project};
//!
//! # fn main() -> Result<(), wsat::ProjectError> {
//! let mut project = Project::open("slides/project.json")?;
//! project.set_path_classes([PathClass::new("Tumor")?, PathClass::new("Stroma")?]);
//! project.add_image("slides/sample.png")?;
//! project.save()?;
//! # Ok(())
//! # }
//! ```

mod color;
mod error;
mod model;
mod project;
mod server;
mod store;

pub use color::{Color, ColorChoice};
pub use error::ProjectError;
pub use model::{CLASS_SEPARATOR, ImageEntries, ImageEntry, PathClass};
pub use project::{ClassSettings, Project};
pub use server::{ImageServer, RasterBuilder, ServerBuilder, ServerRegistry};
