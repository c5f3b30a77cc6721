//! Image server abstraction.
//!
//! A *server* decodes pixel data and metadata from one image file; a
//! *builder* is a factory that knows whether it can construct a server
//! for a given file. Builders are discovered through the
//! [`ServerRegistry`], whose registration order defines the preference
//! order — callers take the first supporting builder and never re-rank.

mod raster;
mod registry;

pub use raster::RasterBuilder;
pub use registry::ServerRegistry;

use std::path::Path;

use image::DynamicImage;

use crate::error::ProjectError;

/// A runtime object that can decode an image file.
pub trait ImageServer {
    /// URI of the backing image file.
    fn uri(&self) -> &str;

    /// Number of z-slices in the image.
    fn n_z_slices(&self) -> usize;

    /// Number of timepoints in the image.
    fn n_timepoints(&self) -> usize;

    /// Default thumbnail for a z-slice and timepoint, at full resolution.
    fn default_thumbnail(&self, z: usize, t: usize) -> Result<DynamicImage, ProjectError>;

    /// Canonical display name for the image.
    fn displayable_name(&self) -> String;
}

/// A factory that can construct a server for a specific image file.
pub trait ServerBuilder {
    /// Unique identifier for this builder.
    fn id(&self) -> &'static str;

    /// Whether this builder can handle the given file.
    fn supports(&self, path: &Path) -> bool;

    /// Construct a server reading the given file.
    fn build(&self, path: &Path) -> Result<Box<dyn ImageServer>, ProjectError>;
}
