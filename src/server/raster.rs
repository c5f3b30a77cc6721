//! Built-in server for plain raster images.
//!
//! Covers every format the `image` crate can decode (PNG, JPEG, TIFF,
//! BMP, …). Raster files carry a single plane: one z-slice and one
//! timepoint.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::error::ProjectError;
use crate::server::{ImageServer, ServerBuilder};
use crate::store::file_uri;

/// Builder for [`RasterServer`].
pub struct RasterBuilder;

impl ServerBuilder for RasterBuilder {
    fn id(&self) -> &'static str {
        "raster"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(ImageFormat::from_extension)
            .is_some()
    }

    fn build(&self, path: &Path) -> Result<Box<dyn ImageServer>, ProjectError> {
        // Decoding up front surfaces unreadable files at build time
        let pixels = image::open(path)?;
        log::debug!("built raster server for {path:?}");
        Ok(Box::new(RasterServer {
            path: path.to_path_buf(),
            uri: file_uri(path),
            pixels,
        }))
    }
}

/// An image server over a single decoded raster image.
pub struct RasterServer {
    path: PathBuf,
    uri: String,
    pixels: DynamicImage,
}

impl ImageServer for RasterServer {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn n_z_slices(&self) -> usize {
        1
    }

    fn n_timepoints(&self) -> usize {
        1
    }

    fn default_thumbnail(&self, z: usize, t: usize) -> Result<DynamicImage, ProjectError> {
        if z >= self.n_z_slices() || t >= self.n_timepoints() {
            return Err(ProjectError::UnsupportedOperation(format!(
                "raster image has no plane (z={z}, t={t})"
            )));
        }
        Ok(self.pixels.clone())
    }

    fn displayable_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.uri.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn write_test_png(dir: &Path) -> PathBuf {
        let path = dir.join("slide.png");
        RgbImage::from_fn(4, 2, |x, y| image::Rgb([x as u8, y as u8, 7]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_supports_by_extension() {
        let builder = RasterBuilder;
        assert!(builder.supports(Path::new("a.png")));
        assert!(builder.supports(Path::new("a.JPG")));
        assert!(builder.supports(Path::new("a.tiff")));
        assert!(!builder.supports(Path::new("a.svs")));
        assert!(!builder.supports(Path::new("noextension")));
    }

    #[test]
    fn test_build_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path());

        let server = RasterBuilder.build(&path).unwrap();
        assert_eq!(server.n_z_slices(), 1);
        assert_eq!(server.n_timepoints(), 1);
        assert_eq!(server.displayable_name(), "slide.png");

        let thumbnail = server.default_thumbnail(0, 0).unwrap();
        assert_eq!((thumbnail.width(), thumbnail.height()), (4, 2));

        assert!(server.default_thumbnail(1, 0).is_err());
    }

    #[test]
    fn test_build_fails_on_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();
        assert!(RasterBuilder.build(&path).is_err());
    }
}
