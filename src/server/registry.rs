//! Registry for discovering image server builders.

use std::path::Path;

use crate::server::{RasterBuilder, ServerBuilder};

/// Registry of available image server builders.
///
/// Builders are kept in registration order, which is also the preference
/// order reported by [`ServerRegistry::builders_for`]. The built-in
/// raster builder is registered automatically on creation.
pub struct ServerRegistry {
    builders: Vec<Box<dyn ServerBuilder>>,
}

impl ServerRegistry {
    /// Create a new registry with the built-in builders registered.
    pub fn new() -> Self {
        let mut registry = Self {
            builders: Vec::new(),
        };
        registry.register(Box::new(RasterBuilder));
        registry
    }

    /// Create an empty registry with no builders.
    pub fn empty() -> Self {
        Self {
            builders: Vec::new(),
        }
    }

    /// Register a builder. Earlier registrations take preference.
    pub fn register(&mut self, builder: Box<dyn ServerBuilder>) {
        self.builders.push(builder);
    }

    /// Get a builder by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn ServerBuilder> {
        self.builders
            .iter()
            .find(|b| b.id() == id)
            .map(|b| b.as_ref())
    }

    /// Builders supporting the given file, in preference order.
    pub fn builders_for(&self, path: &Path) -> Vec<&dyn ServerBuilder> {
        self.builders
            .iter()
            .filter(|b| b.supports(path))
            .map(|b| b.as_ref())
            .collect()
    }

    /// All registered builders.
    pub fn all(&self) -> Vec<&dyn ServerBuilder> {
        self.builders.iter().map(|b| b.as_ref()).collect()
    }

    /// All registered builder IDs.
    pub fn ids(&self) -> Vec<&'static str> {
        self.builders.iter().map(|b| b.id()).collect()
    }
}

impl Default for ServerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectError;
    use crate::server::ImageServer;

    struct DummyBuilder(&'static str);

    impl ServerBuilder for DummyBuilder {
        fn id(&self) -> &'static str {
            self.0
        }

        fn supports(&self, _path: &Path) -> bool {
            true
        }

        fn build(&self, _path: &Path) -> Result<Box<dyn ImageServer>, ProjectError> {
            Err(ProjectError::UnsupportedOperation("dummy".into()))
        }
    }

    #[test]
    fn test_builtin_raster_builder() {
        let registry = ServerRegistry::new();
        assert!(registry.get("raster").is_some());
        assert!(registry.ids().contains(&"raster"));
    }

    #[test]
    fn test_builders_for_filters_by_support() {
        let registry = ServerRegistry::new();
        assert_eq!(registry.builders_for(Path::new("a.png")).len(), 1);
        assert!(registry.builders_for(Path::new("a.unknown-ext")).is_empty());
    }

    #[test]
    fn test_registration_order_is_preference_order() {
        let mut registry = ServerRegistry::empty();
        registry.register(Box::new(DummyBuilder("first")));
        registry.register(Box::new(DummyBuilder("second")));

        let builders = registry.builders_for(Path::new("a.anything"));
        assert_eq!(builders.len(), 2);
        assert_eq!(builders[0].id(), "first");
        assert_eq!(builders[1].id(), "second");
    }
}
