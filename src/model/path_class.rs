//! Path class data model for hierarchical classification labels.
//!
//! Path classes form a forest: every class is either a root or derived
//! from a parent class. Identity is the full ancestry string (root to
//! leaf, joined with [`CLASS_SEPARATOR`]), which matches the ids stored
//! in existing project files.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::color::{Color, ColorChoice};
use crate::error::ProjectError;

/// Separator joining ancestry names into a class id.
pub const CLASS_SEPARATOR: &str = ": ";

/// A hierarchical classification label.
///
/// Two path classes are equal iff their ids are equal, regardless of how
/// each instance was built. The color is the only mutable part; name and
/// ancestry are fixed at construction.
#[derive(Debug, Clone)]
pub struct PathClass {
    name: String,
    parent: Option<Arc<PathClass>>,
    color: Option<Color>,
    id: String,
}

impl PathClass {
    /// Create a path class.
    ///
    /// `name` is the leaf label; it must be non-empty and must not
    /// contain a colon (colons are reserved for the ancestry separator).
    /// A missing name is rejected with two distinct errors: the unnamed
    /// root class (the "unclassified" sentinel) is a known unsupported
    /// case, while a missing leaf name under a parent is plainly invalid.
    ///
    /// `color` defaults to [`ColorChoice::Auto`], which derives a stable
    /// color from the name; pass [`ColorChoice::Unset`] for no color.
    pub fn create(
        name: Option<&str>,
        parent: Option<&PathClass>,
        color: ColorChoice,
    ) -> Result<Self, ProjectError> {
        let name = match (name, parent) {
            (Some(name), _) => name,
            (None, None) => {
                return Err(ProjectError::UnsupportedOperation(
                    "unnamed root class (the unclassified class) is not supported".into(),
                ));
            }
            (None, Some(_)) => {
                return Err(ProjectError::invalid_name(
                    "derived class requires a leaf name",
                ));
            }
        };
        if name.is_empty() {
            return Err(ProjectError::invalid_name("class name is empty"));
        }
        if name.contains(':') {
            return Err(ProjectError::invalid_name(format!(
                "class name {name:?} contains reserved character ':'"
            )));
        }

        let color = match color {
            ColorChoice::Auto => Some(Color::derived_from(name)),
            ColorChoice::Unset => None,
            ColorChoice::Rgb(color) => Some(color),
        };
        let id = match parent {
            Some(parent) => format!("{}{}{}", parent.id, CLASS_SEPARATOR, name),
            None => name.to_string(),
        };
        Ok(Self {
            name: name.to_string(),
            parent: parent.map(|p| Arc::new(p.clone())),
            color,
            id,
        })
    }

    /// Create a root class with an auto-derived color.
    pub fn new(name: &str) -> Result<Self, ProjectError> {
        Self::create(Some(name), None, ColorChoice::Auto)
    }

    /// Rebuild a path class from a stored ancestry id and leaf color.
    ///
    /// This is the interop constructor used when reading class records
    /// back from a backing store. The id must consist of non-empty names
    /// joined by [`CLASS_SEPARATOR`]; anything else fails with an
    /// invalid-record error. Ancestors receive their derived default
    /// colors, the leaf receives `color`.
    pub fn from_parts(id: &str, color: Option<Color>) -> Result<Self, ProjectError> {
        if id.is_empty() {
            return Err(ProjectError::invalid_record("class id is empty"));
        }
        let mut class: Option<PathClass> = None;
        let mut names = id.split(CLASS_SEPARATOR).peekable();
        while let Some(name) = names.next() {
            if name.is_empty() || name.contains(':') {
                return Err(ProjectError::invalid_record(format!(
                    "class id {id:?} has an invalid segment {name:?}"
                )));
            }
            let leaf = names.peek().is_none();
            let choice = match (leaf, color) {
                (true, Some(color)) => ColorChoice::Rgb(color),
                (true, None) => ColorChoice::Unset,
                (false, _) => ColorChoice::Auto,
            };
            class = Some(Self::create(Some(name), class.as_ref(), choice)?);
        }
        // split always yields at least one segment for a non-empty id
        class.ok_or_else(|| ProjectError::invalid_record("class id is empty"))
    }

    /// The leaf label (without ancestry).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full ancestry id, root to leaf.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The parent class, if this class is derived.
    pub fn parent(&self) -> Option<&PathClass> {
        self.parent.as_deref()
    }

    /// The root ancestor (self when not derived).
    pub fn origin(&self) -> &PathClass {
        match self.parent.as_deref() {
            Some(parent) => parent.origin(),
            None => self,
        }
    }

    /// The class color, if any.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Reassign or clear the class color.
    ///
    /// Passing `None` clears the color; no default is substituted.
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    /// Whether this is a well-formed class.
    ///
    /// Always true for constructed values; kept for forward compatibility
    /// with sentinel classes coming from a backing store.
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty()
    }

    /// Whether this class has a parent.
    pub fn is_derived_class(&self) -> bool {
        self.parent.is_some()
    }

    /// Whether `other` is this class or one of its ancestors.
    pub fn is_derived_from(&self, other: &PathClass) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class.id == other.id {
                return true;
            }
            current = class.parent.as_deref();
        }
        false
    }

    /// Whether this class is `other` or one of `other`'s ancestors.
    pub fn is_ancestor_of(&self, other: &PathClass) -> bool {
        other.is_derived_from(self)
    }
}

impl PartialEq for PathClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PathClass {}

impl Hash for PathClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for PathClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_root_class() {
        let pc = PathClass::new("MyClass").unwrap();
        assert_eq!(pc.name(), "MyClass");
        assert_eq!(pc.id(), "MyClass");
        assert!(pc.parent().is_none());
        assert!(pc.is_valid());
        assert!(!pc.is_derived_class());
        assert_eq!(pc.origin(), &pc);
    }

    #[test]
    fn test_derived_class_id_and_origin() {
        let root = PathClass::new("MyClass").unwrap();
        let child = PathClass::create(Some("MyChild"), Some(&root), ColorChoice::Auto).unwrap();
        assert_eq!(child.name(), "MyChild");
        assert_eq!(child.id(), "MyClass: MyChild");
        assert_eq!(child.parent().unwrap(), &root);
        assert_eq!(child.origin(), &root);

        let grandchild =
            PathClass::create(Some("Deep"), Some(&child), ColorChoice::Auto).unwrap();
        assert_eq!(grandchild.id(), "MyClass: MyChild: Deep");
        assert_eq!(grandchild.origin(), &root);
    }

    #[test]
    fn test_ancestry_predicates() {
        let root = PathClass::new("MyClass").unwrap();
        let child = PathClass::create(Some("MyChild"), Some(&root), ColorChoice::Auto).unwrap();

        assert!(child.is_derived_from(&root));
        assert!(!child.is_ancestor_of(&root));
        assert!(!root.is_derived_from(&child));
        assert!(root.is_ancestor_of(&child));
        assert!(child.is_derived_class());
        assert!(!root.is_derived_class());

        // improper: a class is derived from itself
        assert!(root.is_derived_from(&root));
        assert!(root.is_ancestor_of(&root));
    }

    #[test]
    fn test_predicates_are_inverses() {
        let a = PathClass::new("A").unwrap();
        let b = PathClass::create(Some("B"), Some(&a), ColorChoice::Auto).unwrap();
        let c = PathClass::new("C").unwrap();
        let classes = [&a, &b, &c];
        for x in classes {
            for y in classes {
                assert_eq!(x.is_derived_from(y), y.is_ancestor_of(x));
            }
        }
    }

    #[test]
    fn test_equality_on_id() {
        let a = PathClass::new("MyClass").unwrap();
        let same = PathClass::new("MyClass").unwrap();
        let other = PathClass::new("MyClass2").unwrap();
        assert_eq!(a, a);
        assert_eq!(a, same);
        assert_ne!(a, other);

        // independently built chains with the same ancestry compare equal
        let child1 =
            PathClass::create(Some("MyChild"), Some(&a), ColorChoice::Auto).unwrap();
        let child2 =
            PathClass::create(Some("MyChild"), Some(&same), ColorChoice::Unset).unwrap();
        assert_eq!(child1, child2);

        let mut set = HashSet::new();
        set.insert(a.clone());
        assert!(set.contains(&same));
        assert!(!set.contains(&other));
    }

    #[test]
    fn test_rejects_reserved_names() {
        assert!(matches!(
            PathClass::new("my::class"),
            Err(ProjectError::InvalidName { .. })
        ));
        assert!(matches!(
            PathClass::new("my: class"),
            Err(ProjectError::InvalidName { .. })
        ));
        assert!(matches!(
            PathClass::new(""),
            Err(ProjectError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_missing_name_errors_are_distinct() {
        // unnamed root is a known unsupported case
        assert!(matches!(
            PathClass::create(None, None, ColorChoice::Auto),
            Err(ProjectError::UnsupportedOperation(_))
        ));
        // a missing leaf name under a parent is invalid
        let parent = PathClass::new("MyClass").unwrap();
        assert!(matches!(
            PathClass::create(None, Some(&parent), ColorChoice::Auto),
            Err(ProjectError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_colors() {
        // auto-derived default, pinned to the deployed derivation scheme
        let pc = PathClass::new("MyNew").unwrap();
        assert_eq!(pc.color().unwrap().to_rgb(), (49, 139, 153));

        let pc = PathClass::create(
            Some("MyNew2"),
            None,
            ColorChoice::Rgb(Color::new(1, 2, 3)),
        )
        .unwrap();
        assert_eq!(pc.color().unwrap().to_rgb(), (1, 2, 3));

        let pc = PathClass::create(Some("MyNew3"), None, ColorChoice::Unset).unwrap();
        assert!(pc.color().is_none());
    }

    #[test]
    fn test_color_reassignment() {
        let mut pc = PathClass::new("MyNew").unwrap();
        pc.set_color(Some(Color::from_hex("#ff0000").unwrap()));
        assert_eq!(pc.color().unwrap().to_rgb(), (255, 0, 0));
        pc.set_color(None);
        assert!(pc.color().is_none());
    }

    #[test]
    fn test_from_parts_rebuilds_chain() {
        let pc = PathClass::from_parts("MyClass: MyChild", Some(Color::new(1, 2, 3))).unwrap();
        assert_eq!(pc.id(), "MyClass: MyChild");
        assert_eq!(pc.name(), "MyChild");
        assert_eq!(pc.color().unwrap().to_rgb(), (1, 2, 3));
        let parent = pc.parent().unwrap();
        assert_eq!(parent.id(), "MyClass");
        // ancestors carry their derived default colors
        assert_eq!(parent.color().unwrap().to_rgb(), (207, 157, 79));

        let root = PathClass::from_parts("MyClass", None).unwrap();
        assert!(root.color().is_none());
        assert!(root.parent().is_none());
        assert_eq!(pc.origin(), &root);
    }

    #[test]
    fn test_from_parts_rejects_malformed() {
        assert!(matches!(
            PathClass::from_parts("", None),
            Err(ProjectError::InvalidRecord { .. })
        ));
        assert!(matches!(
            PathClass::from_parts("MyClass: : MyChild", None),
            Err(ProjectError::InvalidRecord { .. })
        ));
    }
}
