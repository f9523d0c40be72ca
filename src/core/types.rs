//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ScenePath`] - Validated, absolute scene-graph path
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use stagewalk::core::types::ScenePath;
//!
//! // Valid constructions
//! let path = ScenePath::new("/World/Set").unwrap();
//! assert_eq!(path.as_str(), "/World/Set");
//!
//! // Invalid constructions fail at creation time
//! assert!(ScenePath::new("World/Set").is_err());
//! assert!(ScenePath::new("/World//Set").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid scene path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid path component '{0}'")]
    InvalidComponent(String),
}

/// A validated, absolute scene-graph path.
///
/// Paths are immutable, slash-delimited identifiers for locations in the
/// scene graph. The absolute root is `/`; every other path is a sequence of
/// identifier components below it, e.g. `/World/Set/Table`. Prototype roots
/// use the same grammar with a leading-underscore convention, e.g.
/// `/__Prototype_1`.
///
/// # Grammar
///
/// - Must start with `/`
/// - Components are non-empty identifiers: an ASCII letter or `_` followed
///   by ASCII letters, digits, or `_`
/// - No empty components (`//`) and no trailing `/` (except the root itself)
///
/// # Ordering
///
/// Paths order lexicographically on their string form, which places every
/// path before all of its descendants (prefix ordering).
///
/// # Example
///
/// ```
/// use stagewalk::core::types::ScenePath;
///
/// let table = ScenePath::new("/World/Set/Table").unwrap();
/// let set = ScenePath::new("/World/Set").unwrap();
///
/// assert_eq!(table.parent(), Some(set.clone()));
/// assert!(table.has_prefix(&set));
/// assert!(set < table);
/// assert_eq!(table.name(), Some("Table"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScenePath(String);

impl ScenePath {
    /// Create a new validated scene path.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidPath` if the string violates the path
    /// grammar.
    pub fn new(path: impl Into<String>) -> Result<Self, PathError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    /// The absolute root path `/`.
    ///
    /// The root addresses the pseudo-root of the graph, which is not a
    /// concrete prim location (see [`ScenePath::is_prim_path`]).
    pub fn absolute_root() -> Self {
        Self("/".to_string())
    }

    fn validate(path: &str) -> Result<(), PathError> {
        if path.is_empty() {
            return Err(PathError::InvalidPath {
                path: path.to_string(),
                reason: "path cannot be empty".to_string(),
            });
        }
        if !path.starts_with('/') {
            return Err(PathError::InvalidPath {
                path: path.to_string(),
                reason: "path must be absolute".to_string(),
            });
        }
        if path == "/" {
            return Ok(());
        }
        if path.ends_with('/') {
            return Err(PathError::InvalidPath {
                path: path.to_string(),
                reason: "path cannot end with '/'".to_string(),
            });
        }
        for component in path[1..].split('/') {
            Self::validate_component(component).map_err(|_| PathError::InvalidPath {
                path: path.to_string(),
                reason: format!("invalid component '{component}'"),
            })?;
        }
        Ok(())
    }

    /// Validate a single path component as an identifier.
    fn validate_component(component: &str) -> Result<(), PathError> {
        let mut chars = component.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(PathError::InvalidComponent(component.to_string()))
        }
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the absolute root `/`.
    pub fn is_absolute_root(&self) -> bool {
        self.0 == "/"
    }

    /// Whether this path addresses a concrete prim location.
    ///
    /// The absolute root is a valid path but not a prim location; forwarding
    /// never anchors there.
    pub fn is_prim_path(&self) -> bool {
        !self.is_absolute_root()
    }

    /// The parent path, or `None` for the absolute root.
    ///
    /// # Example
    ///
    /// ```
    /// use stagewalk::core::types::ScenePath;
    ///
    /// let path = ScenePath::new("/World/Set").unwrap();
    /// assert_eq!(path.parent().unwrap().as_str(), "/World");
    /// assert_eq!(path.parent().unwrap().parent().unwrap().as_str(), "/");
    /// assert_eq!(ScenePath::absolute_root().parent(), None);
    /// ```
    pub fn parent(&self) -> Option<ScenePath> {
        if self.is_absolute_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::absolute_root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// The final component name, or `None` for the absolute root.
    pub fn name(&self) -> Option<&str> {
        if self.is_absolute_root() {
            return None;
        }
        self.0.rfind('/').map(|idx| &self.0[idx + 1..])
    }

    /// Iterate over the path components from the root downward.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|c| !c.is_empty())
    }

    /// Number of components below the root (the root itself has depth 0).
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    /// Append a single child component.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidComponent` if `name` is not a valid
    /// identifier.
    ///
    /// # Example
    ///
    /// ```
    /// use stagewalk::core::types::ScenePath;
    ///
    /// let root = ScenePath::absolute_root();
    /// let world = root.append_child("World").unwrap();
    /// assert_eq!(world.as_str(), "/World");
    /// assert!(world.append_child("no-dashes").is_err());
    /// ```
    pub fn append_child(&self, name: &str) -> Result<ScenePath, PathError> {
        Self::validate_component(name)?;
        if self.is_absolute_root() {
            Ok(Self(format!("/{name}")))
        } else {
            Ok(Self(format!("{}/{name}", self.0)))
        }
    }

    /// Append a relative, slash-delimited suffix.
    ///
    /// # Errors
    ///
    /// Returns `PathError::InvalidComponent` if any component of the suffix
    /// is not a valid identifier.
    ///
    /// # Example
    ///
    /// ```
    /// use stagewalk::core::types::ScenePath;
    ///
    /// let proto = ScenePath::new("/__Prototype_1").unwrap();
    /// let leaf = proto.join("Geom/Mesh").unwrap();
    /// assert_eq!(leaf.as_str(), "/__Prototype_1/Geom/Mesh");
    /// ```
    pub fn join(&self, relative: &str) -> Result<ScenePath, PathError> {
        let mut result = self.clone();
        for component in relative.split('/') {
            result = result.append_child(component)?;
        }
        Ok(result)
    }

    /// Whether `prefix` is an ancestor-or-self of this path.
    ///
    /// The comparison respects component boundaries: `/World` is a prefix of
    /// `/World/Set` but not of `/Worldly`. The absolute root is a prefix of
    /// every path.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.is_absolute_root() {
            return true;
        }
        self == prefix
            || (self.0.starts_with(prefix.0.as_str())
                && self.0.as_bytes()[prefix.0.len()] == b'/')
    }

    /// Rebase this path from the prefix `old` onto `new`.
    ///
    /// Returns `None` when `old` is not a prefix of this path.
    ///
    /// # Example
    ///
    /// ```
    /// use stagewalk::core::types::ScenePath;
    ///
    /// let path = ScenePath::new("/World/Set/Table").unwrap();
    /// let set = ScenePath::new("/World/Set").unwrap();
    /// let proto = ScenePath::new("/__Prototype_1").unwrap();
    ///
    /// let rebased = path.replace_prefix(&set, &proto).unwrap();
    /// assert_eq!(rebased.as_str(), "/__Prototype_1/Table");
    ///
    /// let other = ScenePath::new("/Elsewhere").unwrap();
    /// assert!(path.replace_prefix(&other, &proto).is_none());
    /// ```
    pub fn replace_prefix(&self, old: &ScenePath, new: &ScenePath) -> Option<ScenePath> {
        if !self.has_prefix(old) {
            return None;
        }
        if self == old {
            return Some(new.clone());
        }
        let relative = if old.is_absolute_root() {
            &self.0[1..]
        } else {
            &self.0[old.0.len() + 1..]
        };
        if new.is_absolute_root() {
            Some(Self(format!("/{relative}")))
        } else {
            Some(Self(format!("{}/{relative}", new.0)))
        }
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScenePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ScenePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ScenePath> for String {
    fn from(path: ScenePath) -> Self {
        path.0
    }
}
