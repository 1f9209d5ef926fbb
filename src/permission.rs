//! Permission identifier type.
//!
//! A [`Permission`] is an opaque token; the resolver never inspects its
//! contents, only compares it and looks it up in the dependency graph.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque identifier for a grantable capability.
///
/// Permissions have no internal structure — "edit" means whatever the
/// surrounding system says it means. What matters here is identity
/// (equality, hashing) and the prerequisite edges declared for it in a
/// [`DependencyGraph`](crate::DependencyGraph).
///
/// Serializes transparently as a plain string, so a JSON graph document
/// reads naturally: `{"edit": ["view"]}`.
///
/// # Example
///
/// ```
/// use permdep::Permission;
///
/// let edit = Permission::new("edit");
/// assert_eq!(edit.as_str(), "edit");
/// assert_eq!(edit, Permission::from("edit"));
/// assert_eq!(edit.to_string(), "edit");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    /// Creates a permission from any string-like value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the permission name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets HashSet<Permission>/HashMap<Permission, _> be queried with &str.
impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}
