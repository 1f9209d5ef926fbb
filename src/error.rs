//! Resolver error types.
//!
//! All resolver failures surface as [`ResolverError`]. None of them are
//! retryable: each one means the caller's request or the supplied graph
//! is wrong and must be corrected upstream.

use thiserror::Error;

use crate::Permission;

/// Error returned by [`DependencyResolver`](crate::DependencyResolver)
/// and [`DependencyGraph`](crate::DependencyGraph) operations.
///
/// Callers can match on the variant, or use [`kind`](Self::kind) for a
/// stable string label (logging, metrics).
///
/// # Example
///
/// ```
/// use permdep::{Permission, ResolverError};
///
/// let err = ResolverError::UnknownPermission {
///     permission: Permission::new("publish"),
/// };
/// assert!(err.to_string().contains("publish"));
/// assert_eq!(err.kind(), "unknown_permission");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolverError {
    /// A deny was requested for a permission the principal never held.
    ///
    /// Only raised when the existing set is non-empty; denying against an
    /// empty set is vacuously permitted.
    #[error("invalid base permissions: '{candidate}' is not held by the principal")]
    InvalidBasePermissions {
        /// The permission the caller attempted to deny.
        candidate: Permission,
    },

    /// A lookup referenced a permission with no entry in the graph.
    ///
    /// Signals a mismatch between the caller's permission set and the
    /// configured dependency graph.
    #[error("unknown permission: '{permission}' has no entry in the dependency graph")]
    UnknownPermission {
        /// The permission missing from the graph.
        permission: Permission,
    },

    /// The prerequisite walk re-entered a permission already in progress.
    ///
    /// The graph is required to be acyclic; this guard turns a malformed
    /// graph into a fatal configuration error instead of a hang.
    #[error("cyclic dependency graph: cycle detected at '{permission}'")]
    CyclicGraph {
        /// The permission at which the cycle was detected.
        permission: Permission,
    },
}

impl ResolverError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidBasePermissions { .. } => "invalid_base_permissions",
            Self::UnknownPermission { .. } => "unknown_permission",
            Self::CyclicGraph { .. } => "cyclic_graph",
        }
    }
}
