//! Grant/deny resolution over a permission dependency graph.
//!
//! [`DependencyResolver`] owns an immutable [`DependencyGraph`] and answers
//! three questions about a principal's held permissions:
//!
//! - [`can_grant`](DependencyResolver::can_grant) — may this permission be
//!   added, given what is already held?
//! - [`can_deny`](DependencyResolver::can_deny) — may this permission be
//!   removed without stranding the rest?
//! - [`sort`](DependencyResolver::sort) — in what order should a set of
//!   permissions be applied?
//!
//! Every method is a pure function of its inputs and the graph; the caller's
//! permission sets are never mutated. Ancestor closures are memoized per
//! permission behind an [`RwLock`], so a single resolver can be shared
//! across threads.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::{DependencyGraph, Permission, ResolverError};

/// Decides permission grants and denials against a dependency graph.
///
/// Constructed once from a [`DependencyGraph`] and read-only thereafter.
/// The graph is taken by value; clone it first if the caller needs to keep
/// its own copy.
///
/// # Example
///
/// ```
/// use permdep::{DependencyGraph, DependencyResolver, Permission};
///
/// let graph: DependencyGraph = [
///     ("view", vec![]),
///     ("edit", vec!["view"]),
///     ("delete", vec!["edit"]),
/// ]
/// .into_iter()
/// .collect();
///
/// let resolver = DependencyResolver::new(graph);
/// let held = [Permission::new("view")];
///
/// assert!(resolver.can_grant(&held, &Permission::new("edit")).unwrap());
/// assert!(!resolver.can_grant(&held, &Permission::new("delete")).unwrap());
/// ```
#[derive(Debug)]
pub struct DependencyResolver {
    graph: DependencyGraph,
    // Per-permission closure cache. Valid for the resolver's lifetime
    // because the graph never changes after construction.
    closures: RwLock<HashMap<Permission, Arc<HashSet<Permission>>>>,
}

impl DependencyResolver {
    /// Creates a resolver over the given dependency graph.
    ///
    /// The graph must be a valid DAG; the resolver does not verify
    /// acyclicity up front, but any walk that meets a cycle fails with
    /// [`ResolverError::CyclicGraph`].
    #[must_use]
    pub fn new(graph: DependencyGraph) -> Self {
        Self {
            graph,
            closures: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the underlying dependency graph.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Returns the ancestor closure of `permission`: its direct and
    /// transitive prerequisites, plus itself.
    ///
    /// Memoized per permission; repeated queries share one allocation.
    ///
    /// # Errors
    ///
    /// [`ResolverError::UnknownPermission`] for a permission absent from
    /// the graph, [`ResolverError::CyclicGraph`] on a malformed graph.
    pub fn ancestors(&self, permission: &Permission) -> Result<Arc<HashSet<Permission>>, ResolverError> {
        if let Some(closure) = self.closures.read().get(permission) {
            return Ok(Arc::clone(closure));
        }
        let closure = Arc::new(self.graph.ancestors_of(permission)?);
        self.closures
            .write()
            .insert(permission.clone(), Arc::clone(&closure));
        Ok(closure)
    }

    /// Decides whether `candidate` may be granted to a principal that
    /// currently holds `existing`.
    ///
    /// Granting is idempotent: an already-held candidate is always
    /// grantable, without consulting the graph. Otherwise every direct
    /// prerequisite of `candidate` must appear in the ancestor closure of
    /// at least one held permission. Each prerequisite may be satisfied by
    /// a different held permission; this is what admits multi-prerequisite
    /// permissions like `batch_update` requiring both `edit` and `create`.
    ///
    /// A candidate with an *empty* prerequisite list is a root and is not
    /// grantable through this predicate: roots are bootstrapped through a
    /// separate path (see [`DependencyGraph::is_root`]).
    ///
    /// # Errors
    ///
    /// [`ResolverError::UnknownPermission`] if `candidate` or a held
    /// permission has no graph entry, [`ResolverError::CyclicGraph`] on a
    /// malformed graph.
    pub fn can_grant(
        &self,
        existing: &[Permission],
        candidate: &Permission,
    ) -> Result<bool, ResolverError> {
        if existing.contains(candidate) {
            trace!(candidate = %candidate, granted = true, "already held");
            return Ok(true);
        }

        let required = self.graph.prerequisites(candidate)?;
        if required.is_empty() {
            // Roots go through bootstrap, not this predicate.
            trace!(candidate = %candidate, granted = false, "root permission");
            return Ok(false);
        }

        for prerequisite in required {
            let mut satisfied = false;
            for held in existing {
                if self.ancestors(held)?.contains(prerequisite.as_str()) {
                    satisfied = true;
                    break;
                }
            }
            if !satisfied {
                trace!(
                    candidate = %candidate,
                    missing = %prerequisite,
                    granted = false,
                    "prerequisite not satisfied",
                );
                return Ok(false);
            }
        }
        trace!(candidate = %candidate, granted = true, "all prerequisites satisfied");
        Ok(true)
    }

    /// Decides whether `candidate` may be denied (removed) from a
    /// principal that currently holds `existing`.
    ///
    /// Root permissions can never be denied through this predicate.
    /// Otherwise one occurrence of `candidate` is removed and the removal
    /// is permitted only if every remaining permission still has a root
    /// derivable through permissions the principal still holds — denying
    /// must not strand a held permission from its foundation. An empty
    /// remainder is vacuously deniable.
    ///
    /// `existing` is never mutated.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::InvalidBasePermissions`] if `existing` is
    ///   non-empty and does not contain `candidate` at all.
    /// - [`ResolverError::UnknownPermission`] /
    ///   [`ResolverError::CyclicGraph`] from graph lookups.
    pub fn can_deny(
        &self,
        existing: &[Permission],
        candidate: &Permission,
    ) -> Result<bool, ResolverError> {
        if self.graph.is_root(candidate) {
            trace!(candidate = %candidate, denied = false, "root permission cannot be denied");
            return Ok(false);
        }
        if !existing.is_empty() && !existing.contains(candidate) {
            return Err(ResolverError::InvalidBasePermissions {
                candidate: candidate.clone(),
            });
        }

        // Remove a single occurrence; duplicates stay held.
        let mut removed = false;
        let remaining: Vec<&Permission> = existing
            .iter()
            .filter(|held| {
                if !removed && *held == candidate {
                    removed = true;
                    false
                } else {
                    true
                }
            })
            .collect();

        for held in &remaining {
            if !self.root_still_derivable(held, &remaining)? {
                trace!(
                    candidate = %candidate,
                    stranded = %held,
                    denied = false,
                    "denial would strand a held permission",
                );
                return Ok(false);
            }
        }
        trace!(candidate = %candidate, denied = true, "no held permission stranded");
        Ok(true)
    }

    /// Returns a topological ordering of `permissions` consistent with the
    /// dependency graph. See [`DependencyGraph::topological_sort`].
    ///
    /// # Errors
    ///
    /// [`ResolverError::UnknownPermission`] for a permission absent from
    /// the graph, [`ResolverError::CyclicGraph`] on a malformed graph.
    pub fn sort(&self, permissions: &[Permission]) -> Result<Vec<Permission>, ResolverError> {
        self.graph.topological_sort(permissions)
    }

    /// Checks whether a root permission is reachable from `permission`
    /// over prerequisite edges that pass only through `held` permissions.
    ///
    /// A prerequisite the principal no longer holds severs that branch of
    /// the walk: support must come from what is actually held.
    fn root_still_derivable(
        &self,
        permission: &Permission,
        held: &[&Permission],
    ) -> Result<bool, ResolverError> {
        let mut visited = HashSet::new();
        let mut stack = vec![permission];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if self.graph.is_root(current) {
                return Ok(true);
            }
            for prerequisite in self.graph.prerequisites(current)? {
                if held.iter().any(|h| *h == prerequisite) {
                    stack.push(prerequisite);
                }
            }
        }
        Ok(false)
    }
}
