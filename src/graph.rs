//! Permission dependency graph.
//!
//! [`DependencyGraph`] is an adjacency map from a permission to its *direct*
//! prerequisites. Edges point from a permission to what it requires, so
//! `{"edit": ["view"]}` reads "edit requires view".
//!
//! The graph must be acyclic. The resolver does not validate that up front
//! (caller's responsibility), but every walk carries a cycle guard that
//! fails with [`ResolverError::CyclicGraph`] instead of hanging on a
//! malformed graph.
//!
//! # Example
//!
//! ```
//! use permdep::{DependencyGraph, Permission};
//!
//! let graph: DependencyGraph = [
//!     ("view", vec![]),
//!     ("edit", vec!["view"]),
//!     ("delete", vec!["edit"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! assert!(graph.is_root(&Permission::new("view")));
//! let closure = graph.ancestors_of(&Permission::new("delete")).unwrap();
//! assert!(closure.contains("view"));
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Permission, ResolverError};

/// DFS marking for the closure walk. `InProgress` means the permission is
/// on the current walk path; meeting it again is a cycle.
enum Mark {
    InProgress,
    Done,
}

/// Immutable mapping from each permission to its direct prerequisites.
///
/// Built once by the caller (typically from configuration) and handed to
/// [`DependencyResolver`](crate::DependencyResolver), which treats it as
/// read-only for its entire lifetime. Serializes transparently as a map,
/// so a JSON config document deserializes directly:
///
/// ```
/// use permdep::DependencyGraph;
///
/// let graph: DependencyGraph = serde_json::from_str(
///     r#"{"view": [], "edit": ["view"]}"#,
/// ).unwrap();
/// assert_eq!(graph.len(), 2);
/// ```
///
/// The prerequisite lists keep their declared order; membership queries
/// treat them as sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    edges: HashMap<Permission, Vec<Permission>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a permission and its direct prerequisites.
    ///
    /// Replaces any previous entry for the same permission. A root
    /// permission is declared with an empty prerequisite list.
    pub fn insert<I>(&mut self, permission: impl Into<Permission>, prerequisites: I)
    where
        I: IntoIterator,
        I::Item: Into<Permission>,
    {
        self.edges.insert(
            permission.into(),
            prerequisites.into_iter().map(Into::into).collect(),
        );
    }

    /// Returns the direct prerequisites of `permission`, if declared.
    #[must_use]
    pub fn get(&self, permission: &Permission) -> Option<&[Permission]> {
        self.edges.get(permission).map(Vec::as_slice)
    }

    /// Returns the direct prerequisites of `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::UnknownPermission`] if the graph has no
    /// entry for `permission`.
    pub fn prerequisites(&self, permission: &Permission) -> Result<&[Permission], ResolverError> {
        self.get(permission)
            .ok_or_else(|| ResolverError::UnknownPermission {
                permission: permission.clone(),
            })
    }

    /// Returns `true` if the graph declares `permission`.
    #[must_use]
    pub fn contains(&self, permission: &Permission) -> bool {
        self.edges.contains_key(permission)
    }

    /// Returns `true` if `permission` is declared with no prerequisites.
    ///
    /// Roots are the foundation of the graph (conventionally "view"):
    /// they cannot be denied, and they are granted through a bootstrap
    /// path rather than [`can_grant`](crate::DependencyResolver::can_grant).
    #[must_use]
    pub fn is_root(&self, permission: &Permission) -> bool {
        self.get(permission).is_some_and(<[Permission]>::is_empty)
    }

    /// Iterates over the declared root permissions (no ordering guarantee).
    pub fn roots(&self) -> impl Iterator<Item = &Permission> {
        self.edges
            .iter()
            .filter(|(_, prereqs)| prereqs.is_empty())
            .map(|(perm, _)| perm)
    }

    /// Iterates over every declared permission (no ordering guarantee).
    pub fn permissions(&self) -> impl Iterator<Item = &Permission> {
        self.edges.keys()
    }

    /// Number of declared permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` if no permissions are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Computes the ancestor closure of `permission`: every permission
    /// reachable over prerequisite edges, plus `permission` itself.
    ///
    /// Pure function of the graph; returns a fresh set per call. For the
    /// memoized variant see
    /// [`DependencyResolver::ancestors`](crate::DependencyResolver::ancestors).
    ///
    /// # Errors
    ///
    /// - [`ResolverError::UnknownPermission`] if the walk reaches a
    ///   permission with no graph entry.
    /// - [`ResolverError::CyclicGraph`] if the walk re-enters a
    ///   permission already on the current path.
    pub fn ancestors_of(&self, permission: &Permission) -> Result<HashSet<Permission>, ResolverError> {
        let mut marks = HashMap::new();
        let mut closure = HashSet::new();
        self.collect_ancestors(permission, &mut marks, &mut closure)?;
        Ok(closure)
    }

    fn collect_ancestors(
        &self,
        permission: &Permission,
        marks: &mut HashMap<Permission, Mark>,
        closure: &mut HashSet<Permission>,
    ) -> Result<(), ResolverError> {
        match marks.get(permission) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(ResolverError::CyclicGraph {
                    permission: permission.clone(),
                })
            }
            None => {}
        }
        marks.insert(permission.clone(), Mark::InProgress);
        for prerequisite in self.prerequisites(permission)? {
            self.collect_ancestors(prerequisite, marks, closure)?;
        }
        marks.insert(permission.clone(), Mark::Done);
        closure.insert(permission.clone());
        Ok(())
    }

    /// Topologically sorts the requested permissions against this graph.
    ///
    /// The output is a permutation of the (deduplicated) input in which
    /// every permission appears after all of its direct and transitive
    /// prerequisites that are also in the input. Prerequisites *not* in
    /// the input still order the pair: sorting `["alter_tags", "view"]`
    /// puts "view" first even though the connecting "edit" was not
    /// requested. Unconstrained pairs keep their input order.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::UnknownPermission`] if a requested permission
    ///   (or anything in its closure) has no graph entry.
    /// - [`ResolverError::CyclicGraph`] if the restricted subgraph
    ///   contains a cycle.
    ///
    /// # Example
    ///
    /// ```
    /// use permdep::{DependencyGraph, Permission};
    ///
    /// let graph: DependencyGraph = [
    ///     ("view", vec![]),
    ///     ("edit", vec!["view"]),
    ///     ("delete", vec!["edit"]),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// let sorted = graph
    ///     .topological_sort(&["edit".into(), "delete".into(), "view".into()])
    ///     .unwrap();
    /// assert_eq!(sorted, vec![
    ///     Permission::new("view"),
    ///     Permission::new("edit"),
    ///     Permission::new("delete"),
    /// ]);
    /// ```
    pub fn topological_sort(
        &self,
        permissions: &[Permission],
    ) -> Result<Vec<Permission>, ResolverError> {
        let mut subset: Vec<&Permission> = Vec::with_capacity(permissions.len());
        let mut seen = HashSet::new();
        for permission in permissions {
            if seen.insert(permission) {
                subset.push(permission);
            }
        }

        // Closure computation also validates membership and acyclicity.
        let closures = subset
            .iter()
            .map(|permission| self.ancestors_of(permission))
            .collect::<Result<Vec<_>, _>>()?;

        let n = subset.len();
        let mut pending_prereqs: Vec<usize> = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i && closures[i].contains(subset[j]))
                    .count()
            })
            .collect();

        let mut placed = vec![false; n];
        let mut ordered = Vec::with_capacity(n);
        for _ in 0..n {
            // First input-order permission with all prerequisites placed.
            let Some(next) = (0..n).find(|&i| !placed[i] && pending_prereqs[i] == 0) else {
                let stuck = (0..n)
                    .find(|&i| !placed[i])
                    .map(|i| subset[i].clone())
                    .unwrap_or_else(|| Permission::new(""));
                return Err(ResolverError::CyclicGraph { permission: stuck });
            };
            placed[next] = true;
            ordered.push(subset[next].clone());
            for i in 0..n {
                if !placed[i] && closures[i].contains(subset[next]) {
                    pending_prereqs[i] -= 1;
                }
            }
        }
        Ok(ordered)
    }
}

impl<P, I> FromIterator<(P, I)> for DependencyGraph
where
    P: Into<Permission>,
    I: IntoIterator,
    I::Item: Into<Permission>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut graph = Self::new();
        for (permission, prerequisites) in iter {
            graph.insert(permission, prerequisites);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_graph() -> DependencyGraph {
        [
            ("view", vec![]),
            ("edit", vec!["view"]),
            ("alter_tags", vec!["edit"]),
            ("create", vec!["view"]),
            ("delete", vec!["edit"]),
        ]
        .into_iter()
        .collect()
    }

    fn perm(name: &str) -> Permission {
        Permission::new(name)
    }

    fn perms(names: &[&str]) -> Vec<Permission> {
        names.iter().map(|n| perm(n)).collect()
    }

    #[test]
    fn roots_are_empty_prerequisite_entries() {
        let graph = simple_graph();
        assert!(graph.is_root(&perm("view")));
        assert!(!graph.is_root(&perm("edit")));
        assert!(!graph.is_root(&perm("missing")));

        let roots: Vec<_> = graph.roots().collect();
        assert_eq!(roots, vec![&perm("view")]);
    }

    #[test]
    fn prerequisites_lookup() {
        let graph = simple_graph();
        assert_eq!(graph.prerequisites(&perm("edit")).unwrap(), &[perm("view")]);
        assert_eq!(graph.prerequisites(&perm("view")).unwrap(), &[] as &[Permission]);

        let err = graph.prerequisites(&perm("publish")).unwrap_err();
        assert_eq!(
            err,
            ResolverError::UnknownPermission {
                permission: perm("publish")
            }
        );
    }

    #[test]
    fn ancestors_include_self_and_transitive_prerequisites() {
        let graph = simple_graph();
        let closure = graph.ancestors_of(&perm("alter_tags")).unwrap();
        assert!(closure.contains("alter_tags"));
        assert!(closure.contains("edit"));
        assert!(closure.contains("view"));
        assert_eq!(closure.len(), 3);
    }

    #[test]
    fn ancestors_of_root_is_just_the_root() {
        let graph = simple_graph();
        let closure = graph.ancestors_of(&perm("view")).unwrap();
        assert_eq!(closure.len(), 1);
        assert!(closure.contains("view"));
    }

    #[test]
    fn ancestors_of_diamond_collects_each_branch_once() {
        let graph: DependencyGraph = [
            ("view", vec![]),
            ("edit", vec!["view"]),
            ("create", vec!["view"]),
            ("batch_update", vec!["edit", "create"]),
        ]
        .into_iter()
        .collect();

        let closure = graph.ancestors_of(&perm("batch_update")).unwrap();
        assert_eq!(closure.len(), 4);
    }

    #[test]
    fn ancestors_of_unknown_permission_fails() {
        let graph = simple_graph();
        let err = graph.ancestors_of(&perm("publish")).unwrap_err();
        assert_eq!(err.kind(), "unknown_permission");
    }

    #[test]
    fn ancestors_detects_cycle() {
        let graph: DependencyGraph = [("a", vec!["b"]), ("b", vec!["a"])].into_iter().collect();
        let err = graph.ancestors_of(&perm("a")).unwrap_err();
        assert_eq!(err.kind(), "cyclic_graph");
    }

    #[test]
    fn ancestors_detects_self_cycle() {
        let graph: DependencyGraph = [("a", vec!["a"])].into_iter().collect();
        let err = graph.ancestors_of(&perm("a")).unwrap_err();
        assert_eq!(
            err,
            ResolverError::CyclicGraph {
                permission: perm("a")
            }
        );
    }

    #[test]
    fn sort_simple_chain() {
        let graph = simple_graph();
        let sorted = graph
            .topological_sort(&perms(&["edit", "delete", "view"]))
            .unwrap();
        assert_eq!(sorted, perms(&["view", "edit", "delete"]));
    }

    #[test]
    fn sort_orders_through_missing_intermediates() {
        // "edit" connects the two but is not requested.
        let graph = simple_graph();
        let sorted = graph
            .topological_sort(&perms(&["alter_tags", "view"]))
            .unwrap();
        assert_eq!(sorted, perms(&["view", "alter_tags"]));
    }

    #[test]
    fn sort_keeps_input_order_for_unconstrained_pairs() {
        let graph = simple_graph();
        let sorted = graph
            .topological_sort(&perms(&["create", "alter_tags", "view", "edit"]))
            .unwrap();
        assert_eq!(sorted, perms(&["view", "create", "edit", "alter_tags"]));
    }

    #[test]
    fn sort_deduplicates_input() {
        let graph = simple_graph();
        let sorted = graph
            .topological_sort(&perms(&["edit", "view", "edit"]))
            .unwrap();
        assert_eq!(sorted, perms(&["view", "edit"]));
    }

    #[test]
    fn sort_empty_input() {
        let graph = simple_graph();
        assert_eq!(graph.topological_sort(&[]).unwrap(), Vec::<Permission>::new());
    }

    #[test]
    fn sort_unknown_permission_fails() {
        let graph = simple_graph();
        let err = graph
            .topological_sort(&perms(&["view", "publish"]))
            .unwrap_err();
        assert_eq!(
            err,
            ResolverError::UnknownPermission {
                permission: perm("publish")
            }
        );
    }

    #[test]
    fn sort_cyclic_subgraph_fails() {
        let graph: DependencyGraph = [("a", vec!["b"]), ("b", vec!["a"])].into_iter().collect();
        let err = graph.topological_sort(&perms(&["a", "b"])).unwrap_err();
        assert_eq!(err.kind(), "cyclic_graph");
    }

    #[test]
    fn serde_roundtrip() {
        let graph = simple_graph();
        let json = serde_json::to_string(&graph).expect("serialize");
        let parsed: DependencyGraph = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, graph);
    }

    #[test]
    fn deserializes_from_plain_map() {
        let graph: DependencyGraph =
            serde_json::from_str(r#"{"view": [], "edit": ["view"]}"#).expect("deserialize");
        assert_eq!(graph.len(), 2);
        assert!(graph.is_root(&perm("view")));
        assert_eq!(graph.prerequisites(&perm("edit")).unwrap(), &[perm("view")]);
    }
}
