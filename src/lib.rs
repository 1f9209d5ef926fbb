//! Dependency-aware permission resolution.
//!
//! This crate decides whether a permission may be granted to or revoked
//! from a principal, given a declared dependency graph among permissions
//! ("edit" requires "view"), and produces topological orderings so bulk
//! operations can be applied in dependency order.
//!
//! # Architecture
//!
//! ```text
//! caller (owns permission storage & policy)
//!     │  existing: &[Permission], candidate: &Permission
//!     ▼
//! DependencyResolver ── can_grant / can_deny / sort / ancestors
//!     │
//!     ▼
//! DependencyGraph ── direct prerequisites per permission (immutable DAG)
//! ```
//!
//! | Type | Role |
//! |------|------|
//! | [`Permission`] | Opaque identifier for a grantable capability |
//! | [`DependencyGraph`] | Permission → direct prerequisites (adjacency map) |
//! | [`DependencyResolver`] | Grant/deny predicates and topological sort |
//! | [`ResolverError`] | Invalid deny, unknown permission, cyclic graph |
//!
//! # Model
//!
//! A permission's **ancestor closure** is its direct and transitive
//! prerequisites plus itself. Granting requires every direct prerequisite
//! of the candidate to appear in some held permission's closure. Denying
//! requires that no remaining permission loses its derivation path to a
//! **root** (a permission with no prerequisites, conventionally "view").
//! Roots themselves are special on both sides: never deniable here, and
//! granted through a bootstrap path outside [`can_grant`].
//!
//! # Design Principles
//!
//! - **Caller owns the graph** — the resolver takes an immutable
//!   [`DependencyGraph`] at construction and never mutates or validates
//!   it beyond defensive cycle guards.
//! - **Pure predicates** — every operation is a function of its inputs;
//!   the caller's permission sets are never mutated.
//! - **Share freely** — ancestor closures are memoized behind a lock, so
//!   one resolver instance serves concurrent callers.
//!
//! # Example
//!
//! ```
//! use permdep::{DependencyGraph, DependencyResolver, Permission};
//!
//! let graph: DependencyGraph = [
//!     ("view", vec![]),
//!     ("edit", vec!["view"]),
//!     ("delete", vec!["edit"]),
//! ]
//! .into_iter()
//! .collect();
//!
//! let resolver = DependencyResolver::new(graph);
//! let held = [Permission::new("view"), Permission::new("edit")];
//!
//! assert!(resolver.can_grant(&held, &Permission::new("delete")).unwrap());
//! assert!(!resolver.can_deny(&held, &Permission::new("view")).unwrap());
//!
//! let order = resolver
//!     .sort(&[Permission::new("delete"), Permission::new("view"), Permission::new("edit")])
//!     .unwrap();
//! assert_eq!(order[0], Permission::new("view"));
//! ```
//!
//! [`can_grant`]: DependencyResolver::can_grant

pub mod error;
pub mod graph;
pub mod permission;
pub mod resolver;

pub use error::ResolverError;
pub use graph::DependencyGraph;
pub use permission::Permission;
pub use resolver::DependencyResolver;
