//! Traversal errors.
//!
//! Only incompatible inputs and an undersized frame stack are errors.
//! Geometric ambiguity inside the reconciler is resolved deterministically
//! and shows up in [`TraversalStats::fallbacks`](crate::traverse::TraversalStats)
//! instead.

use thiserror::Error;

use crate::mesh::MeshError;

/// Errors from binding trees or walking them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TraverseError {
  /// `begin` was called with an empty tree set.
  #[error("at least one mesh is required")]
  NoMeshes,

  /// A tree has a different number of base elements than the first one.
  #[error("mesh {mesh} has {found} base elements, expected {expected}")]
  BaseCountMismatch {
    expected: usize,
    found: usize,
    mesh: usize,
  },

  /// Two trees disagree on the kind of a used base element.
  #[error("base element {base} of mesh {mesh} differs in kind from mesh 0")]
  BaseKindMismatch { base: usize, mesh: usize },

  /// Two trees disagree on the area of a used base element.
  #[error(
    "base element {base} of mesh {mesh} has area {found}, expected {expected} (tolerance {tolerance})"
  )]
  BaseAreaMismatch {
    base: usize,
    mesh: usize,
    expected: f64,
    found: f64,
    tolerance: f64,
  },

  /// More simultaneous frames than the configured stack capacity.
  #[error("traversal stack overflow (capacity {capacity}); raise TraverseConfig::stack_capacity")]
  StackOverflow { capacity: usize },

  /// Mesh structure error while descending or building the union mesh.
  #[error(transparent)]
  Mesh(#[from] MeshError),
}
