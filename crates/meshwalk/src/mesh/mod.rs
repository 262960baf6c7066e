//! Refinement-tree mesh model consumed by the traversal engine.
//!
//! The traversal only needs read access through [`MeshTree`]; [`Mesh`] is a
//! compact arena implementation used for tests, benchmarks and as the output
//! of union-mesh construction.
//!
//! # Module Structure
//!
//! - [`element`]: `Element` nodes, `ElementId` handles, `SplitKind`
//! - [`arena`]: `Mesh` - arena storage with refinement

pub mod arena;
pub mod element;

// Re-exports
pub use arena::{Mesh, MeshError};
pub use element::{Element, ElementId, ElementKind, SplitKind};

/// Read-only view of a refinement forest.
///
/// Base elements occupy ids `0..num_base_elements()`; refinement only ever
/// appends. Handles are never invalidated while the tree is borrowed.
pub trait MeshTree {
  /// Number of root-level elements.
  fn num_base_elements(&self) -> usize;

  /// Node behind a handle.
  fn element(&self, id: ElementId) -> &Element;

  /// Root-level node at `index`.
  fn base_element(&self, index: usize) -> &Element {
    self.element(ElementId::from_index(index))
  }
}
