//! meshwalk - synchronized traversal of independently refined 2D meshes
//!
//! Several meshes that share the same base elements but were refined
//! independently (isotropically, anisotropically, or not at all) are walked
//! in lock-step. Every step surfaces one region that is a leaf, or lies
//! inside a leaf, in all of them, together with per-mesh transform codes
//! locating the region inside each mesh's element. The same alignment drives
//! the construction of a union mesh: the common finest refinement, plus
//! per-mesh lookup tables from union leaves to source elements.
//!
//! # Features
//!
//! - **Explicit-stack traversal**: pull one leaf frame at a time through a
//!   [`Cursor`]; any number of cursors may walk the same meshes at once
//! - **Anisotropic reconciliation**: horizontal, vertical and isotropic
//!   splits are aligned through the son reconciler
//! - **Union meshes**: [`Traverse::construct_union_mesh`] refines an output
//!   mesh and records a [`UniData`] entry per mesh and union leaf
//! - **Parallel counting**: [`Traverse::par_count_states`] splits the base
//!   elements across rayon workers
//!
//! # Example
//!
//! ```
//! use meshwalk::{Mesh, SplitKind, Traverse, ElementId};
//!
//! let mut a = Mesh::unit_square();
//! a.refine(ElementId::from_index(0), SplitKind::Horizontal).unwrap();
//! let mut b = Mesh::unit_square();
//! b.refine(ElementId::from_index(0), SplitKind::Vertical).unwrap();
//!
//! let traverse = Traverse::begin(&[&a, &b]).unwrap();
//! assert_eq!(traverse.count_states().unwrap(), 4);
//!
//! let mut union = Mesh::new();
//! let map = traverse.construct_union_mesh(&mut union).unwrap();
//! assert_eq!(map.len(), 4);
//! ```

pub mod code;
pub mod constants;
pub mod error;
pub mod mesh;
pub mod rect;

// Re-export commonly used items
pub use code::{Selector, TransformCode};
pub use error::TraverseError;
pub use mesh::{Element, ElementId, ElementKind, Mesh, MeshError, MeshTree, SplitKind};
pub use rect::{init_idx, ParamRect};

// Split resolution and son reconciliation
pub mod reconcile;
pub mod split;
pub use reconcile::{reconcile, Reconciled};
pub use split::{
  locate_child, needed_cuts, split_and_children, split_kind, ChildWindow, SplitResolution,
};

// Synchronized multi-mesh traversal
pub mod traverse;
pub use traverse::{
  ActiveBinding, ActiveElement, Cursor, Slot, State, TraversalStats, Traverse, TraverseConfig,
};

// Union-mesh construction
pub mod union;
pub use union::{UniData, UnionMap};

#[cfg(test)]
pub mod test_utils;
