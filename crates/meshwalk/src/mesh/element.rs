//! Element - one node of a refinement tree.
//!
//! # Quad Layout
//!
//! ```text
//!        v3 ─────── e2 ─────── v2
//!        │                     │
//!        e3        quad        e1
//!        │                     │
//!        v0 ─────── e0 ─────── v1
//! ```
//!
//! Sons by split kind:
//!
//! ```text
//!   Both            Horizontal       Vertical
//!  ┌────┬────┐     ┌────┬────┐     ┌─────────┐
//!  │ 3  │ 2  │     │    │    │     │    1    │
//!  ├────┼────┤     │ 0  │ 1  │     ├─────────┤
//!  │ 0  │ 1  │     │    │    │     │    0    │
//!  └────┴────┘     └────┴────┘     └─────────┘
//! ```
//!
//! Triangle edge `k` joins `v_k` and `v_{k+1}`; son `k < 3` sits at vertex
//! `k`, son 3 is the central triangle.

use glam::DVec2;
use smallvec::SmallVec;

use crate::code::{Selector, BOTTOM, LEFT};

/// Non-owning handle to an element (index into its mesh arena).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ElementId(u32);

impl ElementId {
  /// Handle for arena slot `index`.
  #[inline]
  pub fn from_index(index: usize) -> Self {
    debug_assert!(index <= u32::MAX as usize, "element index {index} overflows u32");
    Self(index as u32)
  }

  /// Arena slot of this handle.
  #[inline]
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Geometric element kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ElementKind {
  /// Three vertices, always refined into four sons.
  Triangle,
  /// Four vertices, refined isotropically or anisotropically.
  Quad,
}

impl ElementKind {
  /// Number of vertices (and edges).
  pub fn vertex_count(self) -> usize {
    match self {
      Self::Triangle => 3,
      Self::Quad => 4,
    }
  }
}

/// How an element is (or must be) divided.
///
/// Bit 0 lays the sons out horizontally (a cut along the vertical
/// midline), bit 1 stacks them vertically (a cut along the horizontal
/// midline).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(u8)]
pub enum SplitKind {
  /// Not divided.
  #[default]
  None = 0,
  /// Left and right halves.
  Horizontal = 1,
  /// Bottom and top halves.
  Vertical = 2,
  /// Four quadrants (isotropic).
  Both = 3,
}

impl SplitKind {
  /// Bitmask value (0-3).
  #[inline]
  pub const fn bits(self) -> u8 {
    self as u8
  }

  /// Split from a bitmask; bits above 1 are ignored.
  #[inline]
  pub const fn from_bits(bits: u8) -> Self {
    match bits & 3 {
      0 => Self::None,
      1 => Self::Horizontal,
      2 => Self::Vertical,
      _ => Self::Both,
    }
  }

  /// Finest split covering both inputs.
  #[inline]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self::from_bits(self.bits() | other.bits())
  }

  /// Number of sons this split produces.
  pub fn son_count(self) -> usize {
    match self {
      Self::None => 0,
      Self::Horizontal | Self::Vertical => 2,
      Self::Both => 4,
    }
  }

  /// Virtual selector describing son `index` inside its parent.
  pub fn son_selector(self, index: usize) -> Option<Selector> {
    match self {
      Self::None => None,
      Self::Horizontal if index < 2 => Some(LEFT + index as Selector),
      Self::Vertical if index < 2 => Some(BOTTOM + index as Selector),
      Self::Both if index < 4 => Some(index as Selector),
      _ => None,
    }
  }
}

/// Node of a refinement tree.
#[derive(Clone, Debug)]
pub struct Element {
  /// Handle of this element in its own mesh.
  pub id: ElementId,
  /// Triangle or quad.
  pub kind: ElementKind,
  /// Leaf (active) flag.
  pub active: bool,
  /// Participates in computation; only meaningful on base elements.
  pub used: bool,
  /// Refinement applied to this element (`None` for leaves).
  pub split: SplitKind,
  /// Sons, meaningful only when not active.
  pub sons: SmallVec<[ElementId; 4]>,
  /// Per-edge domain-boundary flags.
  pub boundary: [bool; 4],
  /// Real-space vertices in counter-clockwise order.
  pub vertices: SmallVec<[DVec2; 4]>,
  /// Parent element, `None` for base elements.
  pub parent: Option<ElementId>,
}

impl Element {
  /// True for leaf elements.
  #[inline]
  pub fn is_leaf(&self) -> bool {
    self.active
  }

  /// True for triangles.
  #[inline]
  pub fn is_triangle(&self) -> bool {
    self.kind == ElementKind::Triangle
  }

  /// True for quads.
  #[inline]
  pub fn is_quad(&self) -> bool {
    self.kind == ElementKind::Quad
  }

  /// Son at `index`, if refined that way.
  #[inline]
  pub fn son(&self, index: usize) -> Option<ElementId> {
    self.sons.get(index).copied()
  }

  /// Number of edges.
  pub fn edge_count(&self) -> usize {
    self.kind.vertex_count()
  }

  /// Boundary flag of `edge`; false for edges the element does not have.
  pub fn is_boundary(&self, edge: usize) -> bool {
    edge < self.edge_count() && self.boundary[edge]
  }

  /// Real-space area (shoelace formula).
  pub fn area(&self) -> f64 {
    let n = self.vertices.len();
    let twice: f64 = (0..n)
      .map(|i| self.vertices[i].perp_dot(self.vertices[(i + 1) % n]))
      .sum();
    0.5 * twice.abs()
  }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;
