//! Traversal frames.

use smallvec::SmallVec;

use crate::code::TransformCode;
use crate::mesh::{ElementId, ElementKind};

/// One tree's position inside a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Slot {
  /// Element holding the frame, `None` when the tree does not participate.
  pub element: Option<ElementId>,
  /// Path from `element` down to the frame's region.
  pub code: TransformCode,
}

impl Slot {
  /// Slot at the top of `element`.
  pub fn at(element: ElementId) -> Self {
    Self {
      element: Some(element),
      code: TransformCode::ROOT,
    }
  }

  /// Non-participating slot.
  pub const EMPTY: Self = Self {
    element: None,
    code: TransformCode::ROOT,
  };
}

/// Per-tree slots of one frame.
pub type Slots = SmallVec<[Slot; 4]>;

/// Synchronized position across all bound trees.
#[derive(Clone, Debug)]
pub struct State {
  pub(crate) slots: Slots,
  pub(crate) rep: usize,
  pub(crate) kind: ElementKind,
  pub(crate) boundary: [bool; 4],
  pub(crate) visited: bool,
  pub(crate) base: usize,
}

impl State {
  pub(crate) fn new(num_meshes: usize) -> Self {
    Self {
      slots: SmallVec::from_elem(Slot::EMPTY, num_meshes),
      rep: 0,
      kind: ElementKind::Quad,
      boundary: [true; 4],
      visited: false,
      base: 0,
    }
  }

  /// Reinitialize a reused frame: codes zeroed, boundary flags set, not
  /// visited.
  pub(crate) fn reset(&mut self, slots: &[Slot], kind: ElementKind, boundary: [bool; 4], base: usize) {
    self.slots.clear();
    self.slots.extend_from_slice(slots);
    self.rep = slots.iter().position(|s| s.element.is_some()).unwrap_or(0);
    self.kind = kind;
    self.boundary = boundary;
    self.visited = false;
    self.base = base;
  }

  /// Element of tree `index`, `None` if that tree does not participate.
  #[inline]
  pub fn element(&self, index: usize) -> Option<ElementId> {
    self.slots.get(index).and_then(|s| s.element)
  }

  /// Transform code of tree `index` relative to its element.
  #[inline]
  pub fn code(&self, index: usize) -> TransformCode {
    self.slots.get(index).map_or(TransformCode::ROOT, |s| s.code)
  }

  /// All slots, one per bound tree.
  pub fn slots(&self) -> &[Slot] {
    &self.slots
  }

  /// Index of the first participating tree.
  pub fn rep(&self) -> usize {
    self.rep
  }

  /// Element of the first participating tree.
  pub fn rep_element(&self) -> Option<ElementId> {
    self.element(self.rep)
  }

  /// True when the frame is triangle-shaped.
  pub fn is_triangle(&self) -> bool {
    self.kind == ElementKind::Triangle
  }

  /// Domain-boundary flag per edge (edge 3 is false for triangles).
  pub fn boundary(&self) -> [bool; 4] {
    self.boundary
  }

  /// Base element index the frame descends from.
  pub fn base(&self) -> usize {
    self.base
  }
}
