//! Frame expansion shared by the stack machine and the union builder.
//!
//! Given the slots of a non-leaf frame, decide the union split and produce
//! the slots of every child frame. Per tree, a child slot is obtained by
//!
//! - extending the code, when the tree is already at a leaf,
//! - stepping to the son directly, when the tree's own split realizes the
//!   child and no virtual path is pending,
//! - asking the son reconciler otherwise.

use smallvec::SmallVec;

use super::state::{Slot, Slots};
use super::stats::TraversalStats;
use crate::code::{Selector, BOTTOM, LEFT, QUADRANTS, RIGHT, TOP};
use crate::error::TraverseError;
use crate::mesh::{ElementKind, MeshError, MeshTree, SplitKind};
use crate::reconcile::reconcile;
use crate::rect::ParamRect;
use crate::split::{needed_split, physical_child};

/// One child frame produced by [`expand`].
#[derive(Clone, Debug)]
pub(crate) struct Child {
  /// Virtual child of the parent frame, `None` for a passthrough step.
  pub selector: Option<Selector>,
  pub slots: Slots,
  pub boundary: [bool; 4],
}

/// Children of a non-leaf frame.
#[derive(Clone, Debug)]
pub(crate) struct Expansion {
  /// Union split; `None` means a single passthrough child.
  pub split: SplitKind,
  pub children: SmallVec<[Child; 4]>,
}

/// True when every participating slot sits on a leaf.
pub(crate) fn is_leaf_frame<M: MeshTree>(meshes: &[&M], slots: &[Slot]) -> bool {
  slots
    .iter()
    .zip(meshes)
    .all(|(slot, mesh)| slot.element.map_or(true, |id| mesh.element(id).is_leaf()))
}

/// Inherited flags restricted to the representative element's own flags.
pub(crate) fn leaf_boundary<M: MeshTree>(
  meshes: &[&M],
  slots: &[Slot],
  rep: usize,
  inherited: [bool; 4],
) -> [bool; 4] {
  let Some(id) = slots.get(rep).and_then(|s| s.element) else {
    return inherited;
  };
  let element = meshes[rep].element(id);
  std::array::from_fn(|edge| inherited[edge] && element.is_boundary(edge))
}

/// Union split of a quad frame: every cut some non-leaf tree still needs.
pub(crate) fn union_split<M: MeshTree>(meshes: &[&M], slots: &[Slot]) -> SplitKind {
  slots
    .iter()
    .zip(meshes)
    .filter_map(|(slot, mesh)| slot.element.map(|id| (mesh.element(id), slot.code)))
    .filter(|(element, _)| !element.is_leaf())
    .fold(SplitKind::None, |acc, (element, code)| {
      acc.union(needed_split(element, code))
    })
}

/// Virtual children pushed for a union split.
fn union_selectors(kind: ElementKind, split: SplitKind) -> SmallVec<[Option<Selector>; 4]> {
  match (kind, split) {
    (ElementKind::Triangle, _) | (ElementKind::Quad, SplitKind::Both) => {
      QUADRANTS.iter().map(|&q| Some(q)).collect()
    }
    (ElementKind::Quad, SplitKind::Horizontal) => SmallVec::from_slice(&[Some(LEFT), Some(RIGHT)]),
    (ElementKind::Quad, SplitKind::Vertical) => SmallVec::from_slice(&[Some(BOTTOM), Some(TOP)]),
    (ElementKind::Quad, SplitKind::None) => SmallVec::from_slice(&[None]),
  }
}

/// Boundary flags of a child frame.
pub(crate) fn narrow_boundary(
  kind: ElementKind,
  boundary: [bool; 4],
  selector: Option<Selector>,
) -> [bool; 4] {
  let Some(selector) = selector else {
    return boundary;
  };

  match kind {
    ElementKind::Triangle => {
      let mut out = boundary;
      if selector == 3 {
        out = [false; 4];
      } else {
        out[(selector as usize + 1) % 3] = false;
      }
      out
    }
    ElementKind::Quad => {
      let unit = ParamRect::UNIT;
      let child = unit.child(selector);
      let touches = [child.b == unit.b, child.r == unit.r, child.t == unit.t, child.l == unit.l];
      std::array::from_fn(|edge| boundary[edge] && touches[edge])
    }
  }
}

/// Slot of one tree in the child frame reached through `selector`.
pub(crate) fn descend_slot<M: MeshTree>(
  mesh: &M,
  slot: Slot,
  selector: Option<Selector>,
  stats: &mut TraversalStats,
) -> Result<Slot, TraverseError> {
  let Some(id) = slot.element else {
    return Ok(slot);
  };
  let element = mesh.element(id);

  if element.is_leaf() {
    let code = selector.map_or(slot.code, |s| slot.code.append(s));
    return Ok(Slot {
      element: Some(id),
      code,
    });
  }

  let split = if element.is_triangle() {
    SplitKind::Both
  } else {
    element.split
  };

  if slot.code.is_empty() {
    let direct = match (element.kind, selector) {
      (ElementKind::Triangle, Some(s)) => Some(s as usize),
      (ElementKind::Quad, Some(s)) => physical_child(split, s),
      (_, None) => None,
    };
    if let Some(index) = direct {
      let son = element.son(index).ok_or(MeshError::MissingSon(id, index))?;
      return Ok(Slot::at(son));
    }
  }

  debug_assert!(element.is_quad(), "triangle slots never carry a pending path");

  let result = reconcile(split, slot.code, selector);
  stats.reconciled += 1;
  if !result.exact {
    stats.fallbacks += 1;
    #[cfg(feature = "tracing")]
    tracing::debug!(
      element = id.index(),
      code = ?slot.code,
      ?selector,
      child = result.child,
      "reconciler clipped a straddling region"
    );
  }

  let son = element
    .son(result.child)
    .ok_or(MeshError::MissingSon(id, result.child))?;
  Ok(Slot {
    element: Some(son),
    code: result.code,
  })
}

/// Expand a non-leaf frame into its children, in ascending selector order.
pub(crate) fn expand<M: MeshTree>(
  meshes: &[&M],
  slots: &[Slot],
  kind: ElementKind,
  boundary: [bool; 4],
  stats: &mut TraversalStats,
) -> Result<Expansion, TraverseError> {
  let split = match kind {
    ElementKind::Triangle => SplitKind::Both,
    ElementKind::Quad => union_split(meshes, slots),
  };

  let mut children = SmallVec::new();
  for selector in union_selectors(kind, split) {
    let mut child_slots = Slots::with_capacity(slots.len());
    for (slot, mesh) in slots.iter().zip(meshes) {
      child_slots.push(descend_slot(*mesh, *slot, selector, stats)?);
    }
    children.push(Child {
      selector,
      slots: child_slots,
      boundary: narrow_boundary(kind, boundary, selector),
    });
  }

  Ok(Expansion { split, children })
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod expand_test;
