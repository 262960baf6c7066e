//! Split resolver.
//!
//! Answers two questions about a refined element and a window inside it:
//! which of the element's sons hold the pieces of that window, and which
//! cuts the window itself needs so that every piece fits in a single son.

use crate::code::{Selector, TransformCode, QUADRANTS};
use crate::mesh::{Element, SplitKind};
use crate::rect::ParamRect;

/// Result of [`split_and_children`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitResolution {
  /// Virtual child of the element holding each quadrant of the target.
  pub children: [Selector; 4],
  /// Cuts of the target needed to separate the element's sons.
  pub needed: SplitKind,
}

/// A son located by [`locate_child`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildWindow {
  /// Physical son index.
  pub child: usize,
  /// Window of that son, in the same frame as the query window.
  pub window: ParamRect,
  /// False when the target straddles several sons and the largest overlap
  /// was taken.
  pub exact: bool,
}

/// Refinement stored on an element; unrefined elements report `None`.
#[inline]
pub fn split_kind(element: &Element) -> SplitKind {
  if element.is_leaf() {
    SplitKind::None
  } else if element.is_triangle() {
    SplitKind::Both
  } else {
    element.split
  }
}

/// Physical son that realizes virtual child `selector` exactly, if any.
///
/// ```text
///   Both        quadrant q -> son q
///   Horizontal  LEFT -> 0,   RIGHT -> 1
///   Vertical    BOTTOM -> 0, TOP -> 1
/// ```
#[inline]
pub fn physical_child(split: SplitKind, selector: Selector) -> Option<usize> {
  (0..split.son_count()).find(|&index| split.son_selector(index) == Some(selector))
}

/// Find the son of an element split by `split` that holds `target`.
///
/// `window` is the element's own window and `target` must lie inside it.
/// Containment is inclusive and the lowest son index wins ties. When no
/// son contains the whole target, the son with the largest overlap is
/// returned with `exact == false`.
pub fn locate_child(split: SplitKind, window: &ParamRect, target: &ParamRect) -> ChildWindow {
  if split == SplitKind::None {
    return ChildWindow {
      child: 0,
      window: *window,
      exact: window.contains(target),
    };
  }

  let mut best: Option<(ChildWindow, f64)> = None;
  for index in 0..split.son_count() {
    let Some(selector) = split.son_selector(index) else {
      continue;
    };
    let son_window = window.child(selector);
    if son_window.contains(target) {
      return ChildWindow {
        child: index,
        window: son_window,
        exact: true,
      };
    }

    let overlap = son_window.overlap_area(target);
    if best.map_or(true, |(_, area)| overlap > area) {
      best = Some((
        ChildWindow {
          child: index,
          window: son_window,
          exact: false,
        },
        overlap,
      ));
    }
  }

  best.map_or(
    ChildWindow {
      child: 0,
      window: *window,
      exact: false,
    },
    |(found, _)| found,
  )
}

/// Cuts of `split` that `target` straddles inside `element_rect`.
///
/// A cut is needed when the element has it and the target's interior
/// crosses the matching midline; a target touching a midline only at its
/// edge needs nothing.
#[inline]
pub fn needed_cuts(split: SplitKind, target: &ParamRect, element_rect: &ParamRect) -> SplitKind {
  let hmid = element_rect.hmid();
  let vmid = element_rect.vmid();

  let crosses_hmid = target.l < hmid && hmid < target.r;
  let crosses_vmid = target.b < vmid && vmid < target.t;
  let crossing = crosses_hmid as u8 | (crosses_vmid as u8) << 1;
  SplitKind::from_bits(split.bits() & crossing)
}

/// Classify `target` against an element split by `split` whose window is
/// `element_rect`: the cuts it needs (see [`needed_cuts`]) and the son
/// holding each of its quadrants. Quadrants of an unrefined element map to
/// themselves.
pub fn split_and_children(
  split: SplitKind,
  target: &ParamRect,
  element_rect: &ParamRect,
) -> SplitResolution {
  let needed = needed_cuts(split, target, element_rect);

  let mut children = QUADRANTS;
  if split != SplitKind::None {
    for (slot, &quadrant) in children.iter_mut().zip(QUADRANTS.iter()) {
      let piece = target.child(quadrant);
      let found = locate_child(split, element_rect, &piece);
      *slot = split.son_selector(found.child).unwrap_or(quadrant);
    }
  }

  SplitResolution { children, needed }
}

/// Cuts needed below a frame that sits at `code` inside `element`.
///
/// For the empty code this is the element's own split.
pub fn needed_split(element: &Element, code: TransformCode) -> SplitKind {
  let split = split_kind(element);
  if code.is_empty() || split == SplitKind::None {
    split
  } else {
    needed_cuts(split, &ParamRect::from_code(code), &ParamRect::UNIT)
  }
}

#[cfg(test)]
#[path = "split_test.rs"]
mod split_test;
