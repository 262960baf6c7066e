//! Son reconciler.
//!
//! When a tree's element is split coarser (or differently) than the frame
//! being expanded, the frame's region has to be found among the element's
//! physical sons, and whatever part of the path the son does not realize is
//! carried on in a fresh transform code relative to that son.
//!
//! ```text
//!   element split Vertical, request BOTTOM_RIGHT (##):
//!
//!   ┌─────────┐
//!   │  son 1  │    son 0 (bottom half) holds the quadrant,
//!   ├────┬────┤    residual code relative to son 0 = [RIGHT]
//!   │    │ ## │
//!   └────┴────┘
//! ```

use crate::code::{Selector, TransformCode};
use crate::mesh::SplitKind;
use crate::rect::{init_idx, ParamRect};
use crate::split::{locate_child, physical_child};

/// Outcome of [`reconcile`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciled {
  /// Physical son to descend into.
  pub child: usize,
  /// Residual path inside that son.
  pub code: TransformCode,
  /// False when the target straddled sons and was clipped to the chosen one.
  pub exact: bool,
}

/// Pick the son of an element split by `split` for the frame at `code`
/// narrowed by `request`.
///
/// `code` is relative to the element; `None` requests the frame's whole
/// region (a passthrough step). The returned code is relative to the chosen
/// son and, for exact results, decodes to the same region of the base
/// element as the request.
pub fn reconcile(split: SplitKind, code: TransformCode, request: Option<Selector>) -> Reconciled {
  if code.is_empty() {
    if let Some(child) = request.and_then(|selector| physical_child(split, selector)) {
      return Reconciled {
        child,
        code: TransformCode::ROOT,
        exact: true,
      };
    }
  }

  let region = ParamRect::from_code(code);
  let target = match request {
    Some(selector) => region.child(selector),
    None => region,
  };

  let found = locate_child(split, &ParamRect::UNIT, &target);
  let clipped = target.intersect(&found.window);

  Reconciled {
    child: found.child,
    code: init_idx(&clipped, &found.window),
    exact: found.exact,
  }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconcile_test;
