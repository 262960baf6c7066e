//! ParamRect - axis-aligned window in the normalized parametric square.
//!
//! Windows are fixed-point so that repeated bisection stays exact: two paths
//! that describe the same region always produce bit-identical rectangles.

use crate::code::{Selector, TransformCode};
use crate::constants::{MAX_CODE_DEPTH, PARAM_ONE};

/// Parametric window `[l, r] x [b, t]` inside `[0, PARAM_ONE]^2`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ParamRect {
  /// Left edge.
  pub l: u64,
  /// Bottom edge.
  pub b: u64,
  /// Right edge.
  pub r: u64,
  /// Top edge.
  pub t: u64,
}

impl ParamRect {
  /// The whole base element.
  pub const UNIT: Self = Self {
    l: 0,
    b: 0,
    r: PARAM_ONE,
    t: PARAM_ONE,
  };

  /// Create a window from its edges.
  pub const fn new(l: u64, b: u64, r: u64, t: u64) -> Self {
    Self { l, b, r, t }
  }

  /// Vertical midline (x coordinate).
  #[inline]
  pub fn hmid(&self) -> u64 {
    self.l + (self.r - self.l) / 2
  }

  /// Horizontal midline (y coordinate).
  #[inline]
  pub fn vmid(&self) -> u64 {
    self.b + (self.t - self.b) / 2
  }

  /// Shrink to the virtual child named by `selector`.
  #[must_use]
  pub fn child(&self, selector: Selector) -> Self {
    let hmid = self.hmid();
    let vmid = self.vmid();
    let mut out = *self;
    match selector {
      0 => {
        out.r = hmid;
        out.t = vmid;
      }
      1 => {
        out.l = hmid;
        out.t = vmid;
      }
      2 => {
        out.l = hmid;
        out.b = vmid;
      }
      3 => {
        out.r = hmid;
        out.b = vmid;
      }
      4 => out.t = vmid,
      5 => out.b = vmid,
      6 => out.r = hmid,
      7 => out.l = hmid,
      _ => debug_assert!(false, "selector {selector} out of range"),
    }
    out
  }

  /// Apply every step of `code`, starting from this window.
  #[must_use]
  pub fn within(&self, code: TransformCode) -> Self {
    code
      .selectors()
      .iter()
      .fold(*self, |rect, &selector| rect.child(selector))
  }

  /// Decode `code` relative to the unit square.
  pub fn from_code(code: TransformCode) -> Self {
    Self::UNIT.within(code)
  }

  /// True when `other` lies inside this window (edges inclusive).
  #[inline]
  pub fn contains(&self, other: &ParamRect) -> bool {
    other.l >= self.l && other.r <= self.r && other.b >= self.b && other.t <= self.t
  }

  /// True when the interiors intersect.
  #[inline]
  pub fn overlaps(&self, other: &ParamRect) -> bool {
    self.l < other.r && other.l < self.r && self.b < other.t && other.b < self.t
  }

  /// Common part of two windows; degenerate if they do not overlap.
  #[must_use]
  pub fn intersect(&self, other: &ParamRect) -> Self {
    let l = self.l.max(other.l);
    let b = self.b.max(other.b);
    Self {
      l,
      b,
      r: self.r.min(other.r).max(l),
      t: self.t.min(other.t).max(b),
    }
  }

  /// Width in fixed-point units.
  pub fn width(&self) -> u64 {
    self.r - self.l
  }

  /// Height in fixed-point units.
  pub fn height(&self) -> u64 {
    self.t - self.b
  }

  /// Overlap area in fixed-point units squared, as f64.
  pub fn overlap_area(&self, other: &ParamRect) -> f64 {
    let common = self.intersect(other);
    common.width() as f64 * common.height() as f64
  }

  /// Share of the unit square covered by this window.
  pub fn area_fraction(&self) -> f64 {
    let one = PARAM_ONE as f64;
    (self.width() as f64 / one) * (self.height() as f64 / one)
  }

  /// True for the whole base element.
  pub fn is_unit(&self) -> bool {
    *self == Self::UNIT
  }
}

impl Default for ParamRect {
  fn default() -> Self {
    Self::UNIT
  }
}

/// Derive the code that carves `target` out of `window` by bisection.
///
/// Each step prefers a quadrant, then a bottom/top half, then a left/right
/// half, so the result is the shortest path and ties resolve toward the
/// lower-numbered region. `target` must be a dyadic sub-window of `window`.
pub fn init_idx(target: &ParamRect, window: &ParamRect) -> TransformCode {
  debug_assert!(window.contains(target), "{target:?} is not inside {window:?}");

  let mut rect = *window;
  let mut code = TransformCode::ROOT;
  let mut depth = 0;

  while rect != *target {
    if depth == MAX_CODE_DEPTH {
      debug_assert!(false, "{target:?} is deeper than a transform code allows");
      break;
    }

    let hmid = rect.hmid();
    let vmid = rect.vmid();
    let selector = if target.r <= hmid && target.t <= vmid {
      0
    } else if target.l >= hmid && target.t <= vmid {
      1
    } else if target.l >= hmid && target.b >= vmid {
      2
    } else if target.r <= hmid && target.b >= vmid {
      3
    } else if target.t <= vmid {
      4
    } else if target.b >= vmid {
      5
    } else if target.r <= hmid {
      6
    } else if target.l >= hmid {
      7
    } else {
      debug_assert!(false, "{target:?} is not a dyadic sub-window of {rect:?}");
      break;
    };

    rect = rect.child(selector);
    code = code.append(selector);
    depth += 1;
  }

  code
}

#[cfg(test)]
#[path = "rect_test.rs"]
mod rect_test;
