//! TransformCode - packed path of virtual descent steps.
//!
//! A code records how a traversal frame sits inside an element that is
//! coarser than the frame itself: every step is a [`Selector`] naming one of
//! the eight virtual children of the current window (see
//! [`constants`](crate::constants) for the layout). Codes are relative to the
//! element they are stored next to, never to the base element.

use std::fmt;

use smallvec::SmallVec;

use crate::constants::{CODE_BITS_PER_LEVEL, MAX_CODE_DEPTH};

/// Virtual child selector (0-7).
pub type Selector = u8;

/// Bottom-left quadrant.
pub const BOTTOM_LEFT: Selector = 0;
/// Bottom-right quadrant.
pub const BOTTOM_RIGHT: Selector = 1;
/// Top-right quadrant.
pub const TOP_RIGHT: Selector = 2;
/// Top-left quadrant.
pub const TOP_LEFT: Selector = 3;
/// Bottom half; son 0 of a `SplitKind::Vertical` element.
pub const BOTTOM: Selector = 4;
/// Top half; son 1 of a `SplitKind::Vertical` element.
pub const TOP: Selector = 5;
/// Left half; son 0 of a `SplitKind::Horizontal` element.
pub const LEFT: Selector = 6;
/// Right half; son 1 of a `SplitKind::Horizontal` element.
pub const RIGHT: Selector = 7;

/// Quadrant selectors in push order.
pub const QUADRANTS: [Selector; 4] = [BOTTOM_LEFT, BOTTOM_RIGHT, TOP_RIGHT, TOP_LEFT];

const DIGIT_MASK: u64 = (1 << CODE_BITS_PER_LEVEL) - 1;

/// Root-to-current path of virtual selectors, 3 bits per level.
///
/// The only interface is [`append`](Self::append), [`pop`](Self::pop),
/// [`peek_last`](Self::peek_last) and [`is_empty`](Self::is_empty); the
/// `+1` digit offset never leaks to call sites.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct TransformCode(u64);

impl TransformCode {
  /// Empty path: the frame covers the whole element.
  pub const ROOT: Self = Self(0);

  /// Wrap a raw packed value.
  pub const fn from_raw(raw: u64) -> Self {
    Self(raw)
  }

  /// Raw packed value.
  pub const fn raw(self) -> u64 {
    self.0
  }

  /// True when no virtual step is encoded.
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }

  /// Extend the path by one step.
  #[must_use]
  #[inline]
  pub fn append(self, selector: Selector) -> Self {
    debug_assert!(selector <= RIGHT, "selector {selector} out of range");
    debug_assert!(
      self.depth() < MAX_CODE_DEPTH,
      "transform code deeper than {MAX_CODE_DEPTH} levels"
    );
    Self((self.0 << CODE_BITS_PER_LEVEL) + selector as u64 + 1)
  }

  /// Most recently appended selector, `None` for the empty code.
  #[inline]
  pub fn peek_last(self) -> Option<Selector> {
    if self.is_empty() {
      None
    } else {
      Some(((self.0 - 1) & DIGIT_MASK) as Selector)
    }
  }

  /// Drop the most recent step. Popping the empty code is a no-op.
  #[must_use]
  #[inline]
  pub fn pop(self) -> Self {
    if self.is_empty() {
      self
    } else {
      Self((self.0 - 1) >> CODE_BITS_PER_LEVEL)
    }
  }

  /// Number of encoded steps.
  pub fn depth(self) -> usize {
    let mut depth = 0;
    let mut code = self;
    while !code.is_empty() {
      code = code.pop();
      depth += 1;
    }
    depth
  }

  /// Selectors in root-to-current order.
  pub fn selectors(self) -> SmallVec<[Selector; MAX_CODE_DEPTH]> {
    let mut out = SmallVec::new();
    let mut code = self;
    while let Some(selector) = code.peek_last() {
      out.push(selector);
      code = code.pop();
    }
    out.reverse();
    out
  }

  /// Build a code by appending `selectors` in order.
  pub fn from_selectors(selectors: impl IntoIterator<Item = Selector>) -> Self {
    selectors
      .into_iter()
      .fold(Self::ROOT, |code, selector| code.append(selector))
  }
}

impl fmt::Debug for TransformCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TransformCode({}, {:?})", self.0, self.selectors().as_slice())
  }
}

#[cfg(test)]
#[path = "code_test.rs"]
mod code_test;
