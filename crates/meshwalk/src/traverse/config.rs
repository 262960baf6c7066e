//! TraverseConfig - limits and precondition tuning for a traversal session.

use crate::constants::{DEFAULT_AREA_TOLERANCE_DIVISOR, DEFAULT_STACK_CAPACITY};

/// Configuration for binding trees and walking them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraverseConfig {
  /// Maximum simultaneous frames per cursor.
  /// Exceeding it is a [`StackOverflow`](crate::TraverseError::StackOverflow).
  pub stack_capacity: usize,

  /// Base areas may differ by at most `min_area / area_tolerance_divisor`.
  pub area_tolerance_divisor: f64,

  /// Run the base-element compatibility checks in `begin`.
  pub check_compatibility: bool,
}

impl TraverseConfig {
  /// Default configuration.
  pub const DEFAULT: Self = Self {
    stack_capacity: DEFAULT_STACK_CAPACITY,
    area_tolerance_divisor: DEFAULT_AREA_TOLERANCE_DIVISOR,
    check_compatibility: true,
  };

  /// Same configuration with a different stack capacity.
  #[must_use]
  pub const fn with_stack_capacity(mut self, stack_capacity: usize) -> Self {
    self.stack_capacity = stack_capacity;
    self
  }

  /// Same configuration with compatibility checks switched on or off.
  #[must_use]
  pub const fn with_compatibility_check(mut self, check: bool) -> Self {
    self.check_compatibility = check;
    self
  }
}

impl Default for TraverseConfig {
  fn default() -> Self {
    Self::DEFAULT
  }
}
