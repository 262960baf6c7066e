//! Per-cursor traversal counters.

/// Statistics accumulated by one cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TraversalStats {
  /// Frames pushed, base frames included.
  pub frames_pushed: usize,
  /// Leaf frames surfaced or counted.
  pub leaf_frames: usize,
  /// Slot descents that went through the son reconciler.
  pub reconciled: usize,
  /// Reconciler results clipped to the largest-overlap son.
  pub fallbacks: usize,
  /// Highest number of simultaneous frames.
  pub peak_stack: usize,
}

impl TraversalStats {
  /// Combine counters from two cursors.
  #[must_use]
  pub fn merge(self, other: Self) -> Self {
    Self {
      frames_pushed: self.frames_pushed + other.frames_pushed,
      leaf_frames: self.leaf_frames + other.leaf_frames,
      reconciled: self.reconciled + other.reconciled,
      fallbacks: self.fallbacks + other.fallbacks,
      peak_stack: self.peak_stack.max(other.peak_stack),
    }
  }
}
