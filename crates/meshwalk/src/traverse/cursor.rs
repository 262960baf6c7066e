//! Cursor - private frame stack and base-element position of one walk.
//!
//! Several cursors can walk the same bound trees at once; each owns its
//! stack, the trees are only read.

use std::ops::Range;

use super::state::{Slot, State};
use super::stats::TraversalStats;
use crate::error::TraverseError;
use crate::mesh::ElementKind;

/// Explicit-stack position of one traversal.
#[derive(Clone, Debug)]
pub struct Cursor {
  pub(crate) stack: Vec<State>,
  pub(crate) top: usize,
  pub(crate) base: usize,
  pub(crate) start: usize,
  pub(crate) end: usize,
  pub(crate) capacity: usize,
  pub(crate) num_meshes: usize,
  pub(crate) stats: TraversalStats,
  pub(crate) failed: Option<TraverseError>,
}

impl Cursor {
  pub(crate) fn new(range: Range<usize>, num_meshes: usize, capacity: usize) -> Self {
    Self {
      stack: Vec::new(),
      top: 0,
      base: range.start,
      start: range.start,
      end: range.end,
      capacity,
      num_meshes,
      stats: TraversalStats::default(),
      failed: None,
    }
  }

  /// Counters accumulated so far.
  pub fn stats(&self) -> TraversalStats {
    self.stats
  }

  /// Frames currently on the stack.
  pub fn depth(&self) -> usize {
    self.top
  }

  /// Base-element range this cursor walks.
  pub fn range(&self) -> Range<usize> {
    self.start..self.end
  }

  /// True once every base element of the range has been walked without
  /// error.
  pub fn is_finished(&self) -> bool {
    self.failed.is_none() && self.top == 0 && self.base >= self.end
  }

  /// Error that stopped this cursor, if any. A failed cursor keeps
  /// returning it until [`reset`](Self::reset).
  pub fn error(&self) -> Option<&TraverseError> {
    self.failed.as_ref()
  }

  /// Rewind to the start of the range, keeping frame storage and clearing
  /// counters and any recorded error.
  pub fn reset(&mut self) {
    self.top = 0;
    self.base = self.start;
    self.stats = TraversalStats::default();
    self.failed = None;
  }

  /// Release frame storage and mark the walk as exhausted.
  pub fn finish(&mut self) {
    self.stack = Vec::new();
    self.top = 0;
    self.base = self.end;
  }

  /// Record a fatal error and drop the half-expanded stack.
  pub(crate) fn fail(&mut self, error: TraverseError) -> TraverseError {
    self.finish();
    self.failed = Some(error.clone());
    error
  }

  /// Push a fresh frame, reusing storage from earlier frames.
  pub(crate) fn push(
    &mut self,
    slots: &[Slot],
    kind: ElementKind,
    boundary: [bool; 4],
    base: usize,
  ) -> Result<(), TraverseError> {
    if self.top >= self.capacity {
      #[cfg(feature = "tracing")]
      tracing::warn!(capacity = self.capacity, base, "traversal stack overflow");
      return Err(TraverseError::StackOverflow {
        capacity: self.capacity,
      });
    }

    if self.top == self.stack.len() {
      self.stack.push(State::new(self.num_meshes));
      #[cfg(feature = "tracing")]
      tracing::trace!(frames = self.stack.len(), "traversal stack grown");
    }

    self.stack[self.top].reset(slots, kind, boundary, base);
    self.top += 1;
    self.stats.frames_pushed += 1;
    self.stats.peak_stack = self.stats.peak_stack.max(self.top);
    Ok(())
  }

  /// Unwind frames whose children have all been walked.
  pub(crate) fn pop_visited(&mut self) {
    while self.top > 0 && self.stack[self.top - 1].visited {
      self.top -= 1;
    }
  }
}
