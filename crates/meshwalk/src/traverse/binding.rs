//! Active-element side channel.
//!
//! Consumers that evaluate quantities on each tree keep a "current element
//! and sub-region" binding per tree. [`Traverse::next_state_bound`]
//! updates one binding per tree for every surfaced leaf frame.
//!
//! [`Traverse::next_state_bound`]: super::Traverse::next_state_bound

use crate::code::TransformCode;
use crate::mesh::ElementId;

/// Receiver of per-frame element and transform updates.
pub trait ActiveBinding {
  /// Element of this tree at the frame; `None` when it does not participate.
  fn set_active_element(&mut self, element: Option<ElementId>);

  /// Sub-region of the active element covered by the frame.
  fn set_transform(&mut self, code: TransformCode);
}

/// Plain binding that remembers the last update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActiveElement {
  pub element: Option<ElementId>,
  pub code: TransformCode,
}

impl ActiveBinding for ActiveElement {
  fn set_active_element(&mut self, element: Option<ElementId>) {
    self.element = element;
    self.code = TransformCode::ROOT;
  }

  fn set_transform(&mut self, code: TransformCode) {
    self.code = code;
  }
}
