//! Synchronized multi-tree traversal.
//!
//! [`Traverse`] binds N refinement forests that share the same base
//! elements and walks them in lock-step, depth first, with an explicit frame
//! stack held by a [`Cursor`]. Every leaf frame is a region that is a leaf
//! (or lies inside a leaf) in every participating tree; per tree it carries
//! the element holding the region and the [`TransformCode`] locating the
//! region inside that element.
//!
//! # Module Structure
//!
//! - [`config`]: `TraverseConfig` - stack capacity and precondition tuning
//! - [`state`]: `State` frames and per-tree `Slot`s
//! - [`cursor`]: `Cursor` - private stack and base position of one walk
//! - [`stats`]: `TraversalStats` - per-cursor counters
//! - [`binding`]: `ActiveBinding` side channel for stepping consumers
//! - `expand`: per-slot descent shared with the union builder
//!
//! [`TransformCode`]: crate::code::TransformCode

pub mod binding;
pub mod config;
pub mod cursor;
pub(crate) mod expand;
pub mod state;
pub mod stats;

use std::ops::Range;

use rayon::prelude::*;
use smallvec::SmallVec;

// Re-exports
pub use binding::{ActiveBinding, ActiveElement};
pub use config::TraverseConfig;
pub use cursor::Cursor;
pub use state::{Slot, Slots, State};
pub use stats::TraversalStats;

use crate::error::TraverseError;
use crate::mesh::{ElementKind, MeshTree};
use expand::{expand, is_leaf_frame, leaf_boundary};

/// N trees bound together for synchronized traversal.
///
/// Binding only borrows the trees; any number of cursors may walk them
/// concurrently.
#[derive(Debug)]
pub struct Traverse<'m, M: MeshTree> {
  meshes: SmallVec<[&'m M; 4]>,
  config: TraverseConfig,
}

impl<'m, M: MeshTree> Clone for Traverse<'m, M> {
  fn clone(&self) -> Self {
    Self {
      meshes: self.meshes.clone(),
      config: self.config,
    }
  }
}

impl<'m, M: MeshTree> Traverse<'m, M> {
  /// Bind `meshes` with the default configuration.
  pub fn begin(meshes: &[&'m M]) -> Result<Self, TraverseError> {
    Self::begin_with(meshes, TraverseConfig::DEFAULT)
  }

  /// Bind `meshes`, checking that they share compatible base elements.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "traverse::begin"))]
  pub fn begin_with(meshes: &[&'m M], config: TraverseConfig) -> Result<Self, TraverseError> {
    if meshes.is_empty() {
      return Err(TraverseError::NoMeshes);
    }
    if config.check_compatibility {
      check_compatibility(meshes, config.area_tolerance_divisor)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
      meshes = meshes.len(),
      base_elements = meshes[0].num_base_elements(),
      "bound meshes for traversal"
    );

    Ok(Self {
      meshes: SmallVec::from_slice(meshes),
      config,
    })
  }

  /// Number of bound trees.
  pub fn num_meshes(&self) -> usize {
    self.meshes.len()
  }

  /// Bound trees, in binding order.
  pub fn meshes(&self) -> &[&'m M] {
    &self.meshes
  }

  /// Active configuration.
  pub fn config(&self) -> &TraverseConfig {
    &self.config
  }

  /// Number of shared base elements.
  pub fn num_base_elements(&self) -> usize {
    self.meshes[0].num_base_elements()
  }

  /// Cursor over every base element.
  pub fn cursor(&self) -> Cursor {
    self.cursor_range(0..self.num_base_elements())
  }

  /// Cursor over a range of base elements, clamped to the ones that exist.
  pub fn cursor_range(&self, range: Range<usize>) -> Cursor {
    let end = range.end.min(self.num_base_elements());
    let start = range.start.min(end);
    Cursor::new(start..end, self.num_meshes(), self.config.stack_capacity)
  }

  /// Push the frame of the next base element any tree uses.
  fn push_next_base(&self, cursor: &mut Cursor) -> Result<bool, TraverseError> {
    while cursor.base < cursor.end {
      let index = cursor.base;
      cursor.base += 1;

      let mut slots = Slots::with_capacity(self.meshes.len());
      let mut kind: Option<ElementKind> = None;
      for mesh in &self.meshes {
        let element = mesh.base_element(index);
        if element.used {
          kind.get_or_insert(element.kind);
          slots.push(Slot::at(element.id));
        } else {
          slots.push(Slot::EMPTY);
        }
      }

      if let Some(kind) = kind {
        cursor.push(&slots, kind, [true; 4], index)?;
        return Ok(true);
      }
    }
    Ok(false)
  }

  /// Run the stack machine up to the next leaf frame; returns its index.
  ///
  /// Any error is fatal for the cursor: its stack is dropped and every
  /// later call returns the same error.
  fn advance(&self, cursor: &mut Cursor) -> Result<Option<usize>, TraverseError> {
    if let Some(error) = &cursor.failed {
      return Err(error.clone());
    }
    self.step(cursor).map_err(|error| cursor.fail(error))
  }

  fn step(&self, cursor: &mut Cursor) -> Result<Option<usize>, TraverseError> {
    loop {
      cursor.pop_visited();
      if cursor.top == 0 && !self.push_next_base(cursor)? {
        return Ok(None);
      }

      let index = cursor.top - 1;
      let state = &mut cursor.stack[index];
      state.visited = true;

      if is_leaf_frame(self.meshes(), &state.slots) {
        state.boundary = leaf_boundary(self.meshes(), &state.slots, state.rep, state.boundary);
        cursor.stats.leaf_frames += 1;
        return Ok(Some(index));
      }

      let state = &cursor.stack[index];
      let kind = state.kind;
      let base = state.base;
      let expansion = expand(
        self.meshes(),
        &state.slots,
        kind,
        state.boundary,
        &mut cursor.stats,
      )?;

      // reversed so that children surface in ascending selector order
      for child in expansion.children.iter().rev() {
        cursor.push(&child.slots, kind, child.boundary, base)?;
      }
    }
  }

  /// Next leaf frame, or `None` once the cursor's range is exhausted.
  pub fn next_state<'c>(&self, cursor: &'c mut Cursor) -> Result<Option<&'c State>, TraverseError> {
    match self.advance(cursor)? {
      Some(index) => Ok(Some(&cursor.stack[index])),
      None => Ok(None),
    }
  }

  /// Like [`next_state`](Self::next_state), and also pushes every tree's
  /// element and transform into `bindings` (one per tree, binding order).
  pub fn next_state_bound<'c, B: ActiveBinding>(
    &self,
    cursor: &'c mut Cursor,
    bindings: &mut [B],
  ) -> Result<Option<&'c State>, TraverseError> {
    let Some(index) = self.advance(cursor)? else {
      return Ok(None);
    };

    let state = &cursor.stack[index];
    for (tree, binding) in bindings.iter_mut().enumerate().take(self.meshes.len()) {
      binding.set_active_element(state.element(tree));
      binding.set_transform(state.code(tree));
    }
    Ok(Some(state))
  }

  /// Drive `cursor` to the end of its range, counting leaf frames.
  pub fn count_remaining(&self, cursor: &mut Cursor) -> Result<usize, TraverseError> {
    let mut count = 0;
    while self.advance(cursor)?.is_some() {
      count += 1;
    }
    Ok(count)
  }

  /// Number of leaf frames over all base elements.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "traverse::count_states"))]
  pub fn count_states(&self) -> Result<usize, TraverseError> {
    let mut cursor = self.cursor();
    let count = self.count_remaining(&mut cursor)?;
    cursor.finish();
    Ok(count)
  }
}

impl<'m, M: MeshTree + Sync> Traverse<'m, M> {
  /// Count leaf frames in parallel, one private cursor per chunk of base
  /// elements. Returns the count and the merged statistics.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "traverse::par_count_states"))]
  pub fn par_count_states(&self) -> Result<(usize, TraversalStats), TraverseError> {
    let num_base = self.num_base_elements();
    let chunk = num_base.div_ceil(rayon::current_num_threads()).max(1);
    let num_chunks = num_base.div_ceil(chunk);

    (0..num_chunks)
      .into_par_iter()
      .map(|i| {
        let mut cursor = self.cursor_range(i * chunk..(i + 1) * chunk);
        let count = self.count_remaining(&mut cursor)?;
        Ok((count, cursor.stats()))
      })
      .try_reduce(
        || (0, TraversalStats::default()),
        |(a, sa), (b, sb)| Ok((a + b, sa.merge(sb))),
      )
  }
}

/// Base counts must match; used base elements must agree in kind and area.
fn check_compatibility<M: MeshTree>(meshes: &[&M], divisor: f64) -> Result<(), TraverseError> {
  let first = meshes[0];
  let num_base = first.num_base_elements();

  for (mesh_index, mesh) in meshes.iter().enumerate().skip(1) {
    let found = mesh.num_base_elements();
    if found != num_base {
      #[cfg(feature = "tracing")]
      tracing::warn!(mesh = mesh_index, expected = num_base, found, "base element count mismatch");
      return Err(TraverseError::BaseCountMismatch {
        expected: num_base,
        found,
        mesh: mesh_index,
      });
    }
  }

  let min_area = (0..num_base)
    .map(|i| first.base_element(i))
    .filter(|e| e.used)
    .map(|e| e.area())
    .fold(f64::INFINITY, f64::min);
  let tolerance = min_area / divisor;

  for base in 0..num_base {
    let reference = first.base_element(base);
    if !reference.used {
      continue;
    }
    let expected = reference.area();

    for (mesh_index, mesh) in meshes.iter().enumerate().skip(1) {
      let element = mesh.base_element(base);
      if !element.used {
        continue;
      }
      if element.kind != reference.kind {
        #[cfg(feature = "tracing")]
        tracing::warn!(mesh = mesh_index, base, "base element kind mismatch");
        return Err(TraverseError::BaseKindMismatch {
          base,
          mesh: mesh_index,
        });
      }

      let found = element.area();
      if (found - expected).abs() > tolerance {
        #[cfg(feature = "tracing")]
        tracing::warn!(mesh = mesh_index, base, expected, found, "base element area mismatch");
        return Err(TraverseError::BaseAreaMismatch {
          base,
          mesh: mesh_index,
          expected,
          found,
          tolerance,
        });
      }
    }
  }

  Ok(())
}

#[cfg(test)]
#[path = "traverse_test.rs"]
mod traverse_test;
