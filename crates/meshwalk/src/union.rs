//! Union-mesh builder.
//!
//! Materializes the common refinement of all bound trees as a new [`Mesh`]
//! and records, for every union leaf and every tree, which element of that
//! tree holds the leaf and where inside it the leaf sits.
//!
//! The recursion follows the stack machine's frames exactly, so the union
//! leaves come out in the same order as [`Traverse::next_state`] yields
//! leaf frames.

use crate::code::TransformCode;
use crate::constants::UNION_TABLE_INITIAL_SIZE;
use crate::error::TraverseError;
use crate::mesh::{ElementId, ElementKind, Mesh, MeshTree, SplitKind};
use crate::traverse::expand::{expand, is_leaf_frame};
use crate::traverse::{Slot, Slots, TraversalStats, Traverse};

/// Where a union leaf sits inside one input tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniData {
  /// Leaf (or coarser element) of the input tree holding the union leaf.
  pub element: ElementId,
  /// Path from `element` down to the union leaf.
  pub code: TransformCode,
}

/// Per-tree tables from union leaf id to [`UniData`].
#[derive(Clone, Debug, Default)]
pub struct UnionMap {
  tables: Vec<Vec<Option<UniData>>>,
  leaves: Vec<ElementId>,
  stats: TraversalStats,
}

impl UnionMap {
  fn new(num_meshes: usize) -> Self {
    Self {
      tables: vec![Vec::new(); num_meshes],
      leaves: Vec::new(),
      stats: TraversalStats::default(),
    }
  }

  /// Number of input trees.
  pub fn num_meshes(&self) -> usize {
    self.tables.len()
  }

  /// Entry of tree `tree` for union leaf `leaf`; `None` for non-leaves and
  /// for trees that do not participate there.
  pub fn get(&self, tree: usize, leaf: ElementId) -> Option<UniData> {
    self.tables.get(tree)?.get(leaf.index()).copied().flatten()
  }

  /// Raw table of tree `tree`, indexed by union element id.
  pub fn table(&self, tree: usize) -> &[Option<UniData>] {
    self.tables.get(tree).map(Vec::as_slice).unwrap_or_default()
  }

  /// Union leaves in traversal order.
  pub fn leaves(&self) -> &[ElementId] {
    &self.leaves
  }

  /// Number of union leaves.
  pub fn len(&self) -> usize {
    self.leaves.len()
  }

  /// True when no union leaf was produced.
  pub fn is_empty(&self) -> bool {
    self.leaves.is_empty()
  }

  /// Counters of the frame expansion that built the union.
  pub fn stats(&self) -> TraversalStats {
    self.stats
  }

  fn insert(&mut self, leaf: ElementId, slots: &[Slot]) {
    let index = leaf.index();
    for (table, slot) in self.tables.iter_mut().zip(slots) {
      if index >= table.len() {
        let mut size = table.len().max(UNION_TABLE_INITIAL_SIZE);
        while index >= size {
          size *= 2;
        }
        table.resize(size, None);
      }

      debug_assert!(table[index].is_none(), "union leaf {leaf:?} recorded twice");
      table[index] = slot.element.map(|element| UniData {
        element,
        code: slot.code,
      });
    }
    self.leaves.push(leaf);
  }
}

impl<'m, M: MeshTree> Traverse<'m, M> {
  /// Rebuild `unimesh` as the common refinement of the bound trees.
  ///
  /// `unimesh` is cleared and seeded with the first tree's base elements.
  /// A base element no tree uses is marked unused and gets no leaves.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "union::construct_union_mesh"))]
  pub fn construct_union_mesh(&self, unimesh: &mut Mesh) -> Result<UnionMap, TraverseError> {
    let meshes = self.meshes();
    unimesh.copy_base(meshes[0]);
    let mut map = UnionMap::new(meshes.len());
    let mut stats = TraversalStats::default();

    for base in 0..self.num_base_elements() {
      let mut slots = Slots::with_capacity(meshes.len());
      let mut kind: Option<ElementKind> = None;
      for mesh in meshes {
        let element = mesh.base_element(base);
        if element.used {
          kind.get_or_insert(element.kind);
          slots.push(Slot::at(element.id));
        } else {
          slots.push(Slot::EMPTY);
        }
      }

      let uni = ElementId::from_index(base);
      let Some(kind) = kind else {
        unimesh.set_used(uni, false)?;
        continue;
      };
      unimesh.set_used(uni, true)?;
      self.union_recurrent(unimesh, &mut map, uni, &slots, kind, &mut stats)?;
    }

    map.stats = stats;

    #[cfg(feature = "tracing")]
    tracing::debug!(
      leaves = map.len(),
      elements = unimesh.num_elements(),
      reconciled = stats.reconciled,
      "union mesh constructed"
    );

    Ok(map)
  }

  fn union_recurrent(
    &self,
    unimesh: &mut Mesh,
    map: &mut UnionMap,
    uni: ElementId,
    slots: &[Slot],
    kind: ElementKind,
    stats: &mut TraversalStats,
  ) -> Result<(), TraverseError> {
    if is_leaf_frame(self.meshes(), slots) {
      stats.leaf_frames += 1;
      map.insert(uni, slots);
      return Ok(());
    }

    let expansion = expand(self.meshes(), slots, kind, [true; 4], stats)?;
    if expansion.split == SplitKind::None {
      // passthrough: the trees realign without refining the union element
      for child in &expansion.children {
        self.union_recurrent(unimesh, map, uni, &child.slots, kind, stats)?;
      }
      return Ok(());
    }

    unimesh.refine(uni, expansion.split)?;
    let sons = unimesh.element(uni).sons.clone();
    for (index, (child, son)) in expansion.children.iter().zip(sons).enumerate() {
      debug_assert_eq!(child.selector, expansion.split.son_selector(index));
      self.union_recurrent(unimesh, map, son, &child.slots, kind, stats)?;
    }
    Ok(())
  }
}

#[cfg(test)]
#[path = "union_test.rs"]
mod union_test;
