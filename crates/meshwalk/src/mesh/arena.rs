//! Mesh - arena storage for a refinement forest.
//!
//! Base elements are added first and occupy the lowest ids; refinement
//! appends sons to the end of the arena, so an `ElementId` stays valid for
//! the lifetime of the mesh.

use glam::DVec2;
use smallvec::SmallVec;
use thiserror::Error;

use super::{Element, ElementId, ElementKind, MeshTree, SplitKind};
use crate::rect::ParamRect;

/// Errors from building or refining a [`Mesh`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
  /// The handle does not name an element of this mesh.
  #[error("element {0:?} does not exist")]
  UnknownElement(ElementId),

  /// Only leaves can be refined.
  #[error("element {0:?} is already refined")]
  AlreadyRefined(ElementId),

  /// Triangles only refine isotropically.
  #[error("triangle {0:?} cannot be refined with {1:?}")]
  AnisotropicTriangle(ElementId, SplitKind),

  /// Refinement needs an actual split.
  #[error("element {0:?} cannot be refined with SplitKind::None")]
  EmptySplit(ElementId),

  /// Base elements must precede every refinement.
  #[error("base elements must be added before any refinement")]
  BaseAfterRefinement,

  /// A non-leaf element is missing the son a split implies.
  #[error("element {0:?} has no son {1}")]
  MissingSon(ElementId, usize),
}

/// Arena-backed refinement forest.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
  elements: Vec<Element>,
  num_base: usize,
}

impl Mesh {
  /// Create an empty mesh.
  pub fn new() -> Self {
    Self::default()
  }

  /// Single unit-square quad with every edge on the boundary.
  pub fn unit_square() -> Self {
    Self::quad_grid(1, 1, 1.0)
  }

  /// `nx * ny` axis-aligned square base elements of side `size`.
  ///
  /// Elements are numbered row by row from the bottom-left; only edges on
  /// the outer rim carry boundary flags.
  pub fn quad_grid(nx: usize, ny: usize, size: f64) -> Self {
    let mut mesh = Self::new();
    for j in 0..ny {
      for i in 0..nx {
        let x0 = i as f64 * size;
        let y0 = j as f64 * size;
        let vertices = [
          DVec2::new(x0, y0),
          DVec2::new(x0 + size, y0),
          DVec2::new(x0 + size, y0 + size),
          DVec2::new(x0, y0 + size),
        ];
        let boundary = [j == 0, i + 1 == nx, j + 1 == ny, i == 0];
        mesh.push_base(ElementKind::Quad, SmallVec::from_slice(&vertices), boundary);
      }
    }
    mesh
  }

  /// Append a quad base element.
  pub fn add_quad(
    &mut self,
    vertices: [DVec2; 4],
    boundary: [bool; 4],
  ) -> Result<ElementId, MeshError> {
    self.add_base(ElementKind::Quad, SmallVec::from_slice(&vertices), boundary)
  }

  /// Append a triangle base element.
  pub fn add_triangle(
    &mut self,
    vertices: [DVec2; 3],
    boundary: [bool; 3],
  ) -> Result<ElementId, MeshError> {
    let [b0, b1, b2] = boundary;
    self.add_base(
      ElementKind::Triangle,
      SmallVec::from_slice(&vertices),
      [b0, b1, b2, false],
    )
  }

  fn add_base(
    &mut self,
    kind: ElementKind,
    vertices: SmallVec<[DVec2; 4]>,
    boundary: [bool; 4],
  ) -> Result<ElementId, MeshError> {
    if self.elements.len() != self.num_base {
      return Err(MeshError::BaseAfterRefinement);
    }
    Ok(self.push_base(kind, vertices, boundary))
  }

  /// Append a used, unrefined base element; the arena must hold base
  /// elements only.
  fn push_base(
    &mut self,
    kind: ElementKind,
    vertices: SmallVec<[DVec2; 4]>,
    boundary: [bool; 4],
  ) -> ElementId {
    debug_assert_eq!(self.elements.len(), self.num_base);
    let id = ElementId::from_index(self.elements.len());
    self.elements.push(Element {
      id,
      kind,
      active: true,
      used: true,
      split: SplitKind::None,
      sons: SmallVec::new(),
      boundary,
      vertices,
      parent: None,
    });
    self.num_base += 1;
    id
  }

  /// Element behind a handle, if it exists.
  pub fn get(&self, id: ElementId) -> Option<&Element> {
    self.elements.get(id.index())
  }

  /// Mark an element as participating (or not) in computations.
  pub fn set_used(&mut self, id: ElementId, used: bool) -> Result<(), MeshError> {
    let element = self
      .elements
      .get_mut(id.index())
      .ok_or(MeshError::UnknownElement(id))?;
    element.used = used;
    Ok(())
  }

  /// Refine leaf `id` into the sons `split` describes.
  ///
  /// Triangles accept only [`SplitKind::Both`]. Son boundary flags are
  /// inherited on edges that lie on the parent's edges and cleared on
  /// interior edges.
  pub fn refine(&mut self, id: ElementId, split: SplitKind) -> Result<(), MeshError> {
    let parent = self.get(id).ok_or(MeshError::UnknownElement(id))?;
    if !parent.active {
      return Err(MeshError::AlreadyRefined(id));
    }
    if split == SplitKind::None {
      return Err(MeshError::EmptySplit(id));
    }
    if parent.is_triangle() && split != SplitKind::Both {
      return Err(MeshError::AnisotropicTriangle(id, split));
    }

    let sons = match parent.kind {
      ElementKind::Triangle => triangle_sons(&parent.vertices, &parent.boundary),
      ElementKind::Quad => quad_sons(&parent.vertices, &parent.boundary, split),
    };
    let kind = parent.kind;

    let mut son_ids = SmallVec::new();
    for (vertices, boundary) in sons {
      let son_id = ElementId::from_index(self.elements.len());
      self.elements.push(Element {
        id: son_id,
        kind,
        active: true,
        used: true,
        split: SplitKind::None,
        sons: SmallVec::new(),
        boundary,
        vertices,
        parent: Some(id),
      });
      son_ids.push(son_id);
    }

    let parent = &mut self.elements[id.index()];
    parent.active = false;
    parent.split = split;
    parent.sons = son_ids;
    Ok(())
  }

  /// Refine every used leaf once; triangles always split isotropically.
  pub fn refine_all(&mut self, split: SplitKind) -> Result<(), MeshError> {
    let targets: Vec<(ElementId, ElementKind)> = self.leaves().map(|e| (e.id, e.kind)).collect();
    for (id, kind) in targets {
      let split = match kind {
        ElementKind::Triangle => SplitKind::Both,
        ElementKind::Quad => split,
      };
      self.refine(id, split)?;
    }
    Ok(())
  }

  /// Replace this mesh with unrefined copies of `other`'s base elements.
  pub fn copy_base<M: MeshTree + ?Sized>(&mut self, other: &M) {
    self.clear();
    for index in 0..other.num_base_elements() {
      let base = other.base_element(index);
      let id = self.push_base(base.kind, base.vertices.clone(), base.boundary);
      self.elements[id.index()].used = base.used;
    }
  }

  /// Remove every element.
  pub fn clear(&mut self) {
    self.elements.clear();
    self.num_base = 0;
  }

  /// Used leaves, in arena order.
  pub fn leaves(&self) -> impl Iterator<Item = &Element> + '_ {
    self
      .elements
      .iter()
      .filter(move |e| e.active && self.base_of(e.id).used)
  }

  /// Base element an element descends from.
  pub fn base_of(&self, id: ElementId) -> &Element {
    let mut element = &self.elements[id.index()];
    while let Some(parent) = element.parent {
      element = &self.elements[parent.index()];
    }
    element
  }

  /// Window of a quad inside its base element, `None` for triangles.
  pub fn param_window(&self, id: ElementId) -> Option<ParamRect> {
    let mut element = self.get(id)?;
    if element.is_triangle() {
      return None;
    }

    let mut path: SmallVec<[u8; 16]> = SmallVec::new();
    while let Some(parent_id) = element.parent {
      let parent = &self.elements[parent_id.index()];
      let index = parent.sons.iter().position(|&s| s == element.id)?;
      path.push(parent.split.son_selector(index)?);
      element = parent;
    }

    Some(
      path
        .iter()
        .rev()
        .fold(ParamRect::UNIT, |rect, &selector| rect.child(selector)),
    )
  }

  /// Total number of elements, refined ones included.
  pub fn num_elements(&self) -> usize {
    self.elements.len()
  }

  /// Number of used leaves.
  pub fn num_active(&self) -> usize {
    self.leaves().count()
  }
}

impl MeshTree for Mesh {
  fn num_base_elements(&self) -> usize {
    self.num_base
  }

  fn element(&self, id: ElementId) -> &Element {
    &self.elements[id.index()]
  }
}

type SonGeometry = (SmallVec<[DVec2; 4]>, [bool; 4]);

fn mid(a: DVec2, b: DVec2) -> DVec2 {
  (a + b) * 0.5
}

fn quad_sons(v: &[DVec2], bnd: &[bool; 4], split: SplitKind) -> SmallVec<[SonGeometry; 4]> {
  let m01 = mid(v[0], v[1]);
  let m12 = mid(v[1], v[2]);
  let m23 = mid(v[2], v[3]);
  let m30 = mid(v[3], v[0]);
  let c = (v[0] + v[1] + v[2] + v[3]) * 0.25;

  let son = |vs: [DVec2; 4], b: [bool; 4]| -> SonGeometry { (SmallVec::from_slice(&vs), b) };

  let mut out = SmallVec::new();
  match split {
    SplitKind::Both => {
      out.push(son([v[0], m01, c, m30], [bnd[0], false, false, bnd[3]]));
      out.push(son([m01, v[1], m12, c], [bnd[0], bnd[1], false, false]));
      out.push(son([c, m12, v[2], m23], [false, bnd[1], bnd[2], false]));
      out.push(son([m30, c, m23, v[3]], [false, false, bnd[2], bnd[3]]));
    }
    SplitKind::Horizontal => {
      out.push(son([v[0], m01, m23, v[3]], [bnd[0], false, bnd[2], bnd[3]]));
      out.push(son([m01, v[1], v[2], m23], [bnd[0], bnd[1], bnd[2], false]));
    }
    SplitKind::Vertical => {
      out.push(son([v[0], v[1], m12, m30], [bnd[0], bnd[1], false, bnd[3]]));
      out.push(son([m30, m12, v[2], v[3]], [false, bnd[1], bnd[2], bnd[3]]));
    }
    SplitKind::None => {}
  }
  out
}

fn triangle_sons(v: &[DVec2], bnd: &[bool; 4]) -> SmallVec<[SonGeometry; 4]> {
  let m01 = mid(v[0], v[1]);
  let m12 = mid(v[1], v[2]);
  let m20 = mid(v[2], v[0]);

  let son = |vs: [DVec2; 3], b: [bool; 3]| -> SonGeometry {
    (SmallVec::from_slice(&vs), [b[0], b[1], b[2], false])
  };

  let mut out = SmallVec::new();
  out.push(son([v[0], m01, m20], [bnd[0], false, bnd[2]]));
  out.push(son([m01, v[1], m12], [bnd[0], bnd[1], false]));
  out.push(son([m20, m12, v[2]], [false, bnd[1], bnd[2]]));
  out.push(son([m01, m12, m20], [false, false, false]));
  out
}

#[cfg(test)]
#[path = "arena_test.rs"]
mod arena_test;
