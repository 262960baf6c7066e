//! Test utilities: fixture meshes and seeded random refinement histories.

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mesh::{ElementId, ElementKind, Mesh, MeshTree, SplitKind};
use crate::rect::ParamRect;
use crate::traverse::State;

// =============================================================================
// Fixture Meshes
// =============================================================================

/// Unit square refined once at the root with `split`.
pub fn split_square(split: SplitKind) -> Mesh {
  let mut mesh = Mesh::unit_square();
  mesh.refine(ElementId::from_index(0), split).unwrap();
  mesh
}

/// Unit square cut along its diagonal into two triangles.
pub fn triangle_pair() -> Mesh {
  let mut mesh = Mesh::new();
  mesh
    .add_triangle(
      [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 1.0)],
      [true, true, false],
    )
    .unwrap();
  mesh
    .add_triangle(
      [DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0), DVec2::new(0.0, 1.0)],
      [false, true, true],
    )
    .unwrap();
  mesh
}

/// One quad next to one triangle.
pub fn quad_and_triangle() -> Mesh {
  let mut mesh = Mesh::new();
  mesh
    .add_quad(
      [
        DVec2::new(0.0, 0.0),
        DVec2::new(1.0, 0.0),
        DVec2::new(1.0, 1.0),
        DVec2::new(0.0, 1.0),
      ],
      [true, false, true, true],
    )
    .unwrap();
  mesh
    .add_triangle(
      [DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.5), DVec2::new(1.0, 1.0)],
      [true, true, false],
    )
    .unwrap();
  mesh
}

// =============================================================================
// Random Refinement
// =============================================================================

/// Refine `mesh` for `levels` rounds; each leaf splits with `probability`.
///
/// Quads pick a random split kind, triangles always split isotropically.
pub fn random_refine(mesh: &mut Mesh, seed: u64, levels: usize, probability: f64) {
  let mut rng = StdRng::seed_from_u64(seed);
  for _ in 0..levels {
    let leaves: Vec<(ElementId, ElementKind)> = mesh.leaves().map(|e| (e.id, e.kind)).collect();
    for (id, kind) in leaves {
      if !rng.random_bool(probability) {
        continue;
      }
      let split = match kind {
        ElementKind::Triangle => SplitKind::Both,
        ElementKind::Quad => match rng.random_range(0..3) {
          0 => SplitKind::Vertical,
          1 => SplitKind::Horizontal,
          _ => SplitKind::Both,
        },
      };
      mesh.refine(id, split).unwrap();
    }
  }
}

/// `count` independently refined copies of `base`.
pub fn random_family(base: &Mesh, count: usize, seed: u64, levels: usize) -> Vec<Mesh> {
  (0..count)
    .map(|i| {
      let mut mesh = Mesh::new();
      mesh.copy_base(base);
      random_refine(&mut mesh, seed.wrapping_mul(31).wrapping_add(i as u64), levels, 0.5);
      mesh
    })
    .collect()
}

// =============================================================================
// Frame Geometry
// =============================================================================

/// Region of the base element covered by tree `tree` at a quad frame.
pub fn frame_region(mesh: &Mesh, state: &State, tree: usize) -> Option<ParamRect> {
  let element = state.element(tree)?;
  Some(mesh.param_window(element)?.within(state.code(tree)))
}

/// Sum of used base element areas.
pub fn used_base_area(mesh: &Mesh) -> f64 {
  (0..mesh.num_base_elements())
    .map(|i| mesh.base_element(i))
    .filter(|e| e.used)
    .map(|e| e.area())
    .sum()
}
