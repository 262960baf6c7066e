use super::*;
use crate::code::{TransformCode, BOTTOM, LEFT, RIGHT, TOP};
use crate::mesh::{ElementId, Mesh, SplitKind};
use crate::rect::ParamRect;
use crate::test_utils::*;

fn collect_frames<M: MeshTree>(traverse: &Traverse<'_, M>) -> Vec<State> {
  let mut cursor = traverse.cursor();
  let mut frames = Vec::new();
  while let Some(state) = traverse.next_state(&mut cursor).unwrap() {
    frames.push(state.clone());
  }
  frames
}

fn son(mesh: &Mesh, parent: usize, index: usize) -> Option<ElementId> {
  mesh.element(ElementId::from_index(parent)).son(index)
}

// =========================================================================
// Batch 1: Compatibility Checks
// =========================================================================

/// Binding nothing is an error.
#[test]
fn test_begin_no_meshes() {
  let err = Traverse::<Mesh>::begin(&[]).unwrap_err();
  assert_eq!(err, TraverseError::NoMeshes);
}

/// Base element counts must match.
#[test]
fn test_begin_count_mismatch() {
  let a = Mesh::quad_grid(2, 1, 1.0);
  let b = Mesh::quad_grid(3, 1, 1.0);
  let err = Traverse::begin(&[&a, &b]).unwrap_err();
  assert_eq!(
    err,
    TraverseError::BaseCountMismatch {
      expected: 2,
      found: 3,
      mesh: 1
    }
  );
}

/// Base areas must agree within min_area / 100.
#[test]
fn test_begin_area_mismatch() {
  let a = Mesh::unit_square();
  let b = Mesh::quad_grid(1, 1, 1.1);
  let err = Traverse::begin(&[&a, &b]).unwrap_err();
  assert!(
    matches!(err, TraverseError::BaseAreaMismatch { base: 0, mesh: 1, .. }),
    "unexpected error {err:?}"
  );

  // a difference below the tolerance is accepted
  let c = Mesh::quad_grid(1, 1, 1.001);
  assert!(Traverse::begin(&[&a, &c]).is_ok());
}

/// Base kinds must agree.
#[test]
fn test_begin_kind_mismatch() {
  let a = Mesh::quad_grid(2, 1, 1.0);
  let b = quad_and_triangle();
  let err = Traverse::begin(&[&a, &b]).unwrap_err();
  assert_eq!(err, TraverseError::BaseKindMismatch { base: 1, mesh: 1 });
}

/// Disabled checks bind anything with matching counts.
#[test]
fn test_begin_unchecked() {
  let a = Mesh::unit_square();
  let b = Mesh::quad_grid(1, 1, 3.0);
  let config = TraverseConfig::DEFAULT.with_compatibility_check(false);
  let traverse = Traverse::begin_with(&[&a, &b], config).unwrap();
  assert_eq!(traverse.count_states().unwrap(), 1);
}

/// Unused base elements are not compared.
#[test]
fn test_begin_skips_unused() {
  let a = Mesh::quad_grid(2, 1, 1.0);
  let mut b = quad_and_triangle();
  b.set_used(ElementId::from_index(1), false).unwrap();
  assert!(Traverse::begin(&[&a, &b]).is_ok());
}

// =========================================================================
// Batch 2: Identical Trees
// =========================================================================

/// Identical trees yield one frame per leaf, empty codes and the leaves'
/// own boundary flags.
#[test]
fn test_identical_trees() {
  for seed in 0..8 {
    let mut mesh = Mesh::quad_grid(2, 2, 1.0);
    random_refine(&mut mesh, seed, 4, 0.6);
    let copies = [mesh.clone(), mesh.clone(), mesh.clone()];
    let traverse = Traverse::begin(&[&copies[0], &copies[1], &copies[2]]).unwrap();

    let frames = collect_frames(&traverse);
    assert_eq!(frames.len(), mesh.num_active(), "seed {seed}");

    for frame in &frames {
      let id = frame.element(0).unwrap();
      let element = mesh.element(id);
      assert!(element.is_leaf());
      for tree in 0..3 {
        assert_eq!(frame.element(tree), Some(id));
        assert_eq!(frame.code(tree), TransformCode::ROOT);
      }
      assert_eq!(frame.boundary(), element.boundary, "seed {seed} element {id:?}");
    }
  }
}

/// Identical triangle trees behave like identical quad trees.
#[test]
fn test_identical_triangle_trees() {
  let mut mesh = triangle_pair();
  random_refine(&mut mesh, 7, 3, 0.7);
  let copy = mesh.clone();
  let traverse = Traverse::begin(&[&mesh, &copy]).unwrap();

  let frames = collect_frames(&traverse);
  assert_eq!(frames.len(), mesh.num_active());
  for frame in &frames {
    assert!(frame.is_triangle());
    assert_eq!(frame.code(1), TransformCode::ROOT);
    let element = mesh.element(frame.element(0).unwrap());
    assert_eq!(frame.boundary(), element.boundary);
    assert!(!frame.boundary()[3]);
  }
}

// =========================================================================
// Batch 3: Scenarios
// =========================================================================

/// Isotropic quadrants against an unsplit element: the unsplit tree
/// tracks each quadrant in its code.
#[test]
fn test_isotropic_vs_unsplit() {
  let split = split_square(SplitKind::Both);
  let leaf = Mesh::unit_square();
  let traverse = Traverse::begin(&[&split, &leaf]).unwrap();

  let frames = collect_frames(&traverse);
  assert_eq!(frames.len(), 4);
  for (q, frame) in frames.iter().enumerate() {
    assert_eq!(frame.element(0), son(&split, 0, q));
    assert_eq!(frame.code(0), TransformCode::ROOT);
    assert_eq!(frame.element(1), Some(ElementId::from_index(0)));
    assert_eq!(frame.code(1).raw(), q as u64 + 1);
  }
}

/// Horizontal against vertical: four quadrant frames, each tree reconciled
/// once per frame.
#[test]
fn test_horizontal_vs_vertical() {
  let v = split_square(SplitKind::Vertical);
  let h = split_square(SplitKind::Horizontal);
  let traverse = Traverse::begin(&[&v, &h]).unwrap();

  let mut cursor = traverse.cursor();
  let mut frames = Vec::new();
  while let Some(state) = traverse.next_state(&mut cursor).unwrap() {
    frames.push(state.clone());
  }
  assert_eq!(frames.len(), 4);
  assert_eq!(cursor.stats().reconciled, 8);
  assert_eq!(cursor.stats().fallbacks, 0);

  let expected_v = [(0, LEFT), (0, RIGHT), (1, RIGHT), (1, LEFT)];
  let expected_h = [(0, BOTTOM), (1, BOTTOM), (1, TOP), (0, TOP)];
  for (q, frame) in frames.iter().enumerate() {
    let (v_son, v_step) = expected_v[q];
    let (h_son, h_step) = expected_h[q];
    assert_eq!(frame.element(0), son(&v, 0, v_son), "frame {q}");
    assert_eq!(frame.code(0), TransformCode::ROOT.append(v_step), "frame {q}");
    assert_eq!(frame.element(1), son(&h, 0, h_son), "frame {q}");
    assert_eq!(frame.code(1), TransformCode::ROOT.append(h_step), "frame {q}");
  }
}

/// Matching half splits need no reconciling and yield two frames.
#[test]
fn test_matching_halves() {
  let a = split_square(SplitKind::Horizontal);
  let b = split_square(SplitKind::Horizontal);
  let traverse = Traverse::begin(&[&a, &b]).unwrap();
  let mut cursor = traverse.cursor();
  assert_eq!(traverse.count_remaining(&mut cursor).unwrap(), 2);
  assert_eq!(cursor.stats().reconciled, 0);
}

/// Split kind 1 lays its sons side by side: an unsplit partner gets the
/// LEFT and RIGHT codes, kind 2 gives BOTTOM and TOP.
#[test]
fn test_half_split_encoding() {
  let leaf = Mesh::unit_square();
  let leaf_codes = |split: SplitKind| {
    let mesh = split_square(split);
    let traverse = Traverse::begin(&[&mesh, &leaf]).unwrap();
    let mut cursor = traverse.cursor();
    let mut codes = Vec::new();
    while let Some(state) = traverse.next_state(&mut cursor).unwrap() {
      codes.push(state.code(1).raw());
    }
    codes
  };

  assert_eq!(SplitKind::Horizontal.bits(), 1);
  assert_eq!(leaf_codes(SplitKind::Horizontal), vec![7, 8]);
  assert_eq!(leaf_codes(SplitKind::Vertical), vec![BOTTOM as u64 + 1, TOP as u64 + 1]);
}

// =========================================================================
// Batch 4: Counting
// =========================================================================

/// Counting, stepping and parallel counting agree.
#[test]
fn test_count_matches_step() {
  for seed in 0..6 {
    let base = Mesh::quad_grid(3, 2, 1.0);
    let family = random_family(&base, 3, seed, 4);
    let refs: Vec<&Mesh> = family.iter().collect();
    let traverse = Traverse::begin(&refs).unwrap();

    let stepped = collect_frames(&traverse).len();
    let counted = traverse.count_states().unwrap();
    let (parallel, stats) = traverse.par_count_states().unwrap();

    assert_eq!(stepped, counted, "seed {seed}");
    assert_eq!(parallel, counted, "seed {seed}");
    assert_eq!(stats.leaf_frames, counted, "seed {seed}");
  }
}

/// Every tree's leaves are all covered, so there are at least as many
/// frames as the finest tree has leaves.
#[test]
fn test_count_lower_bound() {
  let base = Mesh::quad_grid(2, 2, 1.0);
  let family = random_family(&base, 2, 11, 4);
  let traverse = Traverse::begin(&[&family[0], &family[1]]).unwrap();
  let count = traverse.count_states().unwrap();
  assert!(count >= family[0].num_active());
  assert!(count >= family[1].num_active());
}

/// A reset cursor walks the same frames again.
#[test]
fn test_cursor_reset() {
  let base = Mesh::quad_grid(2, 1, 1.0);
  let family = random_family(&base, 2, 3, 3);
  let traverse = Traverse::begin(&[&family[0], &family[1]]).unwrap();

  let mut cursor = traverse.cursor();
  let first = traverse.count_remaining(&mut cursor).unwrap();
  assert!(cursor.is_finished());
  assert!(traverse.next_state(&mut cursor).unwrap().is_none());

  cursor.reset();
  assert_eq!(traverse.count_remaining(&mut cursor).unwrap(), first);

  cursor.finish();
  assert!(cursor.is_finished());
  assert_eq!(traverse.count_remaining(&mut cursor).unwrap(), 0);
}

/// A ranged cursor only visits its base elements.
#[test]
fn test_cursor_range() {
  let mut grid = Mesh::quad_grid(2, 1, 1.0);
  grid.refine_all(SplitKind::Vertical).unwrap();
  let copy = grid.clone();
  let traverse = Traverse::begin(&[&grid, &copy]).unwrap();

  let mut cursor = traverse.cursor_range(1..10);
  assert_eq!(cursor.range(), 1..2);
  let mut count = 0;
  while let Some(state) = traverse.next_state(&mut cursor).unwrap() {
    assert_eq!(state.base(), 1);
    count += 1;
  }
  assert_eq!(count, 2);
}

// =========================================================================
// Batch 5: Frame Geometry
// =========================================================================

/// All trees agree on each frame's region, and the regions tile every base
/// element.
#[test]
fn test_frames_agree_and_tile() {
  for seed in 0..6 {
    let base = Mesh::quad_grid(2, 2, 1.0);
    let family = random_family(&base, 3, seed + 100, 4);
    let refs: Vec<&Mesh> = family.iter().collect();
    let traverse = Traverse::begin(&refs).unwrap();

    let mut covered = [0.0f64; 4];
    for frame in collect_frames(&traverse) {
      let region = frame_region(&family[0], &frame, 0).unwrap();
      for tree in 1..3 {
        assert_eq!(
          frame_region(&family[tree], &frame, tree),
          Some(region),
          "seed {seed} tree {tree}"
        );
      }
      covered[frame.base()] += region.area_fraction();
    }

    for (base, area) in covered.iter().enumerate() {
      assert!((area - 1.0).abs() < 1e-12, "seed {seed} base {base} covered {area}");
    }
  }
}

/// Leaf-frame boundary flags mark exactly the frame edges on the domain
/// boundary.
#[test]
fn test_boundary_flags() {
  let base = Mesh::quad_grid(2, 2, 1.0);
  let family = random_family(&base, 2, 42, 4);
  let traverse = Traverse::begin(&[&family[0], &family[1]]).unwrap();

  for frame in collect_frames(&traverse) {
    let region = frame_region(&family[0], &frame, 0).unwrap();
    let base_flags = base.base_element(frame.base()).boundary;
    let unit = ParamRect::UNIT;
    let touches = [
      region.b == unit.b,
      region.r == unit.r,
      region.t == unit.t,
      region.l == unit.l,
    ];
    let expected: [bool; 4] = std::array::from_fn(|e| touches[e] && base_flags[e]);
    assert_eq!(frame.boundary(), expected, "region {region:?}");
  }
}

/// A coarse triangle tree follows the refined one with growing codes.
#[test]
fn test_triangle_codes_accumulate() {
  let mut fine = triangle_pair();
  random_refine(&mut fine, 5, 3, 0.8);
  let coarse = triangle_pair();
  let traverse = Traverse::begin(&[&fine, &coarse]).unwrap();

  let frames = collect_frames(&traverse);
  assert_eq!(frames.len(), fine.num_active());
  for frame in &frames {
    let fine_leaf = frame.element(0).unwrap();
    let mut depth = 0;
    let mut element = fine.element(fine_leaf);
    while let Some(parent) = element.parent {
      depth += 1;
      element = fine.element(parent);
    }
    assert_eq!(frame.element(1), Some(ElementId::from_index(frame.base())));
    assert_eq!(frame.code(1).depth(), depth);
  }
}

// =========================================================================
// Batch 6: Participation
// =========================================================================

/// Trees that do not use a base element leave empty slots there.
#[test]
fn test_partial_participation() {
  let mut a = Mesh::quad_grid(2, 1, 1.0);
  a.set_used(ElementId::from_index(1), false).unwrap();
  let b = Mesh::quad_grid(2, 1, 1.0);
  let traverse = Traverse::begin(&[&a, &b]).unwrap();

  let frames = collect_frames(&traverse);
  assert_eq!(frames.len(), 2);
  assert_eq!(frames[1].element(0), None);
  assert_eq!(frames[1].element(1), Some(ElementId::from_index(1)));
  assert_eq!(frames[1].rep(), 1);
}

/// Base elements no tree uses produce no frames.
#[test]
fn test_unused_everywhere() {
  let mut a = Mesh::quad_grid(3, 1, 1.0);
  let mut b = Mesh::quad_grid(3, 1, 1.0);
  a.set_used(ElementId::from_index(1), false).unwrap();
  b.set_used(ElementId::from_index(1), false).unwrap();
  let traverse = Traverse::begin(&[&a, &b]).unwrap();

  let bases: Vec<usize> = collect_frames(&traverse).iter().map(State::base).collect();
  assert_eq!(bases, vec![0, 2]);
}

// =========================================================================
// Batch 7: Bindings and Limits
// =========================================================================

/// The bound stepping variant mirrors every frame into the bindings.
#[test]
fn test_next_state_bound() {
  let v = split_square(SplitKind::Vertical);
  let leaf = Mesh::unit_square();
  let traverse = Traverse::begin(&[&v, &leaf]).unwrap();

  let mut bindings = [ActiveElement::default(); 2];
  let mut cursor = traverse.cursor();
  let mut count = 0;
  while let Some(state) = traverse.next_state_bound(&mut cursor, &mut bindings).unwrap() {
    for (tree, binding) in bindings.iter().enumerate() {
      assert_eq!(binding.element, state.element(tree));
      assert_eq!(binding.code, state.code(tree));
    }
    count += 1;
  }
  assert_eq!(count, 2);
}

/// Exceeding the stack capacity is an error, not a reallocation.
#[test]
fn test_stack_overflow() {
  let mut mesh = Mesh::unit_square();
  mesh.refine_all(SplitKind::Both).unwrap();
  mesh.refine_all(SplitKind::Both).unwrap();

  let config = TraverseConfig::DEFAULT.with_stack_capacity(2);
  let traverse = Traverse::begin_with(&[&mesh], config).unwrap();
  assert_eq!(
    traverse.count_states(),
    Err(TraverseError::StackOverflow { capacity: 2 })
  );

  let roomy = Traverse::begin(&[&mesh]).unwrap();
  let mut cursor = roomy.cursor();
  assert_eq!(roomy.count_remaining(&mut cursor).unwrap(), 16);
  // root, its four children, and the four children of the first child
  assert_eq!(cursor.stats().peak_stack, 9);
}

/// An overflow in the middle of an expansion stops the cursor for good;
/// only a reset lets it walk again.
#[test]
fn test_stack_overflow_is_sticky() {
  let mesh = split_square(SplitKind::Both);
  let config = TraverseConfig::DEFAULT.with_stack_capacity(3);
  let traverse = Traverse::begin_with(&[&mesh], config).unwrap();
  let overflow = TraverseError::StackOverflow { capacity: 3 };

  let mut cursor = traverse.cursor();
  assert_eq!(traverse.count_remaining(&mut cursor), Err(overflow.clone()));
  assert_eq!(cursor.error(), Some(&overflow));
  assert!(!cursor.is_finished());
  assert_eq!(cursor.depth(), 0);

  assert_eq!(traverse.count_remaining(&mut cursor), Err(overflow.clone()));
  assert!(matches!(traverse.next_state(&mut cursor), Err(TraverseError::StackOverflow { .. })));

  cursor.reset();
  assert_eq!(cursor.error(), None);
  assert_eq!(traverse.count_remaining(&mut cursor), Err(overflow));

  let roomy = Traverse::begin_with(&[&mesh], config.with_stack_capacity(5)).unwrap();
  let mut cursor = roomy.cursor();
  assert_eq!(roomy.count_remaining(&mut cursor).unwrap(), 4);
  assert!(cursor.is_finished());
}
