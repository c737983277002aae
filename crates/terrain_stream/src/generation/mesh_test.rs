//! Tests for triangulation: vertex layout per LOD, extents, normals, shading.

use glam::Vec3;

use super::{edge_samples, mesh_stride, triangulate};
use crate::error::GenerationError;
use crate::generation::HeightCurve;
use crate::types::HeightField;

/// Bordered field for a `samples`-wide chunk, filled by `f(field_x, field_z)`.
fn field(samples: usize, f: impl Fn(usize, usize) -> f32) -> HeightField {
  let side = samples + 2;
  let mut heights = HeightField::filled(side, 0.0);
  for z in 0..side {
    for x in 0..side {
      heights.set(x, z, f(x, z));
    }
  }
  heights
}

#[test]
fn test_mesh_stride() {
  assert_eq!(mesh_stride(0), 1);
  assert_eq!(mesh_stride(1), 2);
  assert_eq!(mesh_stride(2), 4);
  assert_eq!(mesh_stride(6), 12);
}

#[test]
fn test_edge_always_includes_last_sample() {
  assert_eq!(edge_samples(16, 1).len(), 16);
  assert_eq!(edge_samples(16, 4), vec![0, 4, 8, 12, 15]);
  assert_eq!(edge_samples(17, 4), vec![0, 4, 8, 12, 16]);
}

#[test]
fn test_full_detail_vertex_and_triangle_counts() {
  let mesh = triangulate(&field(16, |_, _| 0.5), 1.0, &HeightCurve::linear(), 0, false).unwrap();

  assert_eq!(mesh.vertex_count(), 16 * 16);
  assert_eq!(mesh.triangle_count(), 2 * 15 * 15);
  assert_eq!(mesh.normals.len(), mesh.vertex_count());
  assert_eq!(mesh.uvs.len(), mesh.vertex_count());
  assert_eq!(mesh.lod, 0);
  assert!(!mesh.flat_shaded);
}

#[test]
fn test_coarser_lod_has_fewer_vertices() {
  let heights = field(16, |_, _| 0.5);
  let lod1 = triangulate(&heights, 1.0, &HeightCurve::linear(), 1, false).unwrap();
  let lod2 = triangulate(&heights, 1.0, &HeightCurve::linear(), 2, false).unwrap();

  // stride 2: 0,2,..,14 plus 15; stride 4: 0,4,8,12 plus 15
  assert_eq!(lod1.vertex_count(), 9 * 9);
  assert_eq!(lod2.vertex_count(), 5 * 5);
  assert_eq!(lod2.triangle_count(), 2 * 4 * 4);
}

#[test]
fn test_mesh_spans_exactly_one_tile() {
  for lod in [0, 1, 2] {
    let mesh = triangulate(&field(16, |_, _| 0.0), 1.0, &HeightCurve::linear(), lod, false).unwrap();

    assert!((mesh.bounds.min[0] + 8.0).abs() < 1e-4, "lod {lod}: {:?}", mesh.bounds);
    assert!((mesh.bounds.max[0] - 8.0).abs() < 1e-4, "lod {lod}: {:?}", mesh.bounds);
    assert!((mesh.bounds.min[2] + 8.0).abs() < 1e-4, "lod {lod}: {:?}", mesh.bounds);
    assert!((mesh.bounds.max[2] - 8.0).abs() < 1e-4, "lod {lod}: {:?}", mesh.bounds);
  }
}

#[test]
fn test_height_multiplier_and_curve() {
  let heights = field(8, |_, _| 0.5);

  let linear = triangulate(&heights, 10.0, &HeightCurve::linear(), 0, false).unwrap();
  assert!(linear.positions.iter().all(|p| (p[1] - 5.0).abs() < 1e-5));

  let flattened = HeightCurve::new(vec![[0.0, 0.0], [0.6, 0.0], [1.0, 1.0]]);
  let curved = triangulate(&heights, 10.0, &flattened, 0, false).unwrap();
  assert!(curved.positions.iter().all(|p| p[1] == 0.0));
}

#[test]
fn test_flat_field_normals_point_up() {
  let mesh = triangulate(&field(8, |_, _| 0.3), 20.0, &HeightCurve::linear(), 0, false).unwrap();
  for n in &mesh.normals {
    assert!((Vec3::from(*n) - Vec3::Y).length() < 1e-6, "{n:?}");
  }
}

#[test]
fn test_slope_tilts_smooth_normals() {
  // Height rises with x, so normals lean towards -x. The border column
  // participates, so the edge normal matches the interior.
  let mesh = triangulate(&field(8, |x, _| x as f32 * 0.05), 10.0, &HeightCurve::linear(), 0, false).unwrap();

  let first = Vec3::from(mesh.normals[0]);
  for n in &mesh.normals {
    let n = Vec3::from(*n);
    assert!(n.x < 0.0 && n.y > 0.0, "{n:?}");
    assert!((n - first).length() < 1e-5);
  }
}

#[test]
fn test_triangles_face_up() {
  let mesh = triangulate(
    &field(12, |x, z| ((x * 7 + z * 3) % 5) as f32 * 0.2),
    5.0,
    &HeightCurve::linear(),
    0,
    false,
  )
  .unwrap();

  for tri in mesh.indices.chunks_exact(3) {
    let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.positions[i as usize]));
    assert!((b - a).cross(c - a).y > 0.0);
  }
}

#[test]
fn test_flat_shading_duplicates_vertices() {
  let mesh = triangulate(&field(8, |x, z| (x + z) as f32 * 0.05), 4.0, &HeightCurve::linear(), 0, true).unwrap();

  assert!(mesh.flat_shaded);
  assert_eq!(mesh.triangle_count(), 2 * 7 * 7);
  assert_eq!(mesh.vertex_count(), mesh.indices.len());
  assert!(mesh.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i));

  // All three corners of a triangle share its face normal.
  for tri in mesh.normals.chunks_exact(3) {
    assert_eq!(tri[0], tri[1]);
    assert_eq!(tri[1], tri[2]);
    assert!(tri[0][1] > 0.0);
  }
}

#[test]
fn test_rejects_lod_coarser_than_chunk() {
  let heights = field(16, |_, _| 0.0);
  let result = triangulate(&heights, 1.0, &HeightCurve::linear(), 8, false);
  assert_eq!(result.unwrap_err(), GenerationError::LodTooCoarse { lod: 8, samples: 16 });
}

#[test]
fn test_rejects_tiny_field() {
  let heights = HeightField::filled(3, 0.0);
  let result = triangulate(&heights, 1.0, &HeightCurve::linear(), 0, false);
  assert!(matches!(result, Err(GenerationError::InvalidParameters(_))));
}
