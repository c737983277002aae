//! Height field triangulation.
//!
//! The bordered field is `(n + 2)²`; only the `n²` interior samples become
//! vertices. The border exists so normals at the tile edge see the same
//! neighbours as the adjacent tile, which keeps lighting seamless.
//!
//! Vertex positions are local to the tile center. The interior spans exactly
//! `n` world units, so sample spacing is `n / (n - 1)`.

use glam::Vec3;

use super::curve::HeightCurve;
use crate::error::GenerationError;
use crate::types::{HeightField, Mesh, MinMaxAABB};

/// Vertex skip factor for a LOD value: every sample at LOD 0, otherwise
/// every `2 * lod`th.
#[inline]
pub fn mesh_stride(lod: u32) -> usize {
  if lod == 0 {
    1
  } else {
    lod as usize * 2
  }
}

/// Interior sample indices kept along one edge. The last sample is always
/// present so the mesh covers the whole tile at every LOD.
fn edge_samples(samples: usize, stride: usize) -> Vec<usize> {
  let mut edge: Vec<usize> = (0..samples).step_by(stride).collect();
  if edge.last() != Some(&(samples - 1)) {
    edge.push(samples - 1);
  }
  edge
}

/// Build a mesh from a bordered height field.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generation::triangulate"))]
pub fn triangulate(
  heights: &HeightField,
  height_multiplier: f32,
  height_curve: &HeightCurve,
  lod: u32,
  flat_shading: bool,
) -> Result<Mesh, GenerationError> {
  let side = heights.side();
  if side < 4 {
    return Err(GenerationError::InvalidParameters(format!(
      "height field side {side} leaves fewer than two interior samples"
    )));
  }

  let samples = side - 2;
  let stride = mesh_stride(lod);
  if stride >= samples {
    return Err(GenerationError::LodTooCoarse { lod, samples });
  }

  let spacing = samples as f32 / (samples - 1) as f32;
  let half = (samples - 1) as f32 * 0.5;
  let uv_scale = 1.0 / (samples - 1) as f32;
  let edge = edge_samples(samples, stride);
  let n = edge.len();

  // Curve-scaled height at field (border-inclusive) coordinates.
  let height_at = |fx: usize, fz: usize| height_curve.evaluate(*heights.get(fx, fz)) * height_multiplier;

  let mut grid_positions = Vec::with_capacity(n * n);
  let mut grid_normals = Vec::with_capacity(n * n);
  let mut grid_uvs = Vec::with_capacity(n * n);

  for &iz in &edge {
    for &ix in &edge {
      let (fx, fz) = (ix + 1, iz + 1);
      grid_positions.push([
        (ix as f32 - half) * spacing,
        height_at(fx, fz),
        (iz as f32 - half) * spacing,
      ]);
      grid_uvs.push([ix as f32 * uv_scale, iz as f32 * uv_scale]);

      if !flat_shading {
        let dx = height_at(fx + 1, fz) - height_at(fx - 1, fz);
        let dz = height_at(fx, fz + 1) - height_at(fx, fz - 1);
        grid_normals.push(Vec3::new(-dx, 2.0 * spacing, -dz).normalize_or(Vec3::Y).to_array());
      }
    }
  }

  let cells = n - 1;
  let mut indices: Vec<u32> = Vec::with_capacity(cells * cells * 6);
  for j in 0..cells {
    for i in 0..cells {
      let a = (j * n + i) as u32;
      let b = a + 1;
      let c = a + n as u32;
      let d = c + 1;
      indices.extend_from_slice(&[a, c, d, d, b, a]);
    }
  }

  let mut mesh = if flat_shading {
    flatten(&grid_positions, &grid_uvs, &indices)
  } else {
    Mesh {
      positions: grid_positions,
      normals: grid_normals,
      uvs: grid_uvs,
      indices,
      ..Default::default()
    }
  };

  let mut bounds = MinMaxAABB::empty();
  for p in &mesh.positions {
    bounds.encapsulate(*p);
  }
  mesh.bounds = bounds;
  mesh.lod = lod;
  mesh.flat_shaded = flat_shading;

  Ok(mesh)
}

/// Give every triangle its own three vertices carrying the face normal.
fn flatten(positions: &[[f32; 3]], uvs: &[[f32; 2]], indices: &[u32]) -> Mesh {
  let mut mesh = Mesh {
    positions: Vec::with_capacity(indices.len()),
    normals: Vec::with_capacity(indices.len()),
    uvs: Vec::with_capacity(indices.len()),
    indices: (0..indices.len() as u32).collect(),
    ..Default::default()
  };

  for tri in indices.chunks_exact(3) {
    let [v0, v1, v2] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(positions[i as usize]));
    let normal = (v1 - v0).cross(v2 - v0).normalize_or(Vec3::Y).to_array();

    for &i in tri {
      mesh.positions.push(positions[i as usize]);
      mesh.uvs.push(uvs[i as usize]);
      mesh.normals.push(normal);
    }
  }

  mesh
}

#[cfg(test)]
#[path = "mesh_test.rs"]
mod mesh_test;
