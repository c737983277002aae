//! Generation functions.
//!
//! Pure, stateless, callable from any thread. The streaming core only sees
//! them through [`TerrainGenerator`]; [`NoiseTerrain`] is the stock
//! implementation driven by [`StreamConfig`].
//!
//! - [`synthesize_heights`]: fractal Perlin height field
//! - [`falloff_mask`]: island mask subtracted from heights
//! - [`colorize`] / [`bake_texture`]: colour bands and RGBA8 texture
//! - [`triangulate`]: LOD mesh with smooth or flat normals
//! - [`scatter`]: seeded tree/rock placement

mod curve;
mod decoration;
mod falloff;
mod heights;
mod mesh;
mod texture;

use std::sync::Arc;

pub use curve::HeightCurve;
pub use decoration::{scatter, DecorationKind, DecorationSite, ROCK_VARIANTS};
pub use falloff::{apply_falloff, falloff_mask};
pub use heights::{synthesize_heights, NormalizeMode};
pub use mesh::{mesh_stride, triangulate};
pub use texture::{bake_texture, colorize};

use crate::config::StreamConfig;
use crate::error::GenerationError;
use crate::types::{ColorField, HeightField, Mesh, Texture, TileCoord};

/// Everything a field request produces for one tile.
#[derive(Clone, Debug)]
pub struct FieldData {
  pub tile: TileCoord,
  pub heights: HeightField,
  pub colors: ColorField,
  pub decorations: Vec<DecorationSite>,
}

/// Seam between the streaming core and the terrain algorithms.
///
/// Called concurrently from worker threads; implementations must not keep
/// per-call mutable state.
pub trait TerrainGenerator: Send + Sync + 'static {
  /// Height, colour and decoration data for `tile`.
  fn synthesize_field(&self, tile: TileCoord) -> Result<FieldData, GenerationError>;

  /// Mesh for a bordered height field at one LOD value.
  fn triangulate(&self, heights: &HeightField, lod: u32) -> Result<Mesh, GenerationError>;

  /// Texture for a bordered colour field.
  fn bake_texture(&self, colors: &ColorField) -> Result<Texture, GenerationError>;
}

/// Noise-based terrain built from a [`StreamConfig`].
pub struct NoiseTerrain {
  config: Arc<StreamConfig>,
  falloff: Option<HeightField>,
}

impl NoiseTerrain {
  pub fn new(config: Arc<StreamConfig>) -> Self {
    // Mask is the same for every tile, build it once.
    let falloff = config.use_falloff.then(|| falloff_mask(config.field_side()));
    Self { config, falloff }
  }

  pub fn config(&self) -> &Arc<StreamConfig> {
    &self.config
  }
}

impl TerrainGenerator for NoiseTerrain {
  fn synthesize_field(&self, tile: TileCoord) -> Result<FieldData, GenerationError> {
    let config = &self.config;
    let origin = tile.center(config.chunk_size_f32());

    let mut heights = synthesize_heights(origin, config.field_side(), config.sample_spacing(), &config.noise)?;
    if let Some(mask) = &self.falloff {
      apply_falloff(&mut heights, mask);
    }

    let colors = colorize(&heights, &config.regions);
    let decorations = scatter(tile, &heights, &config.decorations, config.noise.seed);

    Ok(FieldData {
      tile,
      heights,
      colors,
      decorations,
    })
  }

  fn triangulate(&self, heights: &HeightField, lod: u32) -> Result<Mesh, GenerationError> {
    let expected = self.config.field_side();
    if heights.side() != expected {
      return Err(GenerationError::FieldSizeMismatch {
        expected,
        actual: heights.side(),
      });
    }
    let mesh = &self.config.mesh;
    triangulate(heights, mesh.height_multiplier, &mesh.height_curve, lod, self.config.flat_shading)
  }

  fn bake_texture(&self, colors: &ColorField) -> Result<Texture, GenerationError> {
    let size = self.config.chunk_size() as usize;
    bake_texture(colors, size, size)
  }
}
