//! StreamConfig - shared, immutable configuration for the streaming core.
//!
//! Loaded from TOML (every field has a default) and validated once before a
//! [`ChunkManager`](crate::ChunkManager) is built. After validation it is
//! handed around as `Arc<StreamConfig>`.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::generation::{mesh_stride, HeightCurve, NormalizeMode};
use crate::threading::Dispatch;
use crate::types::Rgba;

/// Samples per chunk edge with smooth shading.
pub const SMOOTH_CHUNK_SIZE: u32 = 239;

/// Samples per chunk edge with flat shading (vertices are not shared, so
/// fewer fit in the index budget).
pub const FLAT_CHUNK_SIZE: u32 = 95;

/// One level of detail band.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct LodLevel {
  /// Mesh simplification level passed to triangulation.
  pub lod: u32,
  /// Chunks closer than this (edge distance) may use this level.
  pub visible_distance_threshold: f32,
  /// This level's mesh doubles as collision geometry.
  #[serde(default)]
  pub used_for_collision: bool,
}

impl LodLevel {
  pub const fn new(lod: u32, visible_distance_threshold: f32) -> Self {
    Self {
      lod,
      visible_distance_threshold,
      used_for_collision: false,
    }
  }

  pub const fn with_collision(mut self) -> Self {
    self.used_for_collision = true;
    self
  }
}

/// Fractal noise parameters for field synthesis.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
  pub scale: f32,
  pub octaves: u32,
  pub persistence: f32,
  pub lacunarity: f32,
  pub seed: i32,
  /// World-space offset added to every sample position.
  pub offset: [f32; 2],
  pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
  fn default() -> Self {
    Self {
      scale: 50.0,
      octaves: 4,
      persistence: 0.5,
      lacunarity: 2.0,
      seed: 0,
      offset: [0.0, 0.0],
      normalize_mode: NormalizeMode::Global,
    }
  }
}

/// Height-to-mesh parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
  pub height_multiplier: f32,
  pub height_curve: HeightCurve,
}

impl Default for MeshSettings {
  fn default() -> Self {
    Self {
      height_multiplier: 30.0,
      height_curve: HeightCurve::default(),
    }
  }
}

/// Colour band: samples at or above `height` take `color` until the next band.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TerrainRegion {
  pub name: String,
  pub height: f32,
  pub color: Rgba,
}

impl TerrainRegion {
  pub fn new(name: &str, height: f32, color: Rgba) -> Self {
    Self {
      name: name.to_owned(),
      height,
      color,
    }
  }
}

fn default_regions() -> Vec<TerrainRegion> {
  vec![
    TerrainRegion::new("deep water", 0.0, Rgba::rgb(0.20, 0.38, 0.76)),
    TerrainRegion::new("shallow water", 0.3, Rgba::rgb(0.21, 0.40, 0.78)),
    TerrainRegion::new("sand", 0.4, Rgba::rgb(0.82, 0.82, 0.50)),
    TerrainRegion::new("grass", 0.45, Rgba::rgb(0.34, 0.60, 0.10)),
    TerrainRegion::new("forest", 0.55, Rgba::rgb(0.24, 0.42, 0.08)),
    TerrainRegion::new("rock", 0.6, Rgba::rgb(0.37, 0.27, 0.23)),
    TerrainRegion::new("mountain", 0.7, Rgba::rgb(0.29, 0.23, 0.21)),
    TerrainRegion::new("snow", 0.9, Rgba::rgb(1.0, 1.0, 1.0)),
  ]
}

/// Decoration scattering over a field.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DecorationSettings {
  pub enabled: bool,
  /// Distance in samples between candidate sites.
  pub spacing: usize,
  /// Samples kept free along each chunk edge.
  pub margin: usize,
}

impl Default for DecorationSettings {
  fn default() -> Self {
    Self {
      enabled: true,
      spacing: 5,
      margin: 5,
    }
  }
}

/// Configuration for the streaming core.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
  /// Flat shading duplicates vertices per triangle; also picks the chunk size.
  pub flat_shading: bool,
  /// Replace the shading-derived chunk size (small worlds, tests).
  pub chunk_size_override: Option<u32>,
  /// Ordered by increasing threshold.
  pub lod_levels: Vec<LodLevel>,
  /// Defaults to the last LOD threshold.
  pub max_view_distance: Option<f32>,
  /// Observer displacement needed before the tile window is recomputed.
  pub viewer_move_threshold: f32,
  /// Chunks farther than this are evicted. `None` keeps every chunk.
  pub retention_distance: Option<f32>,
  pub dispatch: Dispatch,
  /// Subtract an island falloff mask from every field.
  pub use_falloff: bool,
  pub noise: NoiseSettings,
  pub mesh: MeshSettings,
  pub regions: Vec<TerrainRegion>,
  pub decorations: DecorationSettings,
}

impl Default for StreamConfig {
  fn default() -> Self {
    Self {
      flat_shading: false,
      chunk_size_override: None,
      lod_levels: vec![
        LodLevel::new(0, 200.0).with_collision(),
        LodLevel::new(2, 400.0),
        LodLevel::new(4, 600.0),
      ],
      max_view_distance: None,
      viewer_move_threshold: 25.0,
      retention_distance: None,
      dispatch: Dispatch::default(),
      use_falloff: false,
      noise: NoiseSettings::default(),
      mesh: MeshSettings::default(),
      regions: default_regions(),
      decorations: DecorationSettings::default(),
    }
  }
}

impl StreamConfig {
  /// Parse and validate a TOML document.
  pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
  }

  /// Read, parse and validate a TOML file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_toml_str(&source)
  }

  /// Samples per chunk edge, which is also the tile size in world units.
  #[inline]
  pub fn chunk_size(&self) -> u32 {
    match self.chunk_size_override {
      Some(size) => size,
      None if self.flat_shading => FLAT_CHUNK_SIZE,
      None => SMOOTH_CHUNK_SIZE,
    }
  }

  #[inline]
  pub fn chunk_size_f32(&self) -> f32 {
    self.chunk_size() as f32
  }

  /// Samples per field edge (chunk plus one border sample each side).
  #[inline]
  pub fn field_side(&self) -> usize {
    self.chunk_size() as usize + 2
  }

  /// World distance between adjacent samples. The interior samples span
  /// exactly one tile.
  #[inline]
  pub fn sample_spacing(&self) -> f32 {
    let size = self.chunk_size_f32();
    size / (size - 1.0)
  }

  #[inline]
  pub fn max_view_distance(&self) -> f32 {
    self
      .max_view_distance
      .or_else(|| self.lod_levels.last().map(|l| l.visible_distance_threshold))
      .unwrap_or(0.0)
  }

  /// Tile radius of the square window around the observer.
  #[inline]
  pub fn visible_radius(&self) -> i32 {
    (self.max_view_distance() / self.chunk_size_f32()).ceil() as i32
  }

  #[inline]
  pub fn sqr_move_threshold(&self) -> f32 {
    self.viewer_move_threshold * self.viewer_move_threshold
  }

  /// Index of the collision LOD level.
  pub fn collision_lod_index(&self) -> Option<usize> {
    self.lod_levels.iter().position(|l| l.used_for_collision)
  }

  /// Check every invariant the streaming core relies on.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let chunk_size = self.chunk_size();
    if chunk_size < 2 {
      return Err(ConfigError::InvalidChunkSize(chunk_size));
    }

    if self.lod_levels.is_empty() {
      return Err(ConfigError::EmptyLodLevels);
    }

    for (index, pair) in self.lod_levels.windows(2).enumerate() {
      let (previous, current) = (pair[0].visible_distance_threshold, pair[1].visible_distance_threshold);
      if !(current > previous) {
        return Err(ConfigError::NonIncreasingThresholds {
          index: index + 1,
          previous,
          current,
        });
      }
    }

    match self.lod_levels.iter().filter(|l| l.used_for_collision).count() {
      0 => return Err(ConfigError::MissingCollisionLod),
      1 => {}
      count => return Err(ConfigError::MultipleCollisionLods { count }),
    }

    for level in &self.lod_levels {
      if mesh_stride(level.lod) >= chunk_size as usize {
        return Err(ConfigError::LodTooCoarse {
          lod: level.lod,
          chunk_size,
        });
      }
    }

    let view = self.max_view_distance();
    if !(view > 0.0 && view.is_finite()) {
      return Err(ConfigError::InvalidViewDistance(view));
    }

    if let Some(retention) = self.retention_distance {
      if !(retention >= view) {
        return Err(ConfigError::InvalidRetention { retention, view });
      }
    }

    if !(self.viewer_move_threshold >= 0.0 && self.viewer_move_threshold.is_finite()) {
      return Err(ConfigError::InvalidMoveThreshold(self.viewer_move_threshold));
    }

    let noise = &self.noise;
    if !(noise.scale > 0.0 && noise.scale.is_finite()) {
      return Err(ConfigError::InvalidNoise(format!("scale must be positive, got {}", noise.scale)));
    }
    if noise.octaves == 0 {
      return Err(ConfigError::InvalidNoise("octaves must be at least 1".into()));
    }
    if !(0.0..=1.0).contains(&noise.persistence) {
      return Err(ConfigError::InvalidNoise(format!(
        "persistence must be within [0, 1], got {}",
        noise.persistence
      )));
    }
    if !(noise.lacunarity >= 1.0) {
      return Err(ConfigError::InvalidNoise(format!(
        "lacunarity must be at least 1, got {}",
        noise.lacunarity
      )));
    }

    Ok(())
  }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
