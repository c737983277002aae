//! Test utilities shared by pipeline and manager tests.
//!
//! Provides a scripted terrain generator and small-world configs.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::{LodLevel, StreamConfig};
use crate::error::GenerationError;
use crate::generation::{self, FieldData, HeightCurve, TerrainGenerator};
use crate::threading::Dispatch;
use crate::types::{ColorField, HeightField, Mesh, Rgba, Texture, TileCoord};

// =============================================================================
// Configs
// =============================================================================

/// 16-unit chunks, one LOD level (threshold 100), radius-1 window: the 3×3
/// world.
pub fn small_world(dispatch: Dispatch) -> StreamConfig {
  StreamConfig {
    chunk_size_override: Some(16),
    lod_levels: vec![LodLevel::new(0, 100.0).with_collision()],
    max_view_distance: Some(16.0),
    dispatch,
    ..Default::default()
  }
}

/// 16-unit chunks with three LOD bands at 10 / 20 / 40 units.
pub fn banded_world(dispatch: Dispatch) -> StreamConfig {
  StreamConfig {
    chunk_size_override: Some(16),
    lod_levels: vec![
      LodLevel::new(0, 10.0).with_collision(),
      LodLevel::new(1, 20.0),
      LodLevel::new(2, 40.0),
    ],
    max_view_distance: Some(40.0),
    dispatch,
    ..Default::default()
  }
}

// =============================================================================
// Scripted generator
// =============================================================================

/// Flat-terrain generator that counts calls and fails on demand.
pub struct ScriptedTerrain {
  side: usize,
  field_calls: AtomicUsize,
  mesh_calls: AtomicUsize,
  failing_tiles: Mutex<HashSet<TileCoord>>,
  panicking_tiles: Mutex<HashSet<TileCoord>>,
  failing_lods: Mutex<HashSet<u32>>,
}

impl ScriptedTerrain {
  pub fn new(config: &StreamConfig) -> Self {
    Self {
      side: config.field_side(),
      field_calls: AtomicUsize::new(0),
      mesh_calls: AtomicUsize::new(0),
      failing_tiles: Mutex::new(HashSet::new()),
      panicking_tiles: Mutex::new(HashSet::new()),
      failing_lods: Mutex::new(HashSet::new()),
    }
  }

  pub fn shared(config: &StreamConfig) -> Arc<Self> {
    Arc::new(Self::new(config))
  }

  pub fn field_calls(&self) -> usize {
    self.field_calls.load(Ordering::SeqCst)
  }

  pub fn mesh_calls(&self) -> usize {
    self.mesh_calls.load(Ordering::SeqCst)
  }

  pub fn fail_tile(&self, tile: TileCoord, fail: bool) {
    let mut tiles = self.failing_tiles.lock().unwrap();
    if fail {
      tiles.insert(tile);
    } else {
      tiles.remove(&tile);
    }
  }

  pub fn panic_on_tile(&self, tile: TileCoord) {
    self.panicking_tiles.lock().unwrap().insert(tile);
  }

  pub fn fail_lod(&self, lod: u32, fail: bool) {
    let mut lods = self.failing_lods.lock().unwrap();
    if fail {
      lods.insert(lod);
    } else {
      lods.remove(&lod);
    }
  }
}

impl TerrainGenerator for ScriptedTerrain {
  fn synthesize_field(&self, tile: TileCoord) -> Result<FieldData, GenerationError> {
    self.field_calls.fetch_add(1, Ordering::SeqCst);

    if self.panicking_tiles.lock().unwrap().contains(&tile) {
      panic!("scripted panic at {tile:?}");
    }
    if self.failing_tiles.lock().unwrap().contains(&tile) {
      return Err(GenerationError::InvalidParameters(format!("scripted failure at {tile:?}")));
    }

    Ok(FieldData {
      tile,
      heights: HeightField::filled(self.side, 0.5),
      colors: ColorField::filled(self.side, Rgba::rgb(0.0, 1.0, 0.0)),
      decorations: Vec::new(),
    })
  }

  fn triangulate(&self, heights: &HeightField, lod: u32) -> Result<Mesh, GenerationError> {
    self.mesh_calls.fetch_add(1, Ordering::SeqCst);

    if self.failing_lods.lock().unwrap().contains(&lod) {
      return Err(GenerationError::InvalidParameters(format!("scripted failure at lod {lod}")));
    }
    generation::triangulate(heights, 1.0, &HeightCurve::linear(), lod, false)
  }

  fn bake_texture(&self, colors: &ColorField) -> Result<Texture, GenerationError> {
    let size = self.side - 2;
    generation::bake_texture(colors, size, size)
  }
}
