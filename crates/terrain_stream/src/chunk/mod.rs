//! Chunk - one tile's lifecycle.
//!
//! ```text
//! AwaitingField ──field──► FieldReady ──refresh──► per LOD slot:
//!                                                  NotRequested ─submit─► Requested ─mesh─► Ready
//!                                                        ▲                    │
//!                                                        └──────error─────────┘
//! ```
//!
//! A chunk without a field is never visible. Once the field arrives every
//! refresh picks a LOD band from the point-to-bounds distance, displays a
//! cached mesh, or requests one. Each slot has at most one request in
//! flight, and a `Ready` mesh is kept until the chunk is dropped.

mod lod;

use std::sync::Arc;

use glam::Vec2;
use smallvec::SmallVec;

pub use lod::select_lod;

use crate::config::StreamConfig;
use crate::error::GenerationError;
use crate::generation::{FieldData, TerrainGenerator};
use crate::pipeline::{DataPipeline, Epoch, RequestId, RequestToken};
use crate::presentation::PresentationSink;
use crate::types::{Bounds, Mesh, Texture, TileCoord};

/// Cache entry for one (chunk, LOD level) pair.
#[derive(Clone, Debug, Default)]
pub enum MeshSlot {
  #[default]
  NotRequested,
  Requested(RequestId),
  Ready(Arc<Mesh>),
}

impl MeshSlot {
  pub fn is_requested(&self) -> bool {
    matches!(self, MeshSlot::Requested(_))
  }

  pub fn is_ready(&self) -> bool {
    matches!(self, MeshSlot::Ready(_))
  }

  pub fn mesh(&self) -> Option<&Arc<Mesh>> {
    match self {
      MeshSlot::Ready(mesh) => Some(mesh),
      _ => None,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
  AwaitingField,
  FieldReady,
}

/// Everything a chunk touches while refreshing or applying a completion.
pub struct ChunkContext<'a, G: TerrainGenerator, P: PresentationSink> {
  pub config: &'a StreamConfig,
  pub pipeline: &'a mut DataPipeline<G>,
  pub sink: &'a mut P,
  pub observer: Vec2,
}

pub struct Chunk {
  coord: TileCoord,
  bounds: Bounds,
  epoch: Epoch,
  field: Option<Arc<FieldData>>,
  texture: Option<Arc<Texture>>,
  slots: SmallVec<[MeshSlot; 4]>,
  /// Slot whose mesh the sink currently shows.
  displayed_lod: Option<usize>,
  /// Slot the last refresh selected.
  desired_lod: Option<usize>,
  visible: bool,
  field_request: Option<RequestId>,
  collision_attached: bool,
}

impl Chunk {
  pub fn new(coord: TileCoord, epoch: Epoch, config: &StreamConfig) -> Self {
    Self {
      coord,
      bounds: Bounds::for_tile(coord, config.chunk_size_f32()),
      epoch,
      field: None,
      texture: None,
      slots: (0..config.lod_levels.len()).map(|_| MeshSlot::NotRequested).collect(),
      displayed_lod: None,
      desired_lod: None,
      visible: false,
      field_request: None,
      collision_attached: false,
    }
  }

  // ===========================================================================
  // Accessors
  // ===========================================================================

  pub fn coord(&self) -> TileCoord {
    self.coord
  }

  pub fn bounds(&self) -> Bounds {
    self.bounds
  }

  pub fn epoch(&self) -> Epoch {
    self.epoch
  }

  pub fn token(&self) -> RequestToken {
    RequestToken::new(self.coord, self.epoch)
  }

  pub fn state(&self) -> ChunkState {
    if self.field.is_some() {
      ChunkState::FieldReady
    } else {
      ChunkState::AwaitingField
    }
  }

  pub fn field(&self) -> Option<&Arc<FieldData>> {
    self.field.as_ref()
  }

  pub fn texture(&self) -> Option<&Arc<Texture>> {
    self.texture.as_ref()
  }

  pub fn slots(&self) -> &[MeshSlot] {
    &self.slots
  }

  pub fn slot(&self, lod_index: usize) -> Option<&MeshSlot> {
    self.slots.get(lod_index)
  }

  pub fn displayed_lod(&self) -> Option<usize> {
    self.displayed_lod
  }

  pub fn desired_lod(&self) -> Option<usize> {
    self.desired_lod
  }

  pub fn is_visible(&self) -> bool {
    self.visible
  }

  pub fn has_collision(&self) -> bool {
    self.collision_attached
  }

  pub fn field_pending(&self) -> bool {
    self.field_request.is_some()
  }

  /// Field plus mesh requests still in flight.
  pub fn requests_in_flight(&self) -> usize {
    self.field_request.is_some() as usize + self.slots.iter().filter(|s| s.is_requested()).count()
  }

  // ===========================================================================
  // Transitions
  // ===========================================================================

  /// Submit the field request unless the field exists or is already coming.
  pub fn request_field<G: TerrainGenerator>(&mut self, pipeline: &mut DataPipeline<G>) {
    if self.field.is_none() && self.field_request.is_none() {
      self.field_request = Some(pipeline.submit_field_request(self.token()));
    }
  }

  /// Re-evaluate visibility and LOD against the observer. Returns whether
  /// the chunk is visible afterwards.
  pub fn refresh<G: TerrainGenerator, P: PresentationSink>(&mut self, ctx: &mut ChunkContext<'_, G, P>) -> bool {
    let Some(field) = self.field.clone() else {
      // Retry after a failed field request.
      self.request_field(ctx.pipeline);
      self.set_visible(false, ctx.sink);
      return false;
    };

    let config = ctx.config;
    let distance = self.bounds.distance(ctx.observer);
    if distance > config.max_view_distance() {
      self.set_visible(false, ctx.sink);
      return false;
    }

    self.set_visible(true, ctx.sink);

    let levels = &config.lod_levels;
    let lod_index = select_lod(levels, distance);
    if self.desired_lod != Some(lod_index) {
      log::debug!("{:?}: LOD {:?} -> {}", self.coord, self.desired_lod, lod_index);
    }
    self.desired_lod = Some(lod_index);

    if self.displayed_lod != Some(lod_index) {
      match self.slots[lod_index].clone() {
        MeshSlot::Ready(mesh) => {
          self.displayed_lod = Some(lod_index);
          ctx.sink.on_mesh_ready(self.coord, levels[lod_index].lod, mesh);
        }
        MeshSlot::NotRequested => self.request_mesh(lod_index, &field, ctx),
        MeshSlot::Requested(_) => {}
      }
    }

    // Collision only matters up close.
    if lod_index == 0 {
      if let Some(collision_index) = config.collision_lod_index() {
        match self.slots[collision_index].clone() {
          MeshSlot::NotRequested => self.request_mesh(collision_index, &field, ctx),
          MeshSlot::Ready(mesh) if !self.collision_attached => self.attach_collision(mesh, ctx.sink),
          _ => {}
        }
      }
    }

    true
  }

  /// Apply a drained field completion. Returns whether the chunk is visible
  /// afterwards; `None` when the completion was not for this chunk's
  /// outstanding request.
  pub fn apply_field<G: TerrainGenerator, P: PresentationSink>(
    &mut self,
    id: RequestId,
    result: Result<Arc<FieldData>, GenerationError>,
    ctx: &mut ChunkContext<'_, G, P>,
  ) -> Option<bool> {
    if self.field_request != Some(id) {
      return None;
    }
    self.field_request = None;

    let field = match result {
      Ok(field) => field,
      Err(err) => {
        log::warn!("{:?}: field generation failed: {err}", self.coord);
        return Some(false);
      }
    };

    match ctx.pipeline.generator().bake_texture(&field.colors) {
      Ok(texture) => {
        let texture = Arc::new(texture);
        self.texture = Some(Arc::clone(&texture));
        ctx.sink.on_texture_ready(self.coord, texture);
      }
      Err(err) => log::warn!("{:?}: texture bake failed: {err}", self.coord),
    }

    self.field = Some(field);
    Some(self.refresh(ctx))
  }

  /// Apply a drained mesh completion for slot `lod_index`. Completions that
  /// do not match the slot's outstanding request are ignored.
  pub fn apply_mesh<P: PresentationSink>(
    &mut self,
    id: RequestId,
    lod_index: usize,
    result: Result<Arc<Mesh>, GenerationError>,
    config: &StreamConfig,
    sink: &mut P,
  ) -> bool {
    let Some(slot) = self.slots.get_mut(lod_index) else {
      return false;
    };
    if !matches!(slot, MeshSlot::Requested(pending) if *pending == id) {
      return false;
    }

    let mesh = match result {
      Ok(mesh) => mesh,
      Err(err) => {
        log::warn!("{:?}: mesh generation failed for LOD slot {lod_index}: {err}", self.coord);
        *slot = MeshSlot::NotRequested;
        return true;
      }
    };
    *slot = MeshSlot::Ready(Arc::clone(&mesh));

    if self.visible && self.desired_lod == Some(lod_index) && self.displayed_lod != Some(lod_index) {
      self.displayed_lod = Some(lod_index);
      sink.on_mesh_ready(self.coord, config.lod_levels[lod_index].lod, Arc::clone(&mesh));
    }

    if config.collision_lod_index() == Some(lod_index) && !self.collision_attached {
      self.attach_collision(mesh, sink);
    }

    true
  }

  fn request_mesh<G: TerrainGenerator, P: PresentationSink>(
    &mut self,
    lod_index: usize,
    field: &Arc<FieldData>,
    ctx: &mut ChunkContext<'_, G, P>,
  ) {
    let lod = ctx.config.lod_levels[lod_index].lod;
    let id = ctx
      .pipeline
      .submit_mesh_request(Arc::clone(field), lod_index, lod, self.token());
    self.slots[lod_index] = MeshSlot::Requested(id);
  }

  fn attach_collision<P: PresentationSink>(&mut self, mesh: Arc<Mesh>, sink: &mut P) {
    self.collision_attached = true;
    sink.on_collision_mesh_ready(self.coord, mesh);
  }

  /// Toggle visibility, notifying the sink on change.
  pub fn set_visible<P: PresentationSink>(&mut self, visible: bool, sink: &mut P) {
    if self.visible != visible {
      self.visible = visible;
      sink.on_visibility_changed(self.coord, visible);
    }
  }
}
