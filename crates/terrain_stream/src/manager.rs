//! ChunkManager - owns the tile map and drives streaming once per tick.
//!
//! Per tick, on the owning thread:
//! 1. Publish the observer position.
//! 2. Drain the completion queue and apply each completion to its chunk.
//! 3. If the observer moved past the hysteresis threshold (or this is the
//!    first tick), recompute the square tile window: hide chunks that left
//!    it, refresh chunks inside it, create missing ones.
//! 4. Evict chunks beyond the retention distance, when one is configured.

use std::collections::{hash_map::Entry, HashMap, HashSet};
use std::sync::Arc;

use glam::Vec2;
use web_time::Instant;

use crate::chunk::{Chunk, ChunkContext};
use crate::config::StreamConfig;
use crate::error::ConfigError;
use crate::generation::{NoiseTerrain, TerrainGenerator};
use crate::metrics::StreamMetrics;
use crate::observer::ObserverCell;
use crate::pipeline::{Completion, DataPipeline, Epoch, PipelineStats};
use crate::presentation::PresentationSink;
use crate::types::TileCoord;

/// What one tick (or one of its phases) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
  /// The tile window was recomputed.
  pub updated: bool,
  /// Completions applied to a live chunk.
  pub completions: usize,
  /// Completions dropped because their chunk is gone or was replaced.
  pub stale: usize,
  pub created: usize,
  pub refreshed: usize,
  pub evicted: usize,
  /// Size of the visible set after the tick.
  pub visible: usize,
}

impl TickReport {
  fn merge(&mut self, other: TickReport) {
    self.updated |= other.updated;
    self.completions += other.completions;
    self.stale += other.stale;
    self.created += other.created;
    self.refreshed += other.refreshed;
    self.evicted += other.evicted;
  }
}

pub struct ChunkManager<G: TerrainGenerator, P: PresentationSink> {
  config: Arc<StreamConfig>,
  pipeline: DataPipeline<G>,
  sink: P,
  observer: Arc<ObserverCell>,
  chunks: HashMap<TileCoord, Chunk>,
  /// Chunks the last window update (or a later field completion) made
  /// visible.
  visible: HashSet<TileCoord>,
  /// Observer position at the last window update.
  last_update_position: Option<Vec2>,
  next_epoch: Epoch,
  metrics: StreamMetrics,
}

impl<P: PresentationSink> ChunkManager<NoiseTerrain, P> {
  /// Manager backed by the stock noise terrain.
  pub fn with_noise_terrain(config: StreamConfig, sink: P) -> Result<Self, ConfigError> {
    // NoiseTerrain sizes its falloff mask from the config, so validate first.
    config.validate()?;
    let config = Arc::new(config);
    let terrain = Arc::new(NoiseTerrain::new(Arc::clone(&config)));
    Ok(Self::assemble(config, terrain, sink, Arc::new(ObserverCell::default())))
  }
}

impl<G: TerrainGenerator, P: PresentationSink> ChunkManager<G, P> {
  pub fn new(config: Arc<StreamConfig>, generator: Arc<G>, sink: P) -> Result<Self, ConfigError> {
    Self::with_observer(config, generator, sink, Arc::new(ObserverCell::default()))
  }

  /// Like [`new`](Self::new), reading the observer from a shared cell that
  /// another component writes.
  pub fn with_observer(
    config: Arc<StreamConfig>,
    generator: Arc<G>,
    sink: P,
    observer: Arc<ObserverCell>,
  ) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self::assemble(config, generator, sink, observer))
  }

  /// Build from an already validated config.
  fn assemble(config: Arc<StreamConfig>, generator: Arc<G>, sink: P, observer: Arc<ObserverCell>) -> Self {
    log::info!(
      "chunk manager: chunk size {}, {} LOD levels, view {}, radius {}, {:?} dispatch",
      config.chunk_size(),
      config.lod_levels.len(),
      config.max_view_distance(),
      config.visible_radius(),
      config.dispatch
    );

    Self {
      pipeline: DataPipeline::new(generator, config.dispatch),
      config,
      sink,
      observer,
      chunks: HashMap::new(),
      visible: HashSet::new(),
      last_update_position: None,
      next_epoch: Epoch::new(),
      metrics: StreamMetrics::new(),
    }
  }

  // ===========================================================================
  // Accessors
  // ===========================================================================

  pub fn config(&self) -> &Arc<StreamConfig> {
    &self.config
  }

  pub fn observer_cell(&self) -> &Arc<ObserverCell> {
    &self.observer
  }

  pub fn chunk(&self, tile: TileCoord) -> Option<&Chunk> {
    self.chunks.get(&tile)
  }

  pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
    self.chunks.values()
  }

  pub fn chunk_count(&self) -> usize {
    self.chunks.len()
  }

  pub fn visible_tiles(&self) -> &HashSet<TileCoord> {
    &self.visible
  }

  pub fn sink(&self) -> &P {
    &self.sink
  }

  pub fn sink_mut(&mut self) -> &mut P {
    &mut self.sink
  }

  pub fn pipeline_stats(&self) -> PipelineStats {
    self.pipeline.stats()
  }

  /// Requests submitted whose completions have not been drained.
  pub fn outstanding_requests(&self) -> usize {
    self.pipeline.outstanding()
  }

  pub fn is_idle(&self) -> bool {
    self.pipeline.is_idle()
  }

  pub fn metrics(&self) -> &StreamMetrics {
    &self.metrics
  }

  // ===========================================================================
  // Tick
  // ===========================================================================

  /// Publish `observer` and run one tick.
  pub fn tick(&mut self, observer: Vec2) -> TickReport {
    self.observer.store(observer);
    self.step()
  }

  /// Run one tick with whatever position the observer cell holds.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "manager::tick"))]
  pub fn step(&mut self) -> TickReport {
    let start = Instant::now();
    let mut report = self.process_completions();

    let position = self.observer.load();
    let moved = match self.last_update_position {
      None => true,
      Some(last) => (position - last).length_squared() > self.config.sqr_move_threshold(),
    };
    if moved {
      report.merge(self.update_visible_chunks());
    }

    report.visible = self.visible.len();
    self
      .metrics
      .snapshot_chunks(self.chunks.values().map(|c| c.is_visible().then_some(c.displayed_lod()).flatten()));
    self.metrics.record_tick(start.elapsed().as_micros() as u64);
    report
  }

  /// Drain the completion queue and apply every completion to its chunk.
  /// Completions for evicted or replaced chunks are dropped.
  pub fn process_completions(&mut self) -> TickReport {
    let mut report = TickReport::default();
    let observer = self.observer.load();

    for completion in self.pipeline.drain() {
      let token = completion.token();
      let chunk = match self.chunks.get_mut(&token.tile) {
        Some(chunk) if chunk.epoch() == token.epoch => chunk,
        _ => {
          log::trace!("dropping stale {:?} for {:?}", completion.id(), token.tile);
          report.stale += 1;
          continue;
        }
      };

      if completion.is_err() {
        self.metrics.record_failure();
      }

      match completion {
        Completion::Field {
          id, elapsed_us, result, ..
        } => {
          if result.is_ok() {
            self.metrics.record_field(elapsed_us);
          }
          let mut ctx = ChunkContext {
            config: &self.config,
            pipeline: &mut self.pipeline,
            sink: &mut self.sink,
            observer,
          };
          match chunk.apply_field(id, result, &mut ctx) {
            Some(visible) => {
              report.completions += 1;
              if visible {
                self.visible.insert(token.tile);
              }
            }
            None => report.stale += 1,
          }
        }
        Completion::Mesh {
          id,
          lod_index,
          elapsed_us,
          result,
          ..
        } => {
          if result.is_ok() {
            self.metrics.record_mesh(lod_index, elapsed_us);
          }
          if chunk.apply_mesh(id, lod_index, result, &self.config, &mut self.sink) {
            report.completions += 1;
          } else {
            report.stale += 1;
          }
        }
      }
    }

    report
  }

  /// Recompute the tile window around the observer, regardless of how far
  /// it moved.
  pub fn update_visible_chunks(&mut self) -> TickReport {
    let mut report = TickReport {
      updated: true,
      ..Default::default()
    };

    let observer = self.observer.load();
    self.last_update_position = Some(observer);

    let current = TileCoord::containing(observer, self.config.chunk_size_f32());
    let radius = self.config.visible_radius();
    let in_window = |tile: TileCoord| (tile.x() - current.x()).abs() <= radius && (tile.y() - current.y()).abs() <= radius;

    for tile in std::mem::take(&mut self.visible) {
      if in_window(tile) {
        continue;
      }
      if let Some(chunk) = self.chunks.get_mut(&tile) {
        chunk.set_visible(false, &mut self.sink);
      }
    }

    let mut ctx = ChunkContext {
      config: &self.config,
      pipeline: &mut self.pipeline,
      sink: &mut self.sink,
      observer,
    };

    for dy in -radius..=radius {
      for dx in -radius..=radius {
        let tile = current.offset(dx, dy);
        let visible = match self.chunks.entry(tile) {
          Entry::Occupied(entry) => {
            report.refreshed += 1;
            entry.into_mut().refresh(&mut ctx)
          }
          Entry::Vacant(entry) => {
            let mut chunk = Chunk::new(tile, self.next_epoch, ctx.config);
            self.next_epoch.increment();
            chunk.request_field(ctx.pipeline);
            entry.insert(chunk);
            report.created += 1;
            log::debug!("created chunk {tile:?}");
            false
          }
        };
        if visible {
          self.visible.insert(tile);
        }
      }
    }

    report.evicted = self.evict(observer, in_window);
    report
  }

  /// Drop chunks outside the window and farther than the retention
  /// distance.
  fn evict(&mut self, observer: Vec2, in_window: impl Fn(TileCoord) -> bool) -> usize {
    let Some(retention) = self.config.retention_distance else {
      return 0;
    };

    let doomed: Vec<TileCoord> = self
      .chunks
      .iter()
      .filter(|(tile, chunk)| !in_window(**tile) && chunk.bounds().distance(observer) > retention)
      .map(|(tile, _)| *tile)
      .collect();

    for tile in &doomed {
      self.chunks.remove(tile);
      self.visible.remove(tile);
      self.sink.on_chunk_removed(*tile);
    }

    if !doomed.is_empty() {
      log::info!("evicted {} chunks, {} remain", doomed.len(), self.chunks.len());
      self.metrics.record_evicted(doomed.len());
    }
    doomed.len()
  }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod manager_test;
