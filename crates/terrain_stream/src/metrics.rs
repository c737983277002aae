//! Streaming statistics: generation timings, per-LOD counts, chunk totals.
//!
//! Compiled in with the `metrics` feature and switchable at runtime through
//! [`COLLECT_METRICS`]. Without the feature every `record_*` call is a no-op.
//!
//! ```ignore
//! terrain_stream::metrics::COLLECT_METRICS.store(false, Ordering::Relaxed);
//!
//! let m = manager.metrics();
//! println!("{} visible, avg field {:.0}us", m.visible_chunks, m.avg_field_timing_us());
//! ```

use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
#[cfg(feature = "metrics")]
use std::sync::atomic::Ordering;

/// Runtime switch, only read when the `metrics` feature is on.
pub static COLLECT_METRICS: AtomicBool = AtomicBool::new(true);

#[cfg(feature = "metrics")]
#[inline]
pub fn is_enabled() -> bool {
  COLLECT_METRICS.load(Ordering::Relaxed)
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub fn is_enabled() -> bool {
  false
}

/// Fixed-capacity history; pushing past capacity drops the oldest sample.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
  samples: VecDeque<T>,
  capacity: usize,
}

impl<T> RollingWindow<T> {
  pub fn new(capacity: usize) -> Self {
    Self {
      samples: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn push(&mut self, value: T) {
    while self.samples.len() >= self.capacity.max(1) {
      self.samples.pop_front();
    }
    self.samples.push_back(value);
  }

  pub fn len(&self) -> usize {
    self.samples.len()
  }

  pub fn is_empty(&self) -> bool {
    self.samples.is_empty()
  }

  pub fn latest(&self) -> Option<&T> {
    self.samples.back()
  }
}

impl RollingWindow<u64> {
  /// Mean of the retained samples, 0 when empty.
  pub fn average(&self) -> f64 {
    match self.samples.len() {
      0 => 0.0,
      n => self.samples.iter().sum::<u64>() as f64 / n as f64,
    }
  }

  pub fn min_max(&self) -> Option<(u64, u64)> {
    self.samples.iter().fold(None, |range, &v| match range {
      None => Some((v, v)),
      Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
  }
}

/// 128 samples per history.
impl Default for RollingWindow<u64> {
  fn default() -> Self {
    Self::new(128)
  }
}

/// LOD slots tracked individually; deeper slots share the last bucket.
pub const MAX_TRACKED_LODS: usize = 8;

/// Streaming-level statistics, updated by the chunk manager every tick.
#[derive(Debug, Clone, Default)]
pub struct StreamMetrics {
  /// Field synthesis times in microseconds.
  pub field_timings: RollingWindow<u64>,
  /// Triangulation times in microseconds.
  pub mesh_timings: RollingWindow<u64>,
  /// Completion drain + window update times in microseconds.
  pub tick_timings: RollingWindow<u64>,

  /// Visible chunks per displayed LOD slot.
  pub visible_per_lod: [u32; MAX_TRACKED_LODS],
  /// Meshes generated per LOD slot this session.
  pub meshes_per_lod: [u64; MAX_TRACKED_LODS],

  pub live_chunks: u32,
  pub visible_chunks: u32,
  pub total_fields_generated: u64,
  pub total_meshes_generated: u64,
  pub total_failures: u64,
  pub total_evicted: u64,
}

impl StreamMetrics {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn record_field(&mut self, timing_us: u64) {
    if is_enabled() {
      self.field_timings.push(timing_us);
      self.total_fields_generated += 1;
    }
  }

  pub fn record_mesh(&mut self, lod_index: usize, timing_us: u64) {
    if is_enabled() {
      self.mesh_timings.push(timing_us);
      self.meshes_per_lod[lod_index.min(MAX_TRACKED_LODS - 1)] += 1;
      self.total_meshes_generated += 1;
    }
  }

  pub fn record_failure(&mut self) {
    if is_enabled() {
      self.total_failures += 1;
    }
  }

  pub fn record_evicted(&mut self, count: usize) {
    if is_enabled() {
      self.total_evicted += count as u64;
    }
  }

  pub fn record_tick(&mut self, timing_us: u64) {
    if is_enabled() {
      self.tick_timings.push(timing_us);
    }
  }

  /// Replace the chunk snapshot with the displayed LOD of every live chunk
  /// (`None` for hidden chunks).
  pub fn snapshot_chunks(&mut self, displayed: impl Iterator<Item = Option<usize>>) {
    if !is_enabled() {
      return;
    }

    self.visible_per_lod.fill(0);
    self.live_chunks = 0;
    self.visible_chunks = 0;
    for lod_index in displayed {
      self.live_chunks += 1;
      if let Some(lod_index) = lod_index {
        self.visible_chunks += 1;
        self.visible_per_lod[lod_index.min(MAX_TRACKED_LODS - 1)] += 1;
      }
    }
  }

  pub fn avg_field_timing_us(&self) -> f64 {
    self.field_timings.average()
  }

  pub fn avg_mesh_timing_us(&self) -> f64 {
    self.mesh_timings.average()
  }

  pub fn avg_tick_timing_us(&self) -> f64 {
    self.tick_timings.average()
  }
}
