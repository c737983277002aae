//! DataPipeline - submits generation requests and hands back completions.
//!
//! ```ignore
//! let mut pipeline = DataPipeline::new(Arc::new(terrain), Dispatch::Pool);
//!
//! let id = pipeline.submit_field_request(RequestToken::new(tile, epoch));
//!
//! // Once per tick, on the owning thread
//! for completion in pipeline.drain() {
//!     apply(completion);
//! }
//! ```

use std::sync::Arc;

use web_time::Instant;

use super::queue::CompletionQueue;
use super::types::{Completion, PipelineStats, RequestId, RequestToken};
use crate::generation::{FieldData, TerrainGenerator};
use crate::threading::{run_guarded, Dispatch};

/// Non-blocking front end to the generation functions.
///
/// Each submission becomes one background job that runs a generation
/// function and pushes a [`Completion`]. Completions are never applied by
/// workers; [`drain`](Self::drain) returns them to the owning thread.
pub struct DataPipeline<G: TerrainGenerator> {
  generator: Arc<G>,
  queue: Arc<CompletionQueue>,
  dispatch: Dispatch,
  /// Submitted, not yet drained.
  outstanding: usize,
  stats: PipelineStats,
}

impl<G: TerrainGenerator> DataPipeline<G> {
  pub fn new(generator: Arc<G>, dispatch: Dispatch) -> Self {
    Self {
      generator,
      queue: Arc::new(CompletionQueue::new()),
      dispatch,
      outstanding: 0,
      stats: PipelineStats::default(),
    }
  }

  pub fn generator(&self) -> &Arc<G> {
    &self.generator
  }

  pub fn dispatch(&self) -> Dispatch {
    self.dispatch
  }

  /// Requests whose completion has not been drained yet.
  pub fn outstanding(&self) -> usize {
    self.outstanding
  }

  pub fn is_idle(&self) -> bool {
    self.outstanding == 0
  }

  pub fn stats(&self) -> PipelineStats {
    self.stats
  }

  /// Queue generation of the field for `token.tile`.
  pub fn submit_field_request(&mut self, token: RequestToken) -> RequestId {
    let id = RequestId::next();
    let generator = Arc::clone(&self.generator);
    let queue = Arc::clone(&self.queue);

    self.outstanding += 1;
    self.stats.fields_submitted += 1;

    self.dispatch.spawn(move || {
      let start = Instant::now();
      let result = run_guarded(|| generator.synthesize_field(token.tile)).map(Arc::new);
      queue.push(Completion::Field {
        id,
        token,
        elapsed_us: start.elapsed().as_micros() as u64,
        result,
      });
    });

    id
  }

  /// Queue triangulation of `field` at LOD value `lod`, for slot `lod_index`.
  pub fn submit_mesh_request(
    &mut self,
    field: Arc<FieldData>,
    lod_index: usize,
    lod: u32,
    token: RequestToken,
  ) -> RequestId {
    let id = RequestId::next();
    let generator = Arc::clone(&self.generator);
    let queue = Arc::clone(&self.queue);

    self.outstanding += 1;
    self.stats.meshes_submitted += 1;

    self.dispatch.spawn(move || {
      let start = Instant::now();
      let result = run_guarded(|| generator.triangulate(&field.heights, lod)).map(Arc::new);
      queue.push(Completion::Mesh {
        id,
        token,
        lod_index,
        elapsed_us: start.elapsed().as_micros() as u64,
        result,
      });
    });

    id
  }

  /// Take every completion that has arrived, in arrival order. Never blocks
  /// beyond the queue swap; an empty queue yields an empty batch.
  #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "pipeline::drain"))]
  pub fn drain(&mut self) -> Vec<Completion> {
    let batch = self.queue.take_all();
    if batch.is_empty() {
      return batch;
    }

    self.outstanding = self.outstanding.saturating_sub(batch.len());
    self.stats.completions_drained += batch.len() as u64;
    self.stats.failures += batch.iter().filter(|c| c.is_err()).count() as u64;

    log::trace!("drained {} completions, {} outstanding", batch.len(), self.outstanding);
    batch
  }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
