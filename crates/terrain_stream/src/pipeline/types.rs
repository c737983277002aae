//! Pipeline request and completion types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::GenerationError;
use crate::generation::FieldData;
use crate::types::{Mesh, TileCoord};

// =============================================================================
// Request identity
// =============================================================================

/// Handle of one submitted request. Unique for the process lifetime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
  pub(crate) fn next() -> Self {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    Self(COUNTER.fetch_add(1, Ordering::Relaxed))
  }

  pub fn raw(&self) -> u64 {
    self.0
  }
}

impl fmt::Debug for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Req#{}", self.0)
  }
}

/// Epoch counter for detecting stale work.
///
/// Every chunk instance gets a fresh epoch. A completion whose token epoch
/// does not match the live chunk at that tile belongs to an evicted chunk
/// and is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Epoch(pub u64);

impl Epoch {
  /// Create a new epoch starting at 0.
  pub fn new() -> Self {
    Self(0)
  }

  /// Advance to the next epoch.
  pub fn increment(&mut self) {
    self.0 += 1;
  }
}

/// Who a request is for: a tile, as it existed at `epoch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestToken {
  pub tile: TileCoord,
  pub epoch: Epoch,
}

impl RequestToken {
  pub fn new(tile: TileCoord, epoch: Epoch) -> Self {
    Self { tile, epoch }
  }
}

// =============================================================================
// Completions
// =============================================================================

/// Result of one request, deposited by a worker and consumed exactly once by
/// a drain on the owning thread.
#[derive(Debug)]
pub enum Completion {
  Field {
    id: RequestId,
    token: RequestToken,
    /// Time spent in the generation function.
    elapsed_us: u64,
    result: Result<Arc<FieldData>, GenerationError>,
  },
  Mesh {
    id: RequestId,
    token: RequestToken,
    /// LOD slot index (position in the configured level list).
    lod_index: usize,
    elapsed_us: u64,
    result: Result<Arc<Mesh>, GenerationError>,
  },
}

impl Completion {
  pub fn id(&self) -> RequestId {
    match self {
      Completion::Field { id, .. } | Completion::Mesh { id, .. } => *id,
    }
  }

  pub fn token(&self) -> RequestToken {
    match self {
      Completion::Field { token, .. } | Completion::Mesh { token, .. } => *token,
    }
  }

  pub fn elapsed_us(&self) -> u64 {
    match self {
      Completion::Field { elapsed_us, .. } | Completion::Mesh { elapsed_us, .. } => *elapsed_us,
    }
  }

  pub fn is_err(&self) -> bool {
    match self {
      Completion::Field { result, .. } => result.is_err(),
      Completion::Mesh { result, .. } => result.is_err(),
    }
  }
}

/// Running totals kept by the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
  pub fields_submitted: u64,
  pub meshes_submitted: u64,
  pub completions_drained: u64,
  pub failures: u64,
}
