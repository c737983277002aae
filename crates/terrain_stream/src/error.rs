//! Error taxonomy.
//!
//! `ConfigError` is fatal at startup. `GenerationError` travels through the
//! completion queue and only ever reverts the affected slot.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid streaming configuration. Reported before any chunk exists.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("at least one LOD level is required")]
  EmptyLodLevels,

  #[error(
    "LOD thresholds must be strictly increasing: level {index} has {current}, previous level has {previous}"
  )]
  NonIncreasingThresholds {
    index: usize,
    previous: f32,
    current: f32,
  },

  #[error("exactly one LOD level must be used for collision, found none")]
  MissingCollisionLod,

  #[error("exactly one LOD level must be used for collision, found {count}")]
  MultipleCollisionLods { count: usize },

  #[error("LOD {lod} skips too many samples for chunk size {chunk_size}")]
  LodTooCoarse { lod: u32, chunk_size: u32 },

  #[error("chunk size must be at least 2, got {0}")]
  InvalidChunkSize(u32),

  #[error("view distance must be positive and finite, got {0}")]
  InvalidViewDistance(f32),

  #[error("retention distance {retention} is smaller than view distance {view}")]
  InvalidRetention { retention: f32, view: f32 },

  #[error("viewer move threshold must be non-negative and finite, got {0}")]
  InvalidMoveThreshold(f32),

  #[error("invalid noise settings: {0}")]
  InvalidNoise(String),

  #[error("failed to read config {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] toml::de::Error),
}

/// A generation function failed for a particular input.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
  #[error("invalid generation parameters: {0}")]
  InvalidParameters(String),

  #[error("height field is {actual} samples wide, expected {expected}")]
  FieldSizeMismatch { expected: usize, actual: usize },

  #[error("LOD {lod} is too coarse for a {samples}-sample chunk edge")]
  LodTooCoarse { lod: u32, samples: usize },

  #[error("generation worker panicked: {0}")]
  WorkerPanicked(String),
}
