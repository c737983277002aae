//! terrain_stream - Engine independent chunk streaming for tile terrain
//!
//! Streams an unbounded grid of terrain tiles around a moving observer. The
//! [`ChunkManager`] decides which tiles must exist, generates their data off
//! the critical path, picks a LOD per chunk by distance and hands finished
//! meshes to a [`PresentationSink`].
//!
//! # Features
//!
//! - **Async generation**: field and mesh requests run on rayon's pool, one
//!   thread per request, or inline ([`Dispatch`]); results come back through
//!   a single completion queue drained once per tick
//! - **Per-chunk LOD cache**: one mesh slot per LOD level, at most one request
//!   in flight per slot, ready meshes reused
//! - **Hysteresis**: the tile window is only recomputed after the observer
//!   moves past a threshold
//! - **Eviction**: optional retention radius with epoch-checked late
//!   completions
//! - **Noise terrain**: fractal Perlin heights, island falloff, colour
//!   regions, seeded decoration placement
//!
//! # Example
//!
//! ```ignore
//! use terrain_stream::{ChunkManager, NullPresentation, StreamConfig};
//!
//! let config = StreamConfig::load("terrain.toml")?;
//! let mut manager = ChunkManager::with_noise_terrain(config, NullPresentation)?;
//!
//! loop {
//!     let report = manager.tick(observer_position());
//!     if report.updated {
//!         println!("{} chunks visible", report.visible);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod types;

pub use config::{DecorationSettings, LodLevel, MeshSettings, NoiseSettings, StreamConfig, TerrainRegion};
pub use error::{ConfigError, GenerationError};
pub use types::{Bounds, ColorField, Grid, HeightField, Mesh, MinMaxAABB, Rgba, Texture, TileCoord};

// Pure generation functions and the generator seam
pub mod generation;
pub use generation::{FieldData, NoiseTerrain, TerrainGenerator};

// Background dispatch
pub mod threading;
pub use threading::Dispatch;

// Request submission and completion queue
pub mod pipeline;
pub use pipeline::{Completion, DataPipeline, RequestId};

// Per-tile state machine
pub mod chunk;
pub use chunk::{Chunk, ChunkState, MeshSlot};

pub mod observer;
pub use observer::ObserverCell;

pub mod manager;
pub use manager::{ChunkManager, TickReport};

pub mod presentation;
pub use presentation::{NullPresentation, PresentationEvent, PresentationSink, RecordingPresentation};

pub mod metrics;

#[cfg(test)]
pub(crate) mod test_utils;
