//! Data pipeline
//!
//! ```text
//! ┌───────────────┐ submit  ┌─────────────────┐ push  ┌─────────────────┐ drain ┌──────────────┐
//! │ ChunkManager  ├────────►│ worker/Dispatch ├──────►│ CompletionQueue ├──────►│ ChunkManager │
//! └───────────────┘         └─────────────────┘       └─────────────────┘       └──────────────┘
//!   owning thread            TerrainGenerator           Mutex<Vec<_>>            owning thread
//! ```
//!
//! Two request kinds: field (tile → heights, colours, decorations) and mesh
//! (field + LOD → mesh). Arrival order across requests is unordered; within
//! a drain, completions are handed out in arrival order.

pub mod data_pipeline;
pub mod queue;
pub mod types;

pub use data_pipeline::DataPipeline;
pub use queue::CompletionQueue;
pub use types::{Completion, Epoch, PipelineStats, RequestId, RequestToken};
