//! PresentationSink - callback interface for whatever displays the chunks.
//!
//! The streaming core calls these from the owning thread only, during
//! [`ChunkManager::tick`](crate::ChunkManager::tick). Implementations attach
//! meshes to a scene graph, upload textures, build colliders, and so on.

use std::sync::Arc;

use crate::types::{Mesh, Texture, TileCoord};

/// Callback interface for renderers and engine bridges.
///
/// # Example
///
/// ```ignore
/// struct SceneSink {
///     scene: Scene,
/// }
///
/// impl PresentationSink for SceneSink {
///     fn on_mesh_ready(&mut self, tile: TileCoord, lod: u32, mesh: Arc<Mesh>) {
///         self.scene.node(tile).set_mesh(upload(&mesh));
///     }
///     // ...
/// }
/// ```
pub trait PresentationSink {
  /// A mesh became the displayed mesh of `tile`. `lod` is the LOD value the
  /// mesh was built with.
  fn on_mesh_ready(&mut self, tile: TileCoord, lod: u32, mesh: Arc<Mesh>);

  /// The tile's colour texture was baked.
  fn on_texture_ready(&mut self, tile: TileCoord, texture: Arc<Texture>);

  fn on_visibility_changed(&mut self, tile: TileCoord, visible: bool);

  /// Collision geometry for `tile`. Sent at most once per chunk.
  fn on_collision_mesh_ready(&mut self, tile: TileCoord, mesh: Arc<Mesh>);

  /// The chunk was evicted; drop everything held for it.
  fn on_chunk_removed(&mut self, _tile: TileCoord) {}
}

/// No-op implementation for headless operation.
pub struct NullPresentation;

impl PresentationSink for NullPresentation {
  fn on_mesh_ready(&mut self, _tile: TileCoord, _lod: u32, _mesh: Arc<Mesh>) {}

  fn on_texture_ready(&mut self, _tile: TileCoord, _texture: Arc<Texture>) {}

  fn on_visibility_changed(&mut self, _tile: TileCoord, _visible: bool) {}

  fn on_collision_mesh_ready(&mut self, _tile: TileCoord, _mesh: Arc<Mesh>) {}
}

/// One recorded sink call.
#[derive(Clone, Debug)]
pub enum PresentationEvent {
  MeshReady { tile: TileCoord, lod: u32, mesh: Arc<Mesh> },
  TextureReady { tile: TileCoord, texture: Arc<Texture> },
  VisibilityChanged { tile: TileCoord, visible: bool },
  CollisionMeshReady { tile: TileCoord, mesh: Arc<Mesh> },
  ChunkRemoved { tile: TileCoord },
}

impl PresentationEvent {
  pub fn tile(&self) -> TileCoord {
    match self {
      PresentationEvent::MeshReady { tile, .. }
      | PresentationEvent::TextureReady { tile, .. }
      | PresentationEvent::VisibilityChanged { tile, .. }
      | PresentationEvent::CollisionMeshReady { tile, .. }
      | PresentationEvent::ChunkRemoved { tile } => *tile,
    }
  }
}

/// Records every call, in order. Used by tests and the simulator.
#[derive(Default, Debug)]
pub struct RecordingPresentation {
  pub events: Vec<PresentationEvent>,
}

impl RecordingPresentation {
  pub fn new() -> Self {
    Self::default()
  }

  /// Remove and return everything recorded so far.
  pub fn take(&mut self) -> Vec<PresentationEvent> {
    std::mem::take(&mut self.events)
  }

  /// LOD values of the meshes displayed for `tile`, in order.
  pub fn meshes_for(&self, tile: TileCoord) -> Vec<u32> {
    self
      .events
      .iter()
      .filter_map(|event| match event {
        PresentationEvent::MeshReady { tile: t, lod, .. } if *t == tile => Some(*lod),
        _ => None,
      })
      .collect()
  }

  /// Latest visibility reported for `tile`, if any.
  pub fn visibility_of(&self, tile: TileCoord) -> Option<bool> {
    self.events.iter().rev().find_map(|event| match event {
      PresentationEvent::VisibilityChanged { tile: t, visible } if *t == tile => Some(*visible),
      _ => None,
    })
  }

  pub fn count(&self, predicate: impl Fn(&PresentationEvent) -> bool) -> usize {
    self.events.iter().filter(|event| predicate(event)).count()
  }
}

impl PresentationSink for RecordingPresentation {
  fn on_mesh_ready(&mut self, tile: TileCoord, lod: u32, mesh: Arc<Mesh>) {
    self.events.push(PresentationEvent::MeshReady { tile, lod, mesh });
  }

  fn on_texture_ready(&mut self, tile: TileCoord, texture: Arc<Texture>) {
    self.events.push(PresentationEvent::TextureReady { tile, texture });
  }

  fn on_visibility_changed(&mut self, tile: TileCoord, visible: bool) {
    self.events.push(PresentationEvent::VisibilityChanged { tile, visible });
  }

  fn on_collision_mesh_ready(&mut self, tile: TileCoord, mesh: Arc<Mesh>) {
    self.events.push(PresentationEvent::CollisionMeshReady { tile, mesh });
  }

  fn on_chunk_removed(&mut self, tile: TileCoord) {
    self.events.push(PresentationEvent::ChunkRemoved { tile });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_recording_keeps_order_and_queries() {
    let mut sink = RecordingPresentation::new();
    let tile = TileCoord::new(1, 1);
    let mesh = Arc::new(Mesh::default());

    sink.on_visibility_changed(tile, true);
    sink.on_mesh_ready(tile, 0, Arc::clone(&mesh));
    sink.on_mesh_ready(TileCoord::new(0, 0), 2, Arc::clone(&mesh));
    sink.on_mesh_ready(tile, 2, mesh);
    sink.on_visibility_changed(tile, false);

    assert_eq!(sink.meshes_for(tile), vec![0, 2]);
    assert_eq!(sink.visibility_of(tile), Some(false));
    assert_eq!(sink.visibility_of(TileCoord::new(5, 5)), None);
    assert_eq!(sink.count(|e| e.tile() == tile), 4);

    assert_eq!(sink.take().len(), 5);
    assert!(sink.events.is_empty());
  }

  #[test]
  fn test_default_removal_is_noop() {
    let mut sink = NullPresentation;
    sink.on_chunk_removed(TileCoord::new(0, 0));
  }
}
