//! Generation and streaming benchmarks.
//!
//! - **heights**: fractal Perlin synthesis of one bordered field
//! - **triangulate**: mesh build per LOD from the same field
//! - **field**: full `synthesize_field` (heights, colours, decorations)
//! - **stream**: chunk manager settling a fresh window with inline dispatch

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::Vec2;
use terrain_stream::{
  generation::{synthesize_heights, triangulate},
  ChunkManager, Dispatch, LodLevel, NoiseTerrain, NullPresentation, StreamConfig, TerrainGenerator, TileCoord,
};

// =============================================================================
// Generation
// =============================================================================

fn bench_heights(c: &mut Criterion) {
  let config = StreamConfig::default();
  let side = config.field_side();

  let mut group = c.benchmark_group("heights");
  group.throughput(Throughput::Elements((side * side) as u64));

  for octaves in [1u32, 4, 8] {
    let mut noise = config.noise.clone();
    noise.octaves = octaves;
    group.bench_with_input(BenchmarkId::new("octaves", octaves), &noise, |b, noise| {
      b.iter(|| {
        black_box(synthesize_heights(black_box(Vec2::ZERO), side, config.sample_spacing(), noise).unwrap())
      });
    });
  }

  group.finish();
}

fn bench_triangulate(c: &mut Criterion) {
  let config = StreamConfig::default();
  let heights = synthesize_heights(Vec2::ZERO, config.field_side(), config.sample_spacing(), &config.noise).unwrap();

  let mut group = c.benchmark_group("triangulate");
  for lod in [0u32, 1, 2, 4, 6] {
    group.bench_with_input(BenchmarkId::new("smooth", lod), &lod, |b, &lod| {
      b.iter(|| {
        black_box(
          triangulate(
            black_box(&heights),
            config.mesh.height_multiplier,
            &config.mesh.height_curve,
            lod,
            false,
          )
          .unwrap(),
        )
      });
    });
  }

  let flat = StreamConfig {
    flat_shading: true,
    ..StreamConfig::default()
  };
  let flat_heights = synthesize_heights(Vec2::ZERO, flat.field_side(), flat.sample_spacing(), &flat.noise).unwrap();
  group.bench_function("flat/0", |b| {
    b.iter(|| {
      black_box(
        triangulate(
          black_box(&flat_heights),
          flat.mesh.height_multiplier,
          &flat.mesh.height_curve,
          0,
          true,
        )
        .unwrap(),
      )
    });
  });

  group.finish();
}

fn bench_field(c: &mut Criterion) {
  let mut group = c.benchmark_group("field");

  for use_falloff in [false, true] {
    let terrain = NoiseTerrain::new(Arc::new(StreamConfig {
      use_falloff,
      ..StreamConfig::default()
    }));
    let name = if use_falloff { "falloff" } else { "plain" };
    group.bench_function(name, |b| {
      let mut x = 0;
      b.iter(|| {
        x += 1;
        black_box(terrain.synthesize_field(TileCoord::from((x, 0))).unwrap())
      });
    });
  }

  group.finish();
}

// =============================================================================
// Streaming
// =============================================================================

fn small_config(radius_tiles: f32) -> StreamConfig {
  StreamConfig {
    chunk_size_override: Some(48),
    lod_levels: vec![
      LodLevel::new(0, 48.0).with_collision(),
      LodLevel::new(1, 96.0),
      LodLevel::new(2, 48.0 * radius_tiles),
    ],
    dispatch: Dispatch::Inline,
    ..StreamConfig::default()
  }
}

fn bench_stream(c: &mut Criterion) {
  let mut group = c.benchmark_group("stream");
  group.sample_size(20);

  for radius in [3.0f32, 5.0] {
    group.bench_with_input(BenchmarkId::new("settle_window", radius as u32), &radius, |b, &radius| {
      b.iter(|| {
        let mut manager = ChunkManager::with_noise_terrain(small_config(radius), NullPresentation).unwrap();
        // Inline dispatch: one tick creates, the next applies fields and
        // submits meshes, the third applies meshes.
        for _ in 0..3 {
          manager.step();
        }
        black_box(manager.chunk_count())
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_heights, bench_triangulate, bench_field, bench_stream);
criterion_main!(benches);
