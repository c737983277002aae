//! Headless terrain streaming driver.
//!
//! Walks an observer across the world for a fixed number of ticks, streaming
//! chunks around it through a [`ChunkManager`], then prints what the
//! presentation side would have received.
//!
//! ```text
//! RUST_LOG=terrain_stream=debug terrain_sim --ticks 400 --speed 12 --path circle
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use glam::Vec2;
use terrain_stream::{
	ChunkManager, Dispatch, Mesh, NoiseTerrain, PresentationSink, StreamConfig, Texture, TickReport, TileCoord,
};
use web_time::Instant;

/// Headless terrain streaming driver.
#[derive(Parser, Debug)]
#[command(name = "terrain_sim")]
#[command(about = "Streams noise terrain around a moving observer and reports what was produced")]
struct Args {
	/// Path to a configuration TOML file (defaults are used when omitted).
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Number of ticks to run.
	#[arg(short, long, default_value_t = 600)]
	ticks: u32,

	/// Observer displacement per tick in world units.
	#[arg(short, long, default_value_t = 8.0)]
	speed: f32,

	/// Observer path.
	#[arg(short, long, value_enum, default_value_t = PathKind::Line)]
	path: PathKind,

	/// Override the configured dispatch mode.
	#[arg(short, long, value_enum)]
	dispatch: Option<DispatchArg>,

	/// Override the configured noise seed.
	#[arg(long)]
	seed: Option<i32>,

	/// Wall-clock pause between ticks in milliseconds.
	#[arg(long, default_value_t = 0)]
	tick_ms: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PathKind {
	/// Straight line along +x.
	Line,
	/// Circle around the origin.
	Circle,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DispatchArg {
	Pool,
	Thread,
	Inline,
}

impl From<DispatchArg> for Dispatch {
	fn from(arg: DispatchArg) -> Self {
		match arg {
			DispatchArg::Pool => Dispatch::Pool,
			DispatchArg::Thread => Dispatch::ThreadPerRequest,
			DispatchArg::Inline => Dispatch::Inline,
		}
	}
}

/// Tallies everything the manager hands to presentation.
#[derive(Default)]
struct CountingSink {
	meshes_per_lod: BTreeMap<u32, usize>,
	vertices: usize,
	textures: usize,
	shown: usize,
	hidden: usize,
	collisions: usize,
	removed: usize,
}

impl PresentationSink for CountingSink {
	fn on_mesh_ready(&mut self, _tile: TileCoord, lod: u32, mesh: Arc<Mesh>) {
		*self.meshes_per_lod.entry(lod).or_default() += 1;
		self.vertices += mesh.vertex_count();
	}

	fn on_texture_ready(&mut self, _tile: TileCoord, _texture: Arc<Texture>) {
		self.textures += 1;
	}

	fn on_visibility_changed(&mut self, _tile: TileCoord, visible: bool) {
		if visible {
			self.shown += 1;
		} else {
			self.hidden += 1;
		}
	}

	fn on_collision_mesh_ready(&mut self, _tile: TileCoord, _mesh: Arc<Mesh>) {
		self.collisions += 1;
	}

	fn on_chunk_removed(&mut self, _tile: TileCoord) {
		self.removed += 1;
	}
}

fn observer_at(path: PathKind, tick: u32, speed: f32) -> Vec2 {
	let travelled = tick as f32 * speed;
	match path {
		PathKind::Line => Vec2::new(travelled, 0.0),
		PathKind::Circle => {
			const RADIUS: f32 = 500.0;
			let angle = travelled / RADIUS;
			Vec2::new(angle.cos(), angle.sin()) * RADIUS
		}
	}
}

fn main() -> Result<()> {
	env_logger::init();
	let args = Args::parse();

	let mut config = match &args.config {
		Some(path) => {
			StreamConfig::load(path).with_context(|| format!("Failed to load config: {}", path.display()))?
		}
		None => StreamConfig::default(),
	};
	if let Some(dispatch) = args.dispatch {
		config.dispatch = dispatch.into();
	}
	if let Some(seed) = args.seed {
		config.noise.seed = seed;
	}

	let mut manager: ChunkManager<NoiseTerrain, CountingSink> =
		ChunkManager::with_noise_terrain(config, CountingSink::default()).context("Invalid configuration")?;

	let started = Instant::now();
	let mut totals = TickReport::default();
	let mut updates = 0u32;

	for tick in 0..args.ticks {
		let report = manager.tick(observer_at(args.path, tick, args.speed));
		if report.updated {
			updates += 1;
			log::debug!(
				"tick {tick}: created {}, refreshed {}, evicted {}, visible {}",
				report.created,
				report.refreshed,
				report.evicted,
				report.visible
			);
		}
		totals.completions += report.completions;
		totals.stale += report.stale;
		totals.created += report.created;
		totals.evicted += report.evicted;

		if args.tick_ms > 0 {
			std::thread::sleep(Duration::from_millis(args.tick_ms));
		}
	}

	// Let in-flight work land so the summary reflects a settled world.
	let last = observer_at(args.path, args.ticks, args.speed);
	while !manager.is_idle() {
		let report = manager.tick(last);
		totals.completions += report.completions;
		totals.stale += report.stale;
		std::thread::sleep(Duration::from_millis(1));
	}

	let elapsed = started.elapsed();
	let stats = manager.pipeline_stats();
	let sink = manager.sink();

	println!("Ran {} ticks in {:.2?} ({} window updates)", args.ticks, elapsed, updates);
	println!(
		"Chunks: {} live, {} visible, {} created, {} evicted",
		manager.chunk_count(),
		manager.visible_tiles().len(),
		totals.created,
		totals.evicted
	);
	println!(
		"Requests: {} fields, {} meshes, {} failures, {} stale completions",
		stats.fields_submitted, stats.meshes_submitted, stats.failures, totals.stale
	);
	for (lod, count) in &sink.meshes_per_lod {
		println!("  LOD {lod}: {count} meshes");
	}
	println!(
		"Presentation: {} textures, {} vertices, {} shown, {} hidden, {} collision meshes, {} removed",
		sink.textures, sink.vertices, sink.shown, sink.hidden, sink.collisions, sink.removed
	);

	let metrics = manager.metrics();
	if metrics.total_fields_generated > 0 {
		println!(
			"Timings: field {:.0}us, mesh {:.0}us, tick {:.0}us (avg)",
			metrics.avg_field_timing_us(),
			metrics.avg_mesh_timing_us(),
			metrics.avg_tick_timing_us()
		);
		if let Some((min, max)) = metrics.tick_timings.min_max() {
			println!("Tick range: {min}us .. {max}us");
		}
	}

	Ok(())
}
