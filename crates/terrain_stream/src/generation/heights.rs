//! Fractal Perlin height synthesis.
//!
//! Each octave samples 2D Perlin noise at a per-octave offset drawn from an
//! RNG seeded with `seed`, so identical inputs produce bit-identical fields.
//! Sample positions are world-space, which keeps the shared edge samples of
//! neighbouring tiles equal.

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Perlin};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::config::NoiseSettings;
use crate::error::GenerationError;
use crate::types::HeightField;

/// Range of the random per-octave sampling offsets.
const OCTAVE_OFFSET_RANGE: f64 = 100_000.0;

/// Global normalization assumes noise rarely reaches this fraction of the
/// theoretical peak.
const GLOBAL_PEAK_DIVISOR: f32 = 1.75;

/// How raw fractal noise is mapped into `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeMode {
  /// Stretch this field's own min/max to `[0, 1]`. Neighbouring tiles do not
  /// line up; meant for single-map previews.
  Local,
  /// Divide by an estimate of the maximum possible height. Consistent across
  /// tiles.
  #[default]
  Global,
}

/// Synthesize a `side × side` height field centred on `origin`, with
/// `spacing` world units between samples.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generation::synthesize_heights"))]
pub fn synthesize_heights(
  origin: Vec2,
  side: usize,
  spacing: f32,
  settings: &NoiseSettings,
) -> Result<HeightField, GenerationError> {
  check_settings(settings)?;
  if side == 0 {
    return Err(GenerationError::InvalidParameters("field side must be non-zero".into()));
  }

  let mut rng = StdRng::seed_from_u64(settings.seed as u32 as u64);
  let perlin = Perlin::new(settings.seed as u32);
  let offset = Vec2::from(settings.offset).as_dvec2();

  let mut max_possible_height = 0.0f32;
  let mut amplitude = 1.0f32;
  let octave_offsets: Vec<DVec2> = (0..settings.octaves)
    .map(|_| {
      let x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
      let y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
      max_possible_height += amplitude;
      amplitude *= settings.persistence;
      DVec2::new(x, y) + offset
    })
    .collect();

  let half = (side - 1) as f32 * 0.5;
  let mut heights = HeightField::filled(side, 0.0);
  let mut min_height = f32::MAX;
  let mut max_height = f32::MIN;

  for y in 0..side {
    for x in 0..side {
      let world = origin + (Vec2::new(x as f32, y as f32) - Vec2::splat(half)) * spacing;
      let world = world.as_dvec2();

      let mut amplitude = 1.0f32;
      let mut frequency = 1.0f64;
      let mut height = 0.0f32;
      for octave_offset in &octave_offsets {
        let sample = (world + *octave_offset) / settings.scale as f64 * frequency;
        let value = perlin.get([sample.x, sample.y]) as f32;
        height += value * amplitude;
        amplitude *= settings.persistence;
        frequency *= settings.lacunarity as f64;
      }

      min_height = min_height.min(height);
      max_height = max_height.max(height);
      heights.set(x, y, height);
    }
  }

  match settings.normalize_mode {
    NormalizeMode::Local => {
      let range = max_height - min_height;
      for h in heights.as_mut_slice() {
        *h = if range > 0.0 { (*h - min_height) / range } else { 0.0 };
      }
    }
    NormalizeMode::Global => {
      let denominator = 2.0 * max_possible_height / GLOBAL_PEAK_DIVISOR;
      for h in heights.as_mut_slice() {
        *h = ((*h + 1.0) / denominator).clamp(0.0, 1.0);
      }
    }
  }

  Ok(heights)
}

fn check_settings(settings: &NoiseSettings) -> Result<(), GenerationError> {
  if !(settings.scale > 0.0 && settings.scale.is_finite()) {
    return Err(GenerationError::InvalidParameters(format!(
      "noise scale must be positive, got {}",
      settings.scale
    )));
  }
  if settings.octaves == 0 {
    return Err(GenerationError::InvalidParameters("at least one octave is required".into()));
  }
  if !settings.persistence.is_finite() || !settings.lacunarity.is_finite() {
    return Err(GenerationError::InvalidParameters(
      "persistence and lacunarity must be finite".into(),
    ));
  }
  Ok(())
}

#[cfg(test)]
#[path = "heights_test.rs"]
mod heights_test;
