//! Decoration scattering (trees and rocks) over a height field.
//!
//! Sites sit on a regular lattice inside the tile. Each tile draws from its
//! own RNG seeded from `(seed, tile)`, so a tile always gets the same
//! layout no matter when or on which thread it is generated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DecorationSettings;
use crate::types::{HeightField, TileCoord};

/// Rolls below this place nothing.
const EMPTY_CHANCE: f32 = 0.75;

/// Number of rock variants.
pub const ROCK_VARIANTS: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorationKind {
  Tree,
  Rock(u8),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecorationSite {
  /// Interior sample coordinate `[x, z]`.
  pub sample: [usize; 2],
  /// Normalized height at the site.
  pub height: f32,
  pub kind: DecorationKind,
}

/// Scatter decorations over the interior of a bordered height field.
pub fn scatter(tile: TileCoord, heights: &HeightField, settings: &DecorationSettings, seed: i32) -> Vec<DecorationSite> {
  if !settings.enabled || settings.spacing == 0 {
    return Vec::new();
  }

  let samples = heights.side().saturating_sub(2);
  let end = samples.saturating_sub(settings.margin);
  let mut rng = StdRng::seed_from_u64(tile_seed(seed, tile));
  let mut sites = Vec::new();

  for z in (settings.margin..end).step_by(settings.spacing) {
    for x in (settings.margin..end).step_by(settings.spacing) {
      let height = *heights.get(x + 1, z + 1);
      let roll: f32 = rng.random();
      let variant = rng.random_range(0..ROCK_VARIANTS);

      if let Some(kind) = classify(roll, height, variant) {
        sites.push(DecorationSite {
          sample: [x, z],
          height,
          kind,
        });
      }
    }
  }

  sites
}

/// Tree chance shrinks with altitude; everything above it is rock.
fn classify(roll: f32, height: f32, variant: u8) -> Option<DecorationKind> {
  let tree_chance = 0.2 * (1.3 - height);
  if roll < EMPTY_CHANCE {
    None
  } else if roll < EMPTY_CHANCE + tree_chance {
    Some(DecorationKind::Tree)
  } else {
    Some(DecorationKind::Rock(variant))
  }
}

fn tile_seed(seed: i32, tile: TileCoord) -> u64 {
  const K: u64 = 0x9E37_79B9_7F4A_7C15;
  let mut h = (seed as u32 as u64).wrapping_mul(K);
  h = (h ^ tile.x() as u32 as u64).wrapping_mul(K);
  h ^= h >> 32;
  h = (h ^ tile.y() as u32 as u64).wrapping_mul(K);
  h ^ (h >> 29)
}
