//! Colour mapping and texture baking.

use crate::config::TerrainRegion;
use crate::error::GenerationError;
use crate::types::{ColorField, FilterMode, HeightField, Rgba, Texture, WrapMode};

/// Colour every sample by height band. `regions` are scanned in order; a
/// sample takes the colour of each region whose `height` it reaches and the
/// scan stops at the first region above it. Samples below every region are
/// black.
pub fn colorize(heights: &HeightField, regions: &[TerrainRegion]) -> ColorField {
  let mut colors = ColorField::filled(heights.side(), Rgba::BLACK);
  for (color, &h) in colors.as_mut_slice().iter_mut().zip(heights.as_slice()) {
    if let Some(region) = regions.iter().take_while(|region| h >= region.height).last() {
      *color = region.color;
    }
  }
  colors
}

/// Bake the centred `width × height` window of `colors` into an RGBA8
/// texture. With `width = height = chunk_size` this drops the border.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all, name = "generation::bake_texture"))]
pub fn bake_texture(colors: &ColorField, width: usize, height: usize) -> Result<Texture, GenerationError> {
  if width == 0 || height == 0 {
    return Err(GenerationError::InvalidParameters(format!(
      "texture must be at least 1x1, got {width}x{height}"
    )));
  }

  let side = colors.side();
  if width > side || height > side {
    return Err(GenerationError::FieldSizeMismatch {
      expected: width.max(height),
      actual: side,
    });
  }

  let (ox, oy) = ((side - width) / 2, (side - height) / 2);
  let mut pixels = Vec::with_capacity(width * height);
  for y in 0..height {
    for x in 0..width {
      pixels.push(colors.get(ox + x, oy + y).to_rgba8());
    }
  }

  Ok(Texture {
    width,
    height,
    pixels,
    filter: FilterMode::Point,
    wrap: WrapMode::Clamp,
  })
}
