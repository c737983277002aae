//! Core data types shared by the generation functions, the pipeline and the
//! chunk state machine.

use std::fmt;

use glam::{IVec2, Vec2};
use serde::Deserialize;

// =============================================================================
// TileCoord
// =============================================================================

/// Integer tile coordinate in the world grid. Key of the chunk map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileCoord(pub IVec2);

impl TileCoord {
  pub const fn new(x: i32, y: i32) -> Self {
    Self(IVec2::new(x, y))
  }

  #[inline]
  pub fn x(&self) -> i32 {
    self.0.x
  }

  #[inline]
  pub fn y(&self) -> i32 {
    self.0.y
  }

  /// Tile containing `position`, rounding to the nearest tile center.
  #[inline]
  pub fn containing(position: Vec2, chunk_size: f32) -> Self {
    let scaled = position / chunk_size;
    Self::new(scaled.x.round() as i32, scaled.y.round() as i32)
  }

  /// World-space center of this tile.
  #[inline]
  pub fn center(&self, chunk_size: f32) -> Vec2 {
    self.0.as_vec2() * chunk_size
  }

  /// Offset by `(dx, dy)` tiles.
  #[inline]
  pub fn offset(&self, dx: i32, dy: i32) -> Self {
    Self(self.0 + IVec2::new(dx, dy))
  }
}

impl fmt::Debug for TileCoord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Tile({}, {})", self.0.x, self.0.y)
  }
}

impl From<(i32, i32)> for TileCoord {
  fn from((x, y): (i32, i32)) -> Self {
    Self::new(x, y)
  }
}

// =============================================================================
// Bounds
// =============================================================================

/// Square bounding area of a tile on the ground plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
  pub center: Vec2,
  pub half_extent: f32,
}

impl Bounds {
  pub fn for_tile(coord: TileCoord, chunk_size: f32) -> Self {
    Self {
      center: coord.center(chunk_size),
      half_extent: chunk_size * 0.5,
    }
  }

  #[inline]
  pub fn min(&self) -> Vec2 {
    self.center - Vec2::splat(self.half_extent)
  }

  #[inline]
  pub fn max(&self) -> Vec2 {
    self.center + Vec2::splat(self.half_extent)
  }

  /// Squared distance from `point` to the closest point of the area.
  /// Zero when the point is inside.
  #[inline]
  pub fn sqr_distance(&self, point: Vec2) -> f32 {
    let outside = ((point - self.center).abs() - Vec2::splat(self.half_extent)).max(Vec2::ZERO);
    outside.length_squared()
  }

  #[inline]
  pub fn distance(&self, point: Vec2) -> f32 {
    self.sqr_distance(point).sqrt()
  }
}

// =============================================================================
// Grid / fields
// =============================================================================

/// Dense square 2D array, row-major (`index = y * side + x`).
#[derive(Clone, PartialEq)]
pub struct Grid<T> {
  side: usize,
  values: Vec<T>,
}

impl<T: Clone> Grid<T> {
  /// Grid of `side × side` cells filled with `value`.
  pub fn filled(side: usize, value: T) -> Self {
    Self {
      side,
      values: vec![value; side * side],
    }
  }
}

impl<T> Grid<T> {
  /// Wrap an existing buffer. Returns `None` unless `values.len() == side²`.
  pub fn from_vec(side: usize, values: Vec<T>) -> Option<Self> {
    (values.len() == side * side).then_some(Self { side, values })
  }

  #[inline]
  pub fn side(&self) -> usize {
    self.side
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.values.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  #[inline]
  pub fn index(&self, x: usize, y: usize) -> usize {
    debug_assert!(x < self.side && y < self.side);
    y * self.side + x
  }

  #[inline]
  pub fn get(&self, x: usize, y: usize) -> &T {
    &self.values[self.index(x, y)]
  }

  #[inline]
  pub fn set(&mut self, x: usize, y: usize, value: T) {
    let idx = self.index(x, y);
    self.values[idx] = value;
  }

  pub fn as_slice(&self) -> &[T] {
    &self.values
  }

  pub fn as_mut_slice(&mut self) -> &mut [T] {
    &mut self.values
  }
}

impl<T> fmt::Debug for Grid<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Grid([{}²])", self.side)
  }
}

/// Normalized terrain heights, nominally in `[0, 1]`.
pub type HeightField = Grid<f32>;

/// Per-sample terrain colour.
pub type ColorField = Grid<Rgba>;

/// Linear RGBA colour with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
  pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);

  pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
    Self([r, g, b, 1.0])
  }

  /// Quantize to 8-bit channels.
  pub fn to_rgba8(self) -> [u8; 4] {
    self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
  }
}

// =============================================================================
// Mesh
// =============================================================================

/// Axis-aligned bounding box.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAABB {
  pub min: [f32; 3],
  pub max: [f32; 3],
}

impl MinMaxAABB {
  /// Create AABB with inverted extents (ready for encapsulation).
  pub fn empty() -> Self {
    Self {
      min: [f32::INFINITY; 3],
      max: [f32::NEG_INFINITY; 3],
    }
  }

  /// Expand AABB to include a point.
  #[inline]
  pub fn encapsulate(&mut self, point: [f32; 3]) {
    for i in 0..3 {
      self.min[i] = self.min[i].min(point[i]);
      self.max[i] = self.max[i].max(point[i]);
    }
  }

  /// Check if AABB is valid (min <= max on all axes).
  pub fn is_valid(&self) -> bool {
    self.min[0] <= self.max[0] && self.min[1] <= self.max[1] && self.min[2] <= self.max[2]
  }
}

impl Default for MinMaxAABB {
  fn default() -> Self {
    Self::empty()
  }
}

/// Triangulated terrain surface for one chunk at one LOD.
///
/// Positions are local to the tile center; `y` is up.
#[derive(Clone, Default)]
pub struct Mesh {
  pub positions: Vec<[f32; 3]>,
  pub normals: Vec<[f32; 3]>,
  pub uvs: Vec<[f32; 2]>,
  /// Triangle indices, 3 per triangle, wound so face normals point `+y`.
  pub indices: Vec<u32>,
  pub bounds: MinMaxAABB,
  /// LOD value this mesh was built with.
  pub lod: u32,
  pub flat_shaded: bool,
}

impl Mesh {
  pub fn vertex_count(&self) -> usize {
    self.positions.len()
  }

  pub fn triangle_count(&self) -> usize {
    self.indices.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }
}

impl fmt::Debug for Mesh {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Mesh")
      .field("lod", &self.lod)
      .field("vertex_count", &self.vertex_count())
      .field("triangle_count", &self.triangle_count())
      .field("flat_shaded", &self.flat_shaded)
      .finish()
  }
}

// =============================================================================
// Texture
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
  #[default]
  Point,
  Bilinear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
  #[default]
  Clamp,
  Repeat,
}

/// CPU-side RGBA8 texture baked from a colour field.
#[derive(Clone, PartialEq)]
pub struct Texture {
  pub width: usize,
  pub height: usize,
  pub pixels: Vec<[u8; 4]>,
  pub filter: FilterMode,
  pub wrap: WrapMode,
}

impl Texture {
  #[inline]
  pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
    self.pixels[y * self.width + x]
  }
}

impl fmt::Debug for Texture {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Texture({}x{})", self.width, self.height)
  }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
