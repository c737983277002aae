//! Distance → LOD band selection.

use crate::config::LodLevel;

/// Index of the first level whose threshold is at least `distance`; the
/// last (coarsest) level when `distance` exceeds them all. A distance equal
/// to a threshold stays in the finer band.
///
/// `levels` must be non-empty with increasing thresholds.
#[inline]
pub fn select_lod(levels: &[LodLevel], distance: f32) -> usize {
  levels
    .iter()
    .position(|level| distance <= level.visible_distance_threshold)
    .unwrap_or(levels.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn levels() -> Vec<LodLevel> {
    vec![
      LodLevel::new(0, 10.0).with_collision(),
      LodLevel::new(1, 20.0),
      LodLevel::new(2, 40.0),
    ]
  }

  #[test]
  fn test_bands() {
    let levels = levels();
    assert_eq!(select_lod(&levels, 0.0), 0);
    assert_eq!(select_lod(&levels, 9.99), 0);
    assert_eq!(select_lod(&levels, 10.5), 1);
    assert_eq!(select_lod(&levels, 39.0), 2);
  }

  #[test]
  fn test_boundary_prefers_finer() {
    let levels = levels();
    assert_eq!(select_lod(&levels, 10.0), 0);
    assert_eq!(select_lod(&levels, 20.0), 1);
  }

  #[test]
  fn test_beyond_all_thresholds_is_coarsest() {
    assert_eq!(select_lod(&levels(), 1000.0), 2);
  }

  #[test]
  fn test_monotonic_in_distance() {
    let levels = levels();
    let mut previous = 0;
    for step in 0..600 {
      let selected = select_lod(&levels, step as f32 * 0.1);
      assert!(selected >= previous, "distance {}", step as f32 * 0.1);
      previous = selected;
    }
  }
}
