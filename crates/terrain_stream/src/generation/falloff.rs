//! Island falloff mask: zero in the middle, rising to one at the border.

use crate::types::HeightField;

const STEEPNESS: f32 = 3.0;
const SHIFT: f32 = 2.2;

/// Build a `size × size` falloff mask.
pub fn falloff_mask(size: usize) -> HeightField {
  let mut mask = HeightField::filled(size, 0.0);
  let denom = size.saturating_sub(1).max(1) as f32;

  for y in 0..size {
    for x in 0..size {
      let u = x as f32 / denom * 2.0 - 1.0;
      let v = y as f32 / denom * 2.0 - 1.0;
      mask.set(x, y, evaluate(u.abs().max(v.abs())));
    }
  }

  mask
}

/// Subtract `mask` from `heights`, clamping to `[0, 1]`. Sizes must match.
pub fn apply_falloff(heights: &mut HeightField, mask: &HeightField) {
  debug_assert_eq!(heights.side(), mask.side());
  for (h, m) in heights.as_mut_slice().iter_mut().zip(mask.as_slice()) {
    *h = (*h - m).clamp(0.0, 1.0);
  }
}

#[inline]
fn evaluate(value: f32) -> f32 {
  let a = value.powf(STEEPNESS);
  let b = (SHIFT - SHIFT * value).powf(STEEPNESS);
  a / (a + b)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_center_is_zero_and_border_is_one() {
    let mask = falloff_mask(9);
    assert_eq!(*mask.get(4, 4), 0.0);
    assert_eq!(*mask.get(0, 4), 1.0);
    assert_eq!(*mask.get(8, 8), 1.0);
  }

  #[test]
  fn test_monotonic_towards_edge() {
    let mask = falloff_mask(21);
    let row: Vec<f32> = (10..21).map(|x| *mask.get(x, 10)).collect();
    assert!(row.windows(2).all(|w| w[0] <= w[1]), "{row:?}");
  }

  #[test]
  fn test_apply_clamps() {
    let mut heights = HeightField::filled(9, 0.5);
    apply_falloff(&mut heights, &falloff_mask(9));

    assert_eq!(*heights.get(4, 4), 0.5);
    assert_eq!(*heights.get(0, 0), 0.0);
  }
}
