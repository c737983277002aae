//! Piecewise-linear remapping curve applied to normalized heights before
//! they are scaled into mesh space.

use serde::Deserialize;

/// Sorted `(input, output)` keyframes. Inputs outside the key range clamp to
/// the first/last key. An empty curve is the identity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "Vec<[f32; 2]>")]
pub struct HeightCurve {
  keys: Vec<[f32; 2]>,
}

impl HeightCurve {
  pub fn new(mut keys: Vec<[f32; 2]>) -> Self {
    keys.sort_by(|a, b| a[0].total_cmp(&b[0]));
    Self { keys }
  }

  /// Identity over `[0, 1]`.
  pub fn linear() -> Self {
    Self::new(vec![[0.0, 0.0], [1.0, 1.0]])
  }

  pub fn keys(&self) -> &[[f32; 2]] {
    &self.keys
  }

  pub fn evaluate(&self, t: f32) -> f32 {
    let (first, last) = match (self.keys.first(), self.keys.last()) {
      (Some(first), Some(last)) => (first, last),
      _ => return t,
    };

    // NaN compares false against every key; treat it as below the range.
    if t.is_nan() || t <= first[0] {
      return first[1];
    }
    if t >= last[0] {
      return last[1];
    }

    // First key strictly after t; t > first[0] so idx >= 1.
    let idx = self.keys.partition_point(|k| k[0] <= t);
    let [t0, v0] = self.keys[idx - 1];
    let [t1, v1] = self.keys[idx];
    if t1 <= t0 {
      return v1;
    }
    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
  }
}

impl Default for HeightCurve {
  fn default() -> Self {
    Self::linear()
  }
}

impl From<Vec<[f32; 2]>> for HeightCurve {
  fn from(keys: Vec<[f32; 2]>) -> Self {
    Self::new(keys)
  }
}
