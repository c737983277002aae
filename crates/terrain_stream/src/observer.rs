//! Lock-free observer position cell.
//!
//! Single writer (whoever drives the tick), any number of readers. Both
//! coordinates are packed into one `AtomicU64`, so a reader never sees x from
//! one update and y from another.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

#[derive(Debug, Default)]
pub struct ObserverCell(AtomicU64);

impl ObserverCell {
  pub fn new(position: Vec2) -> Self {
    Self(AtomicU64::new(pack(position)))
  }

  #[inline]
  pub fn store(&self, position: Vec2) {
    self.0.store(pack(position), Ordering::Release);
  }

  #[inline]
  pub fn load(&self) -> Vec2 {
    unpack(self.0.load(Ordering::Acquire))
  }
}

#[inline]
fn pack(position: Vec2) -> u64 {
  ((position.x.to_bits() as u64) << 32) | position.y.to_bits() as u64
}

#[inline]
fn unpack(bits: u64) -> Vec2 {
  Vec2::new(f32::from_bits((bits >> 32) as u32), f32::from_bits(bits as u32))
}
