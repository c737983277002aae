//! Completion queue: the only structure shared between workers and the
//! owning thread.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::types::Completion;

/// Mutex-guarded FIFO of finished requests.
///
/// Workers [`push`](Self::push); the owning thread swaps the whole buffer out
/// with [`take_all`](Self::take_all). The lock is held only for the push or
/// the swap, never while generating or handling a completion.
#[derive(Default)]
pub struct CompletionQueue {
  inner: Mutex<Vec<Completion>>,
}

impl CompletionQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, completion: Completion) {
    self.lock().push(completion);
  }

  /// Remove and return everything queued, in arrival order.
  pub fn take_all(&self) -> Vec<Completion> {
    mem::take(&mut *self.lock())
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  // A panicking pusher cannot leave the Vec half-written, so poison is safe
  // to ignore.
  fn lock(&self) -> MutexGuard<'_, Vec<Completion>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
