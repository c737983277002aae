//! Background execution for generation work.
//!
//! [`Dispatch`] picks where a job runs:
//! - `Pool`: rayon's global thread pool (`rayon::spawn`). Bounded by core count.
//! - `ThreadPerRequest`: a fresh OS thread per job, no reuse, no limit.
//! - `Inline`: on the submitting thread, before `spawn` returns.
//!
//! Jobs are fire-and-forget; results travel back through the completion queue,
//! never through the dispatcher.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;

use crate::error::GenerationError;

/// Where generation jobs run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dispatch {
  /// One dedicated thread per request.
  ThreadPerRequest,
  /// rayon's global pool.
  #[default]
  Pool,
  /// Synchronously on the caller. Results still arrive through the queue.
  Inline,
}

impl Dispatch {
  /// Run `job` according to this dispatch mode (non-blocking except `Inline`).
  pub fn spawn<F>(self, job: F)
  where
    F: FnOnce() + Send + 'static,
  {
    match self {
      Dispatch::Pool => rayon::spawn(job),
      Dispatch::ThreadPerRequest => {
        std::thread::spawn(job);
      }
      Dispatch::Inline => job(),
    }
  }

  /// Number of threads jobs may run on concurrently (`None` = unbounded).
  pub fn concurrency(self) -> Option<usize> {
    match self {
      Dispatch::Pool => Some(rayon::current_num_threads()),
      Dispatch::ThreadPerRequest => None,
      Dispatch::Inline => Some(1),
    }
  }
}

/// Run generation work, turning a panic into [`GenerationError::WorkerPanicked`]
/// so nothing unwinds across the thread boundary.
pub fn run_guarded<T, F>(work: F) -> Result<T, GenerationError>
where
  F: FnOnce() -> Result<T, GenerationError>,
{
  match panic::catch_unwind(AssertUnwindSafe(work)) {
    Ok(result) => result,
    Err(payload) => Err(GenerationError::WorkerPanicked(panic_message(payload.as_ref()))),
  }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&'static str>() {
    (*message).to_owned()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "unknown panic payload".to_owned()
  }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;

  fn wait_for(results: &Arc<Mutex<Vec<i32>>>, count: usize) -> Vec<i32> {
    for _ in 0..2000 {
      {
        let guard = results.lock().unwrap();
        if guard.len() >= count {
          return guard.clone();
        }
      }
      std::thread::sleep(std::time::Duration::from_millis(1));
    }
    results.lock().unwrap().clone()
  }

  #[test]
  fn test_inline_runs_before_returning() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);

    Dispatch::Inline.spawn(move || sink.lock().unwrap().push(7));

    assert_eq!(*results.lock().unwrap(), vec![7]);
  }

  #[test]
  fn test_pool_and_thread_modes_complete() {
    for dispatch in [Dispatch::Pool, Dispatch::ThreadPerRequest] {
      let results = Arc::new(Mutex::new(Vec::new()));

      for i in 0..10 {
        let sink = Arc::clone(&results);
        dispatch.spawn(move || sink.lock().unwrap().push(i * 2));
      }

      let mut collected = wait_for(&results, 10);
      collected.sort();
      assert_eq!(collected, vec![0, 2, 4, 6, 8, 10, 12, 14, 16, 18], "{dispatch:?}");
    }
  }

  #[test]
  fn test_concurrency() {
    assert!(Dispatch::Pool.concurrency().unwrap() >= 1);
    assert_eq!(Dispatch::ThreadPerRequest.concurrency(), None);
    assert_eq!(Dispatch::Inline.concurrency(), Some(1));
  }

  #[test]
  fn test_run_guarded_passes_results_through() {
    assert_eq!(run_guarded(|| Ok(5)), Ok(5));

    let err: Result<(), _> = run_guarded(|| Err(GenerationError::InvalidParameters("x".into())));
    assert_eq!(err, Err(GenerationError::InvalidParameters("x".into())));
  }

  #[test]
  fn test_run_guarded_captures_panics() {
    let result: Result<(), _> = run_guarded(|| panic!("boom"));
    assert_eq!(result, Err(GenerationError::WorkerPanicked("boom".into())));

    let code = 3;
    let result: Result<(), _> = run_guarded(|| panic!("code {code}"));
    assert_eq!(result, Err(GenerationError::WorkerPanicked("code 3".into())));
  }

  #[test]
  fn test_dispatch_deserializes_snake_case() {
    #[derive(Deserialize)]
    struct Wrapper {
      dispatch: Dispatch,
    }

    let parsed: Wrapper = toml::from_str("dispatch = \"thread_per_request\"").unwrap();
    assert_eq!(parsed.dispatch, Dispatch::ThreadPerRequest);
  }
}
