//! Latest-wins search execution

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::debug;
use tokio::task::AbortHandle;

use crate::error::{Error, Result};

/// Runs searches so that only the most recent one can deliver a result.
///
/// Each call spawns its search as a task. Starting a new search aborts the
/// previous task, and a search that finishes after a newer one started
/// reports [`Error::Superseded`] instead of its results.
#[derive(Debug, Default)]
pub struct LatestSearch {
    generation: AtomicU64,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl LatestSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<T, F>(&self, search: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let handle = tokio::spawn(search);

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = in_flight.replace(handle.abort_handle()) {
                debug!("aborting search #{}", generation - 1);
                previous.abort();
            }
        }

        let outcome = handle.await;

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
            if self.generation.load(Ordering::SeqCst) != generation {
                return Err(Error::Superseded);
            }
            in_flight.take();
        }

        match outcome {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(Error::Superseded),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }

    /// Abort whatever search is running without starting a new one
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = in_flight.take() {
            previous.abort();
        }
    }
}
