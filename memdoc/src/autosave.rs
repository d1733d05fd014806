//! Periodic snapshotting of a document store.
//!
//! The store itself never owns a timer. An application that wants the store
//! written out on a schedule spawns an [`Autosave`] task next to it:
//!
//! ```ignore
//! use memdoc::{autosave, memory::DocumentStore};
//!
//! let store = DocumentStore::new();
//! let task = autosave::spawn(store.clone(), autosave::DEFAULT_PERIOD)?;
//! // ...
//! task.stop();
//! ```

use std::time::Duration;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, warn};

use memdoc_core::error::{DocumentStoreError, DocumentStoreResult};
use memdoc_memory::DocumentStore;

/// Default time between two automatic snapshots.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// A running autosave task. Dropping it stops the task.
#[derive(Debug)]
pub struct Autosave {
    period: Duration,
    handle: JoinHandle<()>,
}

impl Autosave {
    /// Time between two snapshots.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops the task. A save already in progress is abandoned.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a task on the current tokio runtime that saves `store` every `period`.
///
/// The first save happens one full period after spawning. Failed saves are logged
/// and retried at the next tick.
///
/// # Errors
///
/// Returns [`DocumentStoreError::InvalidInput`] if `period` is zero.
pub fn spawn(store: DocumentStore, period: Duration) -> DocumentStoreResult<Autosave> {
    if period.is_zero() {
        return Err(DocumentStoreError::InvalidInput(
            "autosave period must be greater than zero".to_string(),
        ));
    }

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            match store.save().await {
                Ok(count) => debug!(count, "Autosave complete"),
                Err(err) => warn!(error = %err, location = %store.sink().location(), "Autosave failed"),
            }
        }
    });

    Ok(Autosave { period, handle })
}
