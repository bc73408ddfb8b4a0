//! Turbo: debounced write coalescing over a [`Store`].
//!
//! Bursts of save requests collapse into one physical write holding the
//! latest snapshot. At most one write is ever pending; a new request
//! replaces the pending snapshot and re-arms the deadline.

use crate::error::{StoreError, StoreResult};
use crate::store::Store;
use parking_lot::{Condvar, Mutex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use soledb_codec::{Format, JsonFormat};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::warn;

/// The one outstanding write when coalescing is active.
struct PendingWrite<T> {
    snapshot: T,
    deadline: Instant,
}

struct Shared<T> {
    state: Mutex<TurboState<T>>,
    signal: Condvar,
}

struct TurboState<T> {
    pending: Option<PendingWrite<T>>,
    shutdown: bool,
    flush_requested: bool,
    write_in_progress: bool,
    write_error: Option<StoreError>,
}

enum Action<T> {
    Flush(T),
    FlushThenExit(T),
    Exit,
}

/// Debouncing decorator over [`Store::save`].
///
/// Every physical write happens on the single flusher thread, whether
/// driven by a deadline or by [`flush`](Self::flush), so writes to the
/// primary file are serialized and land in snapshot order.
///
/// # Durability contract
///
/// This is an explicit weak-durability trade: [`save`](Self::save)
/// acknowledges immediately, before anything reaches disk. Only the
/// final write in a burst is guaranteed to be persisted; intermediate
/// snapshots in the same burst may never touch the filesystem. Call
/// [`flush`](Self::flush) to drain the pending write on demand; drop
/// also flushes, so a graceful shutdown loses nothing.
pub struct Turbo<T, F: Format = JsonFormat> {
    store: Arc<Store<T, F>>,
    shared: Arc<Shared<T>>,
    interval: Duration,
    flusher: Option<JoinHandle<()>>,
}

impl<T, F> Turbo<T, F>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    F: Format + 'static,
{
    /// Creates a coalescer over the given store with the given debounce
    /// interval, spawning the single flusher thread.
    #[must_use]
    pub fn new(store: Arc<Store<T, F>>, interval: Duration) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(TurboState {
                pending: None,
                shutdown: false,
                flush_requested: false,
                write_in_progress: false,
                write_error: None,
            }),
            signal: Condvar::new(),
        });

        let flusher = {
            let store = Arc::clone(&store);
            let shared = Arc::clone(&shared);
            thread::spawn(move || run_flusher(&store, &shared))
        };

        Self {
            store,
            shared,
            interval,
            flusher: Some(flusher),
        }
    }

    /// Returns the debounce interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<Store<T, F>> {
        &self.store
    }

    /// Schedules `document` for persistence and returns immediately.
    ///
    /// If a write is already pending its snapshot is discarded and the
    /// deadline re-armed: last write wins, nothing queues. The return is
    /// a synthetic acknowledgment; see the type-level durability
    /// contract.
    pub fn save(&self, document: T) {
        let mut state = self.shared.state.lock();
        state.pending = Some(PendingWrite {
            snapshot: document,
            deadline: Instant::now() + self.interval,
        });
        self.shared.signal.notify_all();
    }

    /// Persists the pending write right now, if there is one.
    ///
    /// The write itself is performed by the flusher thread; this call
    /// blocks until nothing is pending and no write is in flight, then
    /// surfaces the most recent unreported write failure.
    pub fn flush(&self) -> StoreResult<()> {
        let mut state = self.shared.state.lock();
        state.flush_requested = true;
        self.shared.signal.notify_all();
        while state.pending.is_some() || state.write_in_progress {
            self.shared.signal.wait(&mut state);
        }
        state.flush_requested = false;
        match state.write_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Returns true if a write is currently pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.shared.state.lock().pending.is_some()
    }
}

impl<T, F: Format> Drop for Turbo<T, F> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.shutdown = true;
        }
        self.shared.signal.notify_all();
        if let Some(handle) = self.flusher.take() {
            let _ = handle.join();
        }
    }
}

fn run_flusher<T, F>(store: &Store<T, F>, shared: &Shared<T>)
where
    T: Clone + Serialize + DeserializeOwned,
    F: Format,
{
    loop {
        match next_action(shared) {
            Action::Flush(document) => {
                let result = store.save(&document);
                finish_write(shared, result);
            }
            Action::FlushThenExit(document) => {
                let result = store.save(&document);
                finish_write(shared, result);
                return;
            }
            Action::Exit => return,
        }
    }
}

/// Blocks until the pending deadline passes, a flush is requested, or
/// shutdown, then takes the snapshot. The lock is never held across a
/// save; `write_in_progress` covers the window instead.
fn next_action<T>(shared: &Shared<T>) -> Action<T> {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            return match state.pending.take() {
                Some(p) => {
                    state.write_in_progress = true;
                    Action::FlushThenExit(p.snapshot)
                }
                None => Action::Exit,
            };
        }
        if state.flush_requested {
            state.flush_requested = false;
            if let Some(p) = state.pending.take() {
                state.write_in_progress = true;
                return Action::Flush(p.snapshot);
            }
        }
        match state.pending.as_ref().map(|p| p.deadline) {
            None => {
                shared.signal.wait(&mut state);
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    if let Some(p) = state.pending.take() {
                        state.write_in_progress = true;
                        return Action::Flush(p.snapshot);
                    }
                } else {
                    shared.signal.wait_for(&mut state, deadline - now);
                }
            }
        }
    }
}

fn finish_write<T>(shared: &Shared<T>, result: StoreResult<()>) {
    let mut state = shared.state.lock();
    state.write_in_progress = false;
    if let Err(e) = result {
        warn!(error = %e, "coalesced write failed");
        state.write_error = Some(e);
    }
    shared.signal.notify_all();
}
