//! Periodic hook over the current document.
//!
//! Purely informational: at a fixed interval the hook receives a clone
//! of the current document; its return value is discarded.

use crate::state::StateContainer;
use parking_lot::{Condvar, Mutex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use soledb_codec::Format;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

struct StopSignal {
    stopped: Mutex<bool>,
    signal: Condvar,
}

/// A running periodic hook. Stops when dropped.
pub struct Cron {
    stop: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Cron {
    /// Starts invoking `hook` with the current document every
    /// `interval`.
    pub fn start<T, F, H>(
        state: Arc<StateContainer<T, F>>,
        interval: Duration,
        hook: H,
    ) -> Self
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        F: Format + 'static,
        H: Fn(T) + Send + 'static,
    {
        let stop = Arc::new(StopSignal {
            stopped: Mutex::new(false),
            signal: Condvar::new(),
        });

        let handle = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                debug!(interval = ?interval, "cron task started");
                loop {
                    let mut stopped = stop.stopped.lock();
                    if *stopped {
                        break;
                    }
                    stop.signal.wait_for(&mut stopped, interval);
                    if *stopped {
                        break;
                    }
                    drop(stopped);
                    hook(state.current());
                }
                debug!("cron task stopped");
            })
        };

        Self {
            stop,
            handle: Some(handle),
        }
    }
}

impl Drop for Cron {
    fn drop(&mut self) {
        *self.stop.stopped.lock() = true;
        self.stop.signal.notify_one();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::tempdir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
    struct Counter {
        count: u64,
    }

    #[test]
    fn hook_fires_with_current_document() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"), Counter { count: 6 });
        let state = Arc::new(StateContainer::new(config));
        state.load().unwrap();

        let seen = Arc::new(AtomicU64::new(0));
        let cron = {
            let seen = Arc::clone(&seen);
            Cron::start(
                Arc::clone(&state),
                Duration::from_millis(20),
                move |doc: Counter| {
                    seen.store(doc.count, Ordering::SeqCst);
                },
            )
        };

        thread::sleep(Duration::from_millis(120));
        drop(cron);

        assert_eq!(seen.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn drop_stops_promptly() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::new(dir.path().join("db.json"), Counter::default());
        let state = Arc::new(StateContainer::new(config));

        let cron = Cron::start(state, Duration::from_secs(3600), |_: Counter| {});
        let started = std::time::Instant::now();
        drop(cron);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
