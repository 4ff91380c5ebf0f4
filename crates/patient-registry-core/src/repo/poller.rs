//! Background refresh polling.
//!
//! The embedded engine offers no change notifications, so a fixed-interval
//! poller re-reads the full snapshot. Ticks go through `try_lock` and are
//! skipped while any other store operation holds the repository, so a
//! refresh can never overwrite a just-written state mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use super::PatientRepository;

/// Default tick interval, matching the original 1 s poll.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Periodic full-snapshot refresher for a shared repository.
pub struct RefreshPoller {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshPoller {
    /// Spawn the polling thread.
    pub fn start(repo: Arc<Mutex<PatientRepository>>, interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        // sleep in short slices so stop() returns promptly even when the
        // tick interval is long
        let slice = Duration::from_millis(20).min(interval);

        let handle = thread::spawn(move || 'ticks: loop {
            let deadline = Instant::now() + interval;
            while Instant::now() < deadline {
                if stop_flag.load(Ordering::Relaxed) {
                    break 'ticks;
                }
                thread::sleep(slice);
            }
            match repo.try_lock() {
                Ok(mut repo) => repo.refresh(),
                Err(TryLockError::WouldBlock) => {
                    // single-flight guard: skip the tick, the next one will catch up
                    debug!("refresh tick skipped: repository busy");
                }
                Err(TryLockError::Poisoned(_)) => break,
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop polling and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
