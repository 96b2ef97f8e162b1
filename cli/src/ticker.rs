use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tapsweeper_core::Clock;

const TICK: Duration = Duration::from_secs(1);

/// Background thread refreshing the elapsed-seconds display of one session.
///
/// Dropping the ticker stops the thread, so replacing it on every session change
/// guarantees no tick from an older session lands on the display.
#[derive(Debug)]
pub struct Ticker {
    session_id: u64,
    seconds: Arc<AtomicU64>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start<C>(session_id: u64, started_at_ms: u64, clock: C) -> Self
    where
        C: Clock + Send + 'static,
    {
        let seconds = Arc::new(AtomicU64::new(0));
        let cancel = Arc::new(AtomicBool::new(false));
        let handle = {
            let seconds = Arc::clone(&seconds);
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || {
                while !cancel.load(Ordering::Acquire) {
                    let elapsed = clock.now_ms().saturating_sub(started_at_ms) / 1000;
                    seconds.store(elapsed, Ordering::Release);
                    thread::park_timeout(TICK);
                }
                log::trace!("Ticker for session {} stopped", session_id);
            })
        };

        log::trace!("Ticker for session {} started", session_id);
        Self {
            session_id,
            seconds,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn seconds(&self) -> u64 {
        self.seconds.load(Ordering::Acquire)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            if handle.join().is_err() {
                log::warn!("Ticker for session {} panicked", self.session_id);
            }
        }
    }
}
