//! Throttle for repetitive log records.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

const NEVER: u64 = u64::MAX;

struct GateState {
    origin: Instant,
    window_ms: u64,
    /// Milliseconds since `origin` of the last permitted record, or `NEVER`.
    last_ms: AtomicU64,
    in_flight: AtomicBool,
}

/// Lets at most one record through per window.
///
/// A permit is granted when strictly more than `window` has passed since the
/// previous grant and no earlier permit is still alive. Dropping the permit
/// reopens the gate for the next window.
#[derive(Clone)]
pub struct ThrottledLogGate {
    state: Arc<GateState>,
}

/// Held while the permitted record is being written.
pub struct LogPermit {
    state: Arc<GateState>,
}

impl Drop for LogPermit {
    fn drop(&mut self) {
        self.state.in_flight.store(false, Ordering::Release);
    }
}

impl ThrottledLogGate {
    pub fn new(window: Duration) -> Self {
        Self {
            state: Arc::new(GateState {
                origin: Instant::now(),
                window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
                last_ms: AtomicU64::new(NEVER),
                in_flight: AtomicBool::new(false),
            }),
        }
    }

    pub fn try_acquire(&self) -> Option<LogPermit> {
        let now_ms = self.now_ms();
        if !self.window_open(now_ms) {
            return None;
        }
        self.claim(now_ms)
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.state.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn window_open(&self, now_ms: u64) -> bool {
        let last = self.state.last_ms.load(Ordering::Acquire);
        last == NEVER || now_ms.saturating_sub(last) > self.state.window_ms
    }

    /// Takes the in-flight flag, then checks the window again: a permit that
    /// was granted and dropped between the caller's check and the swap has
    /// already used this window.
    fn claim(&self, now_ms: u64) -> Option<LogPermit> {
        let state = &self.state;
        state
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        if !self.window_open(now_ms) {
            state.in_flight.store(false, Ordering::Release);
            return None;
        }
        state.last_ms.store(now_ms, Ordering::Release);

        Some(LogPermit {
            state: Arc::clone(state),
        })
    }
}
