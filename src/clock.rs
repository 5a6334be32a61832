use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic millisecond clock shared by the session clock and the event log
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

/// Production time source, counting from construction
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven time source for tests. Clones share the same instant.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Arc<AtomicU64>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Per-slide countdown. There is no pause; time keeps running and the
/// state machine simply stops consulting `expired` once it locks.
#[derive(Debug, Clone)]
pub struct SessionClock<T: TimeSource> {
    source: T,
    deadline_ms: u64,
}

impl<T: TimeSource> SessionClock<T> {
    pub fn new(source: T) -> Self {
        let deadline_ms = source.now_ms();
        Self {
            source,
            deadline_ms,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.source.now_ms()
    }

    pub fn start(&mut self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.deadline_ms = self.now_ms().saturating_add(millis);
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.deadline_ms.saturating_sub(self.now_ms()))
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Whole seconds left, rounded up for display
    pub fn remaining_secs_ceil(&self) -> u64 {
        self.remaining().as_millis().div_ceil(1000) as u64
    }
}
