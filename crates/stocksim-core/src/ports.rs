//! Capabilities the market consumes: time, randomness and identity.
//!
//! Production code uses [`SystemClock`], [`FastRandom`] and [`UuidGenerator`];
//! tests swap in [`ManualClock`], a seeded [`FastRandom`] and [`SequentialIds`]
//! so that every run is reproducible.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::UtcDateTime;

pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// Uniform source over `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<UtcDateTime>,
}

impl ManualClock {
    pub fn new(start: UtcDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock is not poisoned");
        *now = now.plus(by);
    }

    pub fn set(&self, to: UtcDateTime) {
        *self.now.lock().expect("clock lock is not poisoned") = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UtcDateTime {
        *self.now.lock().expect("clock lock is not poisoned")
    }
}

#[derive(Debug)]
pub struct FastRandom {
    rng: Mutex<fastrand::Rng>,
}

impl FastRandom {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for FastRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for FastRandom {
    fn next_f64(&self) -> f64 {
        self.rng.lock().expect("rng lock is not poisoned").f64()
    }
}

/// Always returns the same value. Handy for pinning tick direction in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// `prefix-1`, `prefix-2`, ...
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

/// The three ports bundled for injection into a [`Market`](crate::Market).
#[derive(Clone)]
pub struct MarketPorts {
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub ids: Arc<dyn IdGenerator>,
}

impl MarketPorts {
    pub fn system() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            random: Arc::new(FastRandom::new()),
            ids: Arc::new(UuidGenerator),
        }
    }

    /// Deterministic ports: fixed start time, seeded randomness, sequential ids.
    pub fn deterministic(start: UtcDateTime, seed: u64) -> Self {
        Self {
            clock: Arc::new(ManualClock::new(start)),
            random: Arc::new(FastRandom::with_seed(seed)),
            ids: Arc::new(SequentialIds::new("id")),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    pub fn with_ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }
}

impl Default for MarketPorts {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_random_is_reproducible_and_in_range() {
        let a = FastRandom::with_seed(7);
        let b = FastRandom::with_seed(7);
        for _ in 0..32 {
            let value = a.next_f64();
            assert!((0.0..1.0).contains(&value));
            assert_eq!(value, b.next_f64());
        }
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("trade");
        assert_eq!(ids.next_id(), "trade-1");
        assert_eq!(ids.next_id(), "trade-2");
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(UtcDateTime::parse("2025-01-01T00:00:00Z").expect("ts"));
        clock.advance(Duration::from_secs(90));
        assert_eq!(clock.now().to_string(), "2025-01-01T00:01:30Z");
    }
}
