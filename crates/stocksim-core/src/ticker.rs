//! Fixed-interval price simulation driven by `tokio::time`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{Market, StoreError};

/// A market shared between callers and a running [`LiveTicker`].
pub type SharedMarket = Arc<Mutex<Market>>;

pub fn shared(market: Market) -> SharedMarket {
    Arc::new(Mutex::new(market))
}

struct Running {
    session: u64,
    task: JoinHandle<()>,
}

/// Idle until [`start`](Self::start)ed; while running, applies one tick cycle
/// to every stock each interval.
///
/// A late timer fires once, late, with no catch-up. Each cycle checks the
/// live session under the market lock, so once [`stop`](Self::stop) returns
/// no further cycle can apply.
pub struct LiveTicker {
    market: SharedMarket,
    interval: Duration,
    running: Option<Running>,
}

impl LiveTicker {
    pub fn new(market: SharedMarket, interval: Duration) -> Self {
        Self {
            market,
            interval,
            running: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Spawn the tick task on the current Tokio runtime. Returns `false` if
    /// already running.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.running.is_some() {
            return false;
        }

        let session = self
            .market
            .lock()
            .expect("market lock is not poisoned")
            .begin_live_session();
        let market = Arc::clone(&self.market);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticks = time::interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let market = Arc::clone(&market);
                // Persisting blocks; keep it on the blocking pool.
                let cycle = task::spawn_blocking(move || apply_live_cycle(&market, session));
                match cycle.await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(error) => {
                        tracing::warn!(%error, "tick cycle task failed, ticker exiting");
                        break;
                    }
                }
            }
        });

        tracing::info!(interval_ms = period.as_millis() as u64, "live ticker started");
        self.running = Some(Running { session, task });
        true
    }

    /// Idempotent. Returns `true` if the ticker was running.
    pub fn stop(&mut self) -> bool {
        let Some(running) = self.running.take() else {
            return false;
        };

        self.market
            .lock()
            .expect("market lock is not poisoned")
            .end_live_session(running.session);
        running.task.abort();
        tracing::info!("live ticker stopped");
        true
    }

    /// Apply one cycle now, whether or not the ticker is running.
    pub fn tick_once(&self) -> Result<(), StoreError> {
        self.market
            .lock()
            .expect("market lock is not poisoned")
            .apply_tick_cycle()
    }
}

/// One cycle for `session`. Returns `false` once the session has ended.
fn apply_live_cycle(market: &SharedMarket, session: u64) -> bool {
    let mut market = market.lock().expect("market lock is not poisoned");
    if !market.is_live_session(session) {
        return false;
    }
    if let Err(error) = market.apply_tick_cycle() {
        tracing::warn!(%error, "tick cycle applied but not persisted");
    }
    true
}

impl Drop for LiveTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
