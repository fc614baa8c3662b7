//! Background polling for the live dashboard.
//!
//! [`MetricsPoller`] runs two independent loops: a fast one appending
//! `/system/info` samples to rolling windows, and a slow one replacing the
//! `/system/history` payload. [`UnreadCounter`] runs the notification badge
//! loop. Each loop awaits its own fetch before taking the next tick, so
//! results within a loop are applied in order. A failed fetch is logged and
//! skipped; the next tick is the retry.

pub mod dashboard;
pub mod rate;
pub mod source;

pub use dashboard::{now_label, DashboardState, PollStats};
pub use rate::{NetworkRate, NetworkRateState};
pub use source::{MetricsSource, UnreadSource};

use ssm_config::PollerConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Owns the state of running loops and the tasks driving them.
///
/// Every mutation happens inside `send_modify`, so subscribers only ever see
/// fully applied ticks. Dropping the handle stops the loops.
#[derive(Debug)]
pub struct PollHandle<T> {
    state: Arc<watch::Sender<T>>,
    tasks: Vec<JoinHandle<()>>,
}

impl<T> PollHandle<T> {
    /// Receiver notified after every applied tick.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.state.subscribe()
    }

    /// `true` until [`PollHandle::stop`] is called.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Cancel every loop. In-flight fetches are dropped; state keeps whatever
    /// the last completed tick left in it.
    pub fn stop(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        for task in self.tasks.drain(..) {
            task.abort();
        }
        info!("Poller stopped");
    }
}

impl<T: Clone> PollHandle<T> {
    pub fn snapshot(&self) -> T {
        self.state.borrow().clone()
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

/// Fast + slow system metrics loops.
#[derive(Debug)]
pub struct MetricsPoller<S> {
    source:        Arc<S>,
    fast_interval: Duration,
    slow_interval: Duration,
    capacity:      usize,
}

impl<S: MetricsSource> MetricsPoller<S> {
    pub fn new(source: S, config: &PollerConfig) -> Self {
        Self {
            source:        Arc::new(source),
            fast_interval: config.fast_interval(),
            slow_interval: config.slow_interval(),
            capacity:      config.window_capacity,
        }
    }

    /// Spawn both loops. Each fetches immediately, then once per interval.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> PollHandle<DashboardState> {
        let state = Arc::new(watch::Sender::new(DashboardState::new(self.capacity)));

        let fast = {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&state);
            every(self.fast_interval, move || {
                let source = Arc::clone(&source);
                let state = Arc::clone(&state);
                async move { fast_tick(source.as_ref(), &state).await }
            })
        };

        let slow = {
            let source = Arc::clone(&self.source);
            let state = Arc::clone(&state);
            every(self.slow_interval, move || {
                let source = Arc::clone(&source);
                let state = Arc::clone(&state);
                async move { slow_tick(source.as_ref(), &state).await }
            })
        };

        info!(
            "Poller started (fast {:?}, slow {:?}, window {})",
            self.fast_interval, self.slow_interval, self.capacity
        );

        PollHandle {
            state,
            tasks: vec![fast, slow],
        }
    }
}

async fn fast_tick<S: MetricsSource>(source: &S, state: &watch::Sender<DashboardState>) {
    match source.system_info().await {
        Ok(info) => {
            let at = Instant::now();
            let label = now_label();
            state.send_modify(|s| {
                let sample = s.on_fast_tick(info, at, label);
                debug!(
                    "tick {}: cpu {:.1}% mem {:.1}%",
                    sample.timestamp, sample.cpu_percent, sample.memory_percent
                );
            });
        }
        Err(e) => {
            warn!("Failed to fetch system info: {e}");
            state.send_modify(DashboardState::record_fast_failure);
        }
    }
}

async fn slow_tick<S: MetricsSource>(source: &S, state: &watch::Sender<DashboardState>) {
    match source.system_history().await {
        Ok(history) => {
            debug!("history refreshed: {} points", history.len());
            state.send_modify(|s| s.on_slow_tick(history));
        }
        Err(e) => {
            warn!("Failed to fetch history: {e}");
            state.send_modify(DashboardState::record_slow_failure);
        }
    }
}

// ── Notifications ─────────────────────────────────────────────────────────────

/// What the badge loop publishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnreadState {
    /// `None` until the first successful fetch; then the last good count.
    pub count:    Option<u32>,
    /// The backend refused the session token on the latest fetch.
    pub rejected: bool,
}

/// Polls the unread-notification count for the bell badge.
#[derive(Debug)]
pub struct UnreadCounter<S> {
    source:   Arc<S>,
    interval: Duration,
}

impl<S: UnreadSource> UnreadCounter<S> {
    pub fn new(source: S, config: &PollerConfig) -> Self {
        Self {
            source:   Arc::new(source),
            interval: config.notification_interval(),
        }
    }

    /// Subscribers are only woken when the published state changes.
    pub fn start(self) -> PollHandle<UnreadState> {
        let state = Arc::new(watch::Sender::new(UnreadState::default()));
        let task = {
            let state = Arc::clone(&state);
            let source = self.source;
            every(self.interval, move || {
                let source = Arc::clone(&source);
                let state = Arc::clone(&state);
                async move { unread_tick(source.as_ref(), &state).await }
            })
        };

        PollHandle {
            state,
            tasks: vec![task],
        }
    }
}

async fn unread_tick<S: UnreadSource>(source: &S, state: &watch::Sender<UnreadState>) {
    let next = match source.unread_count().await {
        Ok(count) => UnreadState {
            count:    Some(count),
            rejected: false,
        },
        Err(e) if e.is_unauthorized() => {
            warn!("Session rejected while fetching unread count: {e}");
            UnreadState {
                rejected: true,
                ..*state.borrow()
            }
        }
        Err(e) => {
            warn!("Failed to fetch unread count: {e}");
            return;
        }
    };
    state.send_if_modified(|current| {
        let changed = *current != next;
        *current = next;
        changed
    });
}

// ── Loop driver ───────────────────────────────────────────────────────────────

/// Spawn a task running `tick` immediately and then every `period`.
///
/// A slow tick delays the next one instead of bursting to catch up.
fn every<F, Fut>(period: Duration, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            tick().await;
        }
    })
}
