use ssm_core::state::NetworkCounters;
use tokio::time::Instant;
use tracing::debug;

/// Derived transfer rates in bytes/second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkRate {
    pub sent: f64,
    pub recv: f64,
}

/// Turns cumulative byte counters into rates.
///
/// The first observation only sets the baseline. Every later one yields
/// `(current - previous) / elapsed_seconds` and becomes the new baseline.
#[derive(Debug, Clone, Default)]
pub struct NetworkRateState {
    last: Option<(NetworkCounters, Instant)>,
}

impl NetworkRateState {
    pub fn observe(&mut self, counters: NetworkCounters, at: Instant) -> Option<NetworkRate> {
        let Some((prev, prev_at)) = self.last else {
            self.last = Some((counters, at));
            return None;
        };

        let elapsed = at.saturating_duration_since(prev_at).as_secs_f64();
        if elapsed <= 0.0 {
            // Same instant twice: keep the older baseline.
            return None;
        }
        self.last = Some((counters, at));

        Some(NetworkRate {
            sent: per_second(prev.bytes_sent, counters.bytes_sent, elapsed),
            recv: per_second(prev.bytes_recv, counters.bytes_recv, elapsed),
        })
    }
}

/// A counter that went backwards (interface reset, host reboot) reads as 0.
fn per_second(prev: u64, now: u64, elapsed_secs: f64) -> f64 {
    if now < prev {
        debug!("Network counter went backwards ({prev} → {now}); clamping rate to 0");
        return 0.0;
    }
    (now - prev) as f64 / elapsed_secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn counters(sent: u64, recv: u64) -> NetworkCounters {
        NetworkCounters {
            bytes_sent: sent,
            bytes_recv: recv,
        }
    }

    #[test]
    fn first_observation_has_no_rate() {
        let mut state = NetworkRateState::default();
        let t0 = Instant::now();
        assert_eq!(state.observe(counters(100, 100), t0), None);
        // The baseline is in place: the next observation yields a rate.
        assert!(state.observe(counters(100, 100), t0 + Duration::from_secs(1)).is_some());
    }

    #[test]
    fn rate_is_delta_over_elapsed() {
        let mut state = NetworkRateState::default();
        let t0 = Instant::now();
        state.observe(counters(1_000, 5_000), t0);

        let rate = state
            .observe(counters(3_000, 9_000), t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(rate.sent, 1_000.0);
        assert_eq!(rate.recv, 2_000.0);

        // Baseline moved forward.
        let rate = state
            .observe(counters(3_500, 9_000), t0 + Duration::from_secs(3))
            .unwrap();
        assert_eq!(rate.sent, 500.0);
        assert_eq!(rate.recv, 0.0);
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        let mut state = NetworkRateState::default();
        let t0 = Instant::now();
        state.observe(counters(10_000, 10_000), t0);

        let rate = state
            .observe(counters(50, 20_000), t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(rate.sent, 0.0);
        assert_eq!(rate.recv, 5_000.0);
    }

    #[test]
    fn zero_elapsed_yields_nothing() {
        let mut state = NetworkRateState::default();
        let t0 = Instant::now();
        state.observe(counters(0, 0), t0);
        assert_eq!(state.observe(counters(10, 10), t0), None);
    }
}
