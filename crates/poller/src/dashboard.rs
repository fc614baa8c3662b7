use crate::rate::NetworkRateState;
use chrono::Local;
use ssm_core::{MetricSample, RollingWindow, SystemHistory, SystemInfo};
use tokio::time::Instant;

/// Success/failure counters per loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub fast_ok:     u64,
    pub fast_failed: u64,
    pub slow_ok:     u64,
    pub slow_failed: u64,
}

/// Everything the live dashboard renders.
///
/// Live series share one capacity. The rate windows start one sample behind
/// the others because the first tick has no baseline.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub cpu:      RollingWindow<f64>,
    pub memory:   RollingWindow<f64>,
    pub net_sent: RollingWindow<f64>,
    pub net_recv: RollingWindow<f64>,
    pub labels:   RollingWindow<String>,
    /// Most recent `/system/info` payload (disk usage, core count, ...).
    pub latest:   Option<SystemInfo>,
    pub history:  SystemHistory,
    pub stats:    PollStats,
    rate:         NetworkRateState,
    last_sample:  Option<MetricSample>,
}

impl DashboardState {
    pub fn new(capacity: usize) -> Self {
        Self {
            cpu:      RollingWindow::new(capacity),
            memory:   RollingWindow::new(capacity),
            net_sent: RollingWindow::new(capacity),
            net_recv: RollingWindow::new(capacity),
            labels:   RollingWindow::new(capacity),
            latest:   None,
            history:  SystemHistory::default(),
            stats:    PollStats::default(),
            rate:     NetworkRateState::default(),
            last_sample: None,
        }
    }

    /// Fold one successful fast fetch into the live windows.
    pub fn on_fast_tick(&mut self, info: SystemInfo, at: Instant, label: String) -> MetricSample {
        let rate = self.rate.observe(info.network, at);
        if let Some(rate) = rate {
            self.net_sent.push(rate.sent);
            self.net_recv.push(rate.recv);
        }
        self.cpu.push(info.cpu.percent);
        self.memory.push(info.memory.percent);
        self.labels.push(label.clone());
        self.stats.fast_ok += 1;

        let sample = MetricSample {
            timestamp:         label,
            cpu_percent:       info.cpu.percent,
            memory_percent:    info.memory.percent,
            network_sent_rate: rate.map(|r| r.sent),
            network_recv_rate: rate.map(|r| r.recv),
        };
        self.latest = Some(info);
        self.last_sample = Some(sample.clone());
        sample
    }

    /// Replace the history wholesale; nothing from the previous payload survives.
    pub fn on_slow_tick(&mut self, history: SystemHistory) {
        self.history = history;
        self.stats.slow_ok += 1;
    }

    pub fn record_fast_failure(&mut self) {
        self.stats.fast_failed += 1;
    }

    pub fn record_slow_failure(&mut self) {
        self.stats.slow_failed += 1;
    }

    /// Fast ticks completed so far, successful or not. Slow ticks leave it
    /// unchanged.
    pub fn fast_ticks(&self) -> u64 {
        self.stats.fast_ok + self.stats.fast_failed
    }

    /// The sample the last successful fast tick produced.
    pub fn latest_sample(&self) -> Option<&MetricSample> {
        self.last_sample.as_ref()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(ssm_core::window::DEFAULT_CAPACITY)
    }
}

/// Wall-clock label for the x-axis of the live charts.
pub fn now_label() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssm_core::state::{CpuInfo, NetworkCounters, UsageInfo};
    use std::time::Duration;

    fn info(cpu: f64, sent: u64, recv: u64) -> SystemInfo {
        SystemInfo {
            cpu: CpuInfo {
                percent: cpu,
                ..Default::default()
            },
            memory: UsageInfo {
                percent: cpu / 2.0,
                ..Default::default()
            },
            network: NetworkCounters {
                bytes_sent: sent,
                bytes_recv: recv,
            },
            ..Default::default()
        }
    }

    #[test]
    fn three_ticks_fill_without_eviction() {
        let mut state = DashboardState::new(30);
        let t0 = Instant::now();
        for (i, cpu) in [10.0, 20.0, 15.0].into_iter().enumerate() {
            let at = t0 + Duration::from_secs(2 * i as u64);
            state.on_fast_tick(info(cpu, 0, 0), at, format!("t{i}"));
        }
        assert_eq!(state.cpu.to_vec(), vec![10.0, 20.0, 15.0]);
        assert_eq!(state.labels.to_vec(), vec!["t0", "t1", "t2"]);
    }

    #[test]
    fn thirty_one_ticks_evict_oldest_everywhere() {
        let mut state = DashboardState::new(30);
        let t0 = Instant::now();
        for v in 1..=31u64 {
            let at = t0 + Duration::from_secs(2 * v);
            state.on_fast_tick(info(v as f64, v * 100, v * 200), at, format!("{v}"));
        }
        let expected: Vec<f64> = (2..=31).map(|v| v as f64).collect();
        assert_eq!(state.cpu.to_vec(), expected);
        assert_eq!(state.labels.len(), 30);
        assert_eq!(state.labels.iter().next().map(String::as_str), Some("2"));
        // 30 rates from 31 ticks, none evicted yet.
        assert_eq!(state.net_sent.len(), 30);
        assert!(state.net_sent.iter().all(|&r| r == 50.0));
        assert!(state.net_recv.iter().all(|&r| r == 100.0));
    }

    #[test]
    fn first_tick_has_no_rate() {
        let mut state = DashboardState::new(30);
        let t0 = Instant::now();
        let first = state.on_fast_tick(info(5.0, 1_000, 1_000), t0, "a".into());
        assert_eq!(first.network_sent_rate, None);
        assert!(state.net_sent.is_empty());

        let second = state.on_fast_tick(info(5.0, 3_000, 5_000), t0 + Duration::from_secs(2), "b".into());
        assert_eq!(second.network_sent_rate, Some(1_000.0));
        assert_eq!(second.network_recv_rate, Some(2_000.0));
    }

    #[test]
    fn failure_leaves_windows_identical() {
        let mut state = DashboardState::new(30);
        let t0 = Instant::now();
        state.on_fast_tick(info(1.0, 0, 0), t0, "a".into());
        state.on_fast_tick(info(2.0, 10, 10), t0 + Duration::from_secs(2), "b".into());
        let (cpu, labels, sent) = (state.cpu.clone(), state.labels.clone(), state.net_sent.clone());

        state.record_fast_failure();

        assert_eq!(state.cpu, cpu);
        assert_eq!(state.labels, labels);
        assert_eq!(state.net_sent, sent);
        assert_eq!(state.stats.fast_failed, 1);
    }

    #[test]
    fn history_is_replaced_not_merged() {
        let mut state = DashboardState::default();
        state.on_slow_tick(SystemHistory {
            cpu: vec![1.0, 2.0, 3.0, 4.0],
            memory: vec![1.0; 4],
            network_sent: vec![0.0; 4],
            network_recv: vec![0.0; 4],
            timestamps: (0..4).map(|i| format!("h{i}")).collect(),
        });
        state.on_slow_tick(SystemHistory {
            cpu: vec![9.0, 8.0],
            memory: vec![7.0; 2],
            network_sent: vec![0.0; 2],
            network_recv: vec![0.0; 2],
            timestamps: vec!["x".into(), "y".into()],
        });

        assert_eq!(state.history.cpu, vec![9.0, 8.0]);
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.stats.slow_ok, 2);
    }

    #[test]
    fn slow_ticks_do_not_count_as_fast_ticks() {
        let mut state = DashboardState::new(30);
        state.on_fast_tick(info(1.0, 0, 0), Instant::now(), "a".into());
        state.record_fast_failure();
        assert_eq!(state.fast_ticks(), 2);

        state.on_slow_tick(SystemHistory::default());
        state.record_slow_failure();
        assert_eq!(state.fast_ticks(), 2);
    }

    #[test]
    fn latest_sample_mirrors_last_tick() {
        let mut state = DashboardState::new(30);
        assert_eq!(state.latest_sample(), None);

        let t0 = Instant::now();
        let first = state.on_fast_tick(info(3.0, 0, 0), t0, "a".into());
        assert_eq!(state.latest_sample(), Some(&first));

        let second = state.on_fast_tick(info(4.0, 20, 40), t0 + Duration::from_secs(2), "b".into());
        assert_eq!(state.latest_sample(), Some(&second));
    }

    #[test]
    fn label_is_clock_time() {
        let label = now_label();
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }
}
