//! Plain-text rendering of poller state and API records.

use chrono::{DateTime, Utc};
use ssm_core::format::{format_bytes, format_rate, relative_time, sparkline};
use ssm_api::{ServerLogEntry, ServerStatus};
use ssm_core::{InviteToken, Notification, ServerSummary, SystemHistory, SystemInfo, User};
use ssm_poller::DashboardState;

/// One status line per fast tick.
pub fn live_line(state: &DashboardState, unread: Option<u32>) -> String {
    let Some(sample) = state.latest_sample() else {
        return "waiting for first sample…".to_string();
    };

    let cpu = state.cpu.to_vec();
    let mem = state.memory.to_vec();
    let net = match (sample.network_recv_rate, sample.network_sent_rate) {
        (Some(rx), Some(tx)) => {
            // Both directions share one scale so their bars compare.
            let peak = state.net_recv.max().max(state.net_sent.max());
            format!(
                "↓{} {}  ↑{} {}",
                format_rate(rx),
                sparkline(&state.net_recv.to_vec(), peak),
                format_rate(tx),
                sparkline(&state.net_sent.to_vec(), peak),
            )
        }
        _ => "↓–  ↑–".to_string(),
    };

    let mut line = format!(
        "{}  CPU {:>5.1}% {}  RAM {:>5.1}% {}  {}",
        sample.timestamp,
        sample.cpu_percent,
        sparkline(&cpu, 100.0),
        sample.memory_percent,
        sparkline(&mem, 100.0),
        net,
    );
    if let Some(info) = &state.latest {
        line.push_str(&format!("  {}", disk_summary(info)));
    }
    if let Some(n) = unread.filter(|&n| n > 0) {
        line.push_str(&format!("  🔔{n}"));
    }
    if state.stats.fast_failed > 0 {
        line.push_str(&format!("  ({} failed)", state.stats.fast_failed));
    }
    line
}

fn disk_summary(info: &SystemInfo) -> String {
    format!(
        "disk {:.1}% ({} free)",
        info.disk.percent,
        format_bytes(info.disk.free)
    )
}

pub fn history_summary(history: &SystemHistory) -> String {
    if history.is_empty() {
        return "no history yet".to_string();
    }
    let first = history.timestamps.first().map(String::as_str).unwrap_or("?");
    let last = history.timestamps.last().map(String::as_str).unwrap_or("?");
    let peak_rate = history
        .network_recv
        .iter()
        .chain(&history.network_sent)
        .copied()
        .fold(0.0, f64::max);

    format!(
        "{} points, {first} → {last}\n\
         CPU {}\n\
         RAM {}\n\
         ↓   {}\n\
         ↑   {}",
        history.len(),
        sparkline(&history.cpu, 100.0),
        sparkline(&history.memory, 100.0),
        sparkline(&history.network_recv, peak_rate),
        sparkline(&history.network_sent, peak_rate),
    )
}

pub fn user_line(user: &User) -> String {
    format!("{} <{}> role={}", user.username, user.email, user.role)
}

pub fn token_line(token: &InviteToken) -> String {
    format!("{}  {:<8} expires {}", token.token_code, token.status, token.expires_at)
}

pub fn notification_line(n: &Notification, now: DateTime<Utc>) -> String {
    let when = DateTime::parse_from_rfc3339(&n.created_at)
        .map(|t| relative_time(t.with_timezone(&Utc), now))
        .unwrap_or_else(|_| n.created_at.clone());
    let marker = if n.read { ' ' } else { '•' };
    format!("{marker} [{}] {:<8} {} — {} ({when})", n.id, n.kind.as_str(), n.title, n.message)
}

pub fn server_line(s: &ServerSummary) -> String {
    format!(
        "#{:<4} {:<24} {:<4} :{:<5} {:<10} max {}",
        s.id, s.name, s.game_type, s.port, s.status, s.max_players
    )
}

pub fn server_status_line(id: u64, status: &ServerStatus) -> String {
    let mut line = format!(
        "#{id} {}  cpu {:.1}%  mem {:.1}%",
        status.status, status.cpu_usage, status.memory_usage
    );
    if let Some(pid) = status.process_id {
        line.push_str(&format!("  pid {pid}"));
    }
    if let Some(players) = status.players {
        line.push_str(&format!("  players {players}"));
    }
    line
}

pub fn log_line(entry: &ServerLogEntry) -> String {
    format!("{} [{}] {}", entry.timestamp, entry.log_type, entry.message)
}
