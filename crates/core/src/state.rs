use crate::role::Role;
use serde::{Deserialize, Serialize};

/// Instantaneous host metrics as returned by `GET /system/info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemInfo {
    pub cpu:     CpuInfo,
    pub memory:  UsageInfo,
    pub disk:    UsageInfo,
    pub network: NetworkCounters,
    pub platform: Option<String>,
    pub version:  Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuInfo {
    /// Average usage across all cores (0.0 – 100.0).
    pub percent: f64,
    pub cores:   Option<u32>,
    pub threads: Option<u32>,
}

/// Memory or disk usage; sizes in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageInfo {
    pub percent: f64,
    pub used:    u64,
    pub total:   u64,
    pub free:    u64,
}

/// Cumulative byte counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkCounters {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Long-horizon aggregates from `GET /system/history`; parallel arrays
/// indexed by `timestamps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemHistory {
    pub cpu:          Vec<f64>,
    pub memory:       Vec<f64>,
    pub network_sent: Vec<f64>,
    pub network_recv: Vec<f64>,
    pub timestamps:   Vec<String>,
}

impl SystemHistory {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// One processed fast-loop tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Local wall-clock label, `HH:MM:SS`.
    pub timestamp:         String,
    pub cpu_percent:       f64,
    pub memory_percent:    f64,
    /// Bytes/second; `None` until a baseline exists.
    pub network_sent_rate: Option<f64>,
    pub network_recv_rate: Option<f64>,
}

/// Result of `GET /dashboard/git-status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitStatus {
    pub updates_available: bool,
    pub commits_behind:    u32,
}

/// Authenticated account as described by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_string")]
    pub id:       String,
    pub email:    String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role:     Role,
}

/// Bearer token plus the user it was issued for. This is the persisted
/// client-side snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user:  User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
    Token,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info    => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error   => "error",
            Self::Token   => "token",
        }
    }

    fn from_wire(name: &str) -> Self {
        match name {
            "warning" => Self::Warning,
            "success" => Self::Success,
            "error"   => Self::Error,
            "token"   => Self::Token,
            _         => Self::Info,
        }
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "id_string")]
    pub id:      String,
    pub title:   String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind:    NotificationKind,
    #[serde(default)]
    pub read:    bool,
    pub created_at: String,
    #[serde(default)]
    pub link:    Option<String>,
}

/// Invite token that upgrades its holder to server admin once activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteToken {
    pub token_code:   String,
    #[serde(default)]
    pub status:       String,
    pub expires_at:   String,
    #[serde(default)]
    pub activated_at: Option<String>,
    #[serde(default)]
    pub assigned_to:  Option<String>,
}

/// Game server as returned by `GET /servers` and `GET /servers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSummary {
    pub id:           u64,
    pub name:         String,
    #[serde(default)]
    pub game_type:    String,
    #[serde(default)]
    pub port:         u16,
    #[serde(default)]
    pub query_port:   Option<u16>,
    #[serde(default)]
    pub rcon_port:    Option<u16>,
    #[serde(default)]
    pub status:       String,
    #[serde(default)]
    pub max_players:  u32,
    #[serde(default)]
    pub cpu_usage:    f64,
    #[serde(default)]
    pub memory_usage: f64,
}

/// The backend uses both numeric and string ids depending on the table.
fn id_string<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s)   => s,
        RawId::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_info_tolerates_missing_fields() {
        let raw = r#"{"cpu":{"percent":12.5},"memory":{"percent":40.0,"used":4,"total":10}}"#;
        let info: SystemInfo = serde_json::from_str(raw).unwrap();
        assert_eq!(info.cpu.percent, 12.5);
        assert_eq!(info.cpu.cores, None);
        assert_eq!(info.memory.free, 0);
        assert_eq!(info.network, NetworkCounters::default());
    }

    #[test]
    fn notification_type_maps_unknown_to_info() {
        let raw = r#"{"id":"n1","title":"t","type":"celebration","created_at":"2024-01-01T00:00:00Z"}"#;
        let n: Notification = serde_json::from_str(raw).unwrap();
        assert_eq!(n.kind, NotificationKind::Info);
        assert!(!n.read);
    }

    #[test]
    fn user_role_defaults_to_lowest() {
        let raw = r#"{"id":"u1","email":"a@b.c"}"#;
        let u: User = serde_json::from_str(raw).unwrap();
        assert_eq!(u.role, Role::User);
    }

    #[test]
    fn numeric_user_id_is_accepted() {
        let raw = r#"{"id":42,"email":"a@b.c","username":"op","role":"admin"}"#;
        let u: User = serde_json::from_str(raw).unwrap();
        assert_eq!(u.id, "42");
        assert_eq!(u.role, Role::Admin);
    }
}
