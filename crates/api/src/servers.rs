use crate::client::{Ack, ApiClient};
use crate::validate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use ssm_core::{Result, ServerSummary, SsmError};
use std::fmt;

/// Player slots a new server gets unless the caller picks another number.
pub const DEFAULT_MAX_PLAYERS: u32 = 20;

/// Log lines fetched per request unless the caller asks for more.
pub const DEFAULT_LOG_LIMIT: u32 = 100;

/// Lifecycle actions the backend exposes per game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start,
    Stop,
    Install,
}

impl ServerAction {
    fn as_path(self) -> &'static str {
        match self {
            Self::Start   => "start",
            Self::Stop    => "stop",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_path())
    }
}

/// Body of `POST /servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewServer {
    pub name:          String,
    /// `ASE` or `ASA`.
    pub game_type:     String,
    pub port:          u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_port:    Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_port:     Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_password: Option<String>,
    pub max_players:   u32,
}

impl NewServer {
    pub fn new(name: impl Into<String>, game_type: impl Into<String>, port: u16) -> Self {
        Self {
            name:          name.into(),
            game_type:     game_type.into(),
            port,
            query_port:    None,
            rcon_port:     None,
            rcon_password: None,
            max_players:   DEFAULT_MAX_PLAYERS,
        }
    }

    /// Trimmed, normalised copy; fails on the first invalid field.
    fn validated(&self) -> Result<Self> {
        Ok(Self {
            name:          validate::server_name(&self.name)?.to_string(),
            game_type:     validate::game_type(&self.game_type)?.to_string(),
            port:          validate::port(self.port)?,
            query_port:    self.query_port.map(validate::port).transpose()?,
            rcon_port:     self.rcon_port.map(validate::port).transpose()?,
            rcon_password: self.rcon_password.clone(),
            max_players:   max_players(self.max_players)?,
        })
    }
}

/// Body of `PUT /servers/{id}`. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name:          Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port:          Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_port:    Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_port:     Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rcon_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players:   Option<u32>,
}

impl ServerUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn validated(&self) -> Result<Self> {
        if self.is_empty() {
            return Err(SsmError::Validation("nothing to update".into()));
        }
        Ok(Self {
            name:          self.name.as_deref().map(validate::server_name).transpose()?.map(str::to_owned),
            port:          self.port.map(validate::port).transpose()?,
            query_port:    self.query_port.map(validate::port).transpose()?,
            rcon_port:     self.rcon_port.map(validate::port).transpose()?,
            rcon_password: self.rcon_password.clone(),
            max_players:   self.max_players.map(max_players).transpose()?,
        })
    }
}

fn max_players(n: u32) -> Result<u32> {
    if n == 0 {
        return Err(SsmError::Validation("max players must be at least 1".into()));
    }
    Ok(n)
}

/// Live process state from `GET /servers/{id}/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    pub status:       String,
    pub process_id:   Option<u32>,
    pub cpu_usage:    f64,
    pub memory_usage: f64,
    pub players:      Option<u32>,
}

/// Which log stream to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogKind {
    Install,
    #[default]
    Runtime,
    Error,
}

impl LogKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "INSTALL",
            Self::Runtime => "RUNTIME",
            Self::Error   => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerLogEntry {
    pub log_type:  String,
    pub message:   String,
    pub timestamp: String,
}

impl ApiClient {
    pub async fn servers(&self) -> Result<Vec<ServerSummary>> {
        self.require_token()?;
        self.get("/servers").await
    }

    pub async fn server(&self, id: u64) -> Result<ServerSummary> {
        self.require_token()?;
        self.get(&format!("/servers/{id}")).await
    }

    /// Register a new game server. Invalid fields fail before any request.
    pub async fn create_server(&self, server: &NewServer) -> Result<ServerSummary> {
        let body = server.validated()?;
        self.require_token()?;
        self.send_json(Method::POST, "/servers", &body).await
    }

    /// Change the fields set in `update`; an empty update is rejected locally.
    pub async fn update_server(&self, id: u64, update: &ServerUpdate) -> Result<ServerSummary> {
        let body = update.validated()?;
        self.require_token()?;
        self.send_json(Method::PUT, &format!("/servers/{id}"), &body).await
    }

    pub async fn delete_server(&self, id: u64) -> Result<Ack> {
        self.require_token()?;
        self.delete(&format!("/servers/{id}")).await
    }

    pub async fn server_status(&self, id: u64) -> Result<ServerStatus> {
        self.require_token()?;
        self.get(&format!("/servers/{id}/status")).await
    }

    /// Most recent `limit` lines of one log stream.
    pub async fn server_logs(&self, id: u64, kind: LogKind, limit: u32) -> Result<Vec<ServerLogEntry>> {
        if limit == 0 {
            return Err(SsmError::Validation("limit must be at least 1".into()));
        }
        self.require_token()?;
        let path = format!("/servers/{id}/logs");
        let limit = limit.to_string();
        let builder = self
            .request(Method::GET, &path)
            .query(&[("log_type", kind.as_str()), ("limit", limit.as_str())]);
        self.execute(builder, &path).await
    }

    /// Request a lifecycle change; the backend acknowledges before the
    /// process actually changes state.
    pub async fn server_action(&self, id: u64, action: ServerAction) -> Result<Ack> {
        self.require_token()?;
        let path = format!("/servers/{id}/{}", action.as_path());
        self.send_json(Method::POST, &path, &serde_json::json!({})).await
    }
}
