use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ssm_config::ApiConfig;
use ssm_core::{GitStatus, Result, SsmError, SystemHistory, SystemInfo};
use tracing::debug;

/// Route prefixes whose handlers read the session from a `token` query
/// parameter rather than the `Authorization` header.
const QUERY_TOKEN_ROUTES: [&str; 2] = ["/tokens", "/notifications"];

/// REST client for the server-manager backend.
///
/// Cheap to clone: the underlying connection pool is shared. The bearer token
/// is attached to every request once set, and repeated as `?token=` on the
/// routes listed in [`QUERY_TOKEN_ROUTES`]. Endpoints that need it fail with
/// [`SsmError::Unauthorized`] before touching the network when it is absent.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http:     reqwest::Client,
    base_url: String,
    token:    Option<String>,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ack {
    pub message: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SsmError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to subsequent requests.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── System ───────────────────────────────────────────────────────────────

    /// Instantaneous CPU / memory / disk / network counters.
    pub async fn system_info(&self) -> Result<SystemInfo> {
        self.get("/system/info").await
    }

    /// Long-horizon aggregates for the history charts.
    pub async fn system_history(&self) -> Result<SystemHistory> {
        self.get("/system/history").await
    }

    // ── Dashboard ────────────────────────────────────────────────────────────

    pub async fn git_status(&self) -> Result<GitStatus> {
        self.get("/dashboard/git-status").await
    }

    /// Ask the backend to pull and apply updates; returns once accepted.
    pub async fn git_update(&self) -> Result<Ack> {
        self.send_json(Method::POST, "/dashboard/git-update", &serde_json::json!({}))
            .await
    }

    // ── Plumbing ─────────────────────────────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        let Some(token) = &self.token else {
            return builder;
        };
        let builder = builder.bearer_auth(token);
        if QUERY_TOKEN_ROUTES.iter().any(|prefix| path.starts_with(prefix)) {
            builder.query(&[("token", token)])
        } else {
            builder
        }
    }

    /// Fail fast when an endpoint needs a session and there is none.
    pub(crate) fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(SsmError::Unauthorized("not logged in".into()));
        }
        Ok(())
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.request(Method::GET, path), path).await
    }

    pub(crate) async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(method, path).json(body), path).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.execute(self.request(Method::DELETE, path), path).await
    }

    pub(crate) async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> Result<T> {
        debug!("→ {path}");
        let response = builder
            .send()
            .await
            .map_err(|e| SsmError::Transport(format!("{path}: {e}")))?;
        decode(response).await
    }
}

/// Map a response onto the crate's error taxonomy and decode 2xx bodies.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SsmError::Transport(format!("reading body: {e}")))?;
        // Empty 2xx bodies decode as JSON `null` so `()`/`Option` targets work.
        let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes[..] };
        return serde_json::from_slice(bytes).map_err(|e| SsmError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED => Err(SsmError::Unauthorized(detail)),
        StatusCode::FORBIDDEN    => Err(SsmError::Forbidden(detail)),
        _ => Err(SsmError::Http {
            status: status.as_u16(),
            detail,
        }),
    }
}

/// Pull the backend's `detail` field out of an error body.
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
