use thiserror::Error;

/// Top-level error type used across every `ssm` crate.
#[derive(Debug, Error)]
pub enum SsmError {
    #[error("config error: {0}")]
    Config(String),

    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status other than 401/403.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Missing, invalid or expired bearer token. Callers send the user back
    /// to the login flow; there is no automatic refresh.
    #[error("not authenticated: {0}")]
    Unauthorized(String),

    /// The local session does not carry the role an action requires.
    #[error("permission denied: {0}")]
    Forbidden(String),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("session error: {0}")]
    Session(String),

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SsmError {
    /// `true` when the caller should drop its session and re-authenticate.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

pub type Result<T, E = SsmError> = std::result::Result<T, E>;
