pub mod schema;

pub use schema::{ApiConfig, PollerConfig, SessionConfig, SsmConfig};

use ssm_core::{Result, SsmError};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file.  Returns `SsmConfig::default()` if
/// the file doesn't exist so the client always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<SsmConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(SsmConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| SsmError::Config(format!("cannot read '{}': {e}", path.display())))?;

    let config: SsmConfig =
        toml::from_str(&raw).map_err(|e| SsmError::Config(format!("TOML parse error: {e}")))?;
    config.validate()?;
    Ok(config)
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config").join("ssm").join("ssm.toml")
}

/// Return the default session snapshot path, honouring `$XDG_STATE_HOME`.
pub fn default_session_path() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", ".local/state").join("ssm").join("session.json")
}

/// Session path from config, falling back to [`default_session_path`].
pub fn session_path(config: &SsmConfig) -> PathBuf {
    config.session.path.clone().unwrap_or_else(default_session_path)
}

fn xdg_dir(var: &str, home_fallback: &str) -> PathBuf {
    std::env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(home_fallback)
        })
}
