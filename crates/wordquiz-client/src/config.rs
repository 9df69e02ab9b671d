//! Client configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wordquiz_core::{ControllerConfig, SessionContext};

use crate::http::{HttpBackend, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::token_store::FileTokenStore;

/// Top-level wordquiz configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordquizConfig {
    /// Base URL of the backend; `/api/*` paths are appended to it.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Where the session token is persisted.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Delay before the next question after a recorded answer, in milliseconds.
    #[serde(default = "default_advance_delay")]
    pub advance_delay_ms: u64,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_advance_delay() -> u64 {
    wordquiz_core::controller::AUTO_ADVANCE_DELAY.as_millis() as u64
}

impl Default for WordquizConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token_file: None,
            request_timeout_secs: default_timeout(),
            advance_delay_ms: default_advance_delay(),
        }
    }
}

impl WordquizConfig {
    /// The configured token file, or `~/.config/wordquiz/session.json`.
    pub fn token_path(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(|| {
            dirs_path()
                .unwrap_or_else(|| PathBuf::from(".wordquiz"))
                .join("session.json")
        })
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            advance_delay: Duration::from_millis(self.advance_delay_ms),
        }
    }

    /// Session context backed by the configured token file.
    pub fn session(&self) -> SessionContext {
        SessionContext::new(Arc::new(FileTokenStore::new(self.token_path())))
    }

    /// HTTP backend pointed at the configured API.
    pub fn backend(&self) -> Result<HttpBackend> {
        HttpBackend::new(
            &self.api_url,
            Duration::from_secs(self.request_timeout_secs),
        )
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Expand a leading `~/` to `$HOME`.
fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), std::env::var("HOME")) {
        (Ok(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Load config from an explicit path, or search the well-known paths:
/// `wordquiz.toml` in the current directory, then `~/.config/wordquiz/config.toml`.
///
/// Environment variable overrides: `WORDQUIZ_API_URL`, `WORDQUIZ_TOKEN_FILE`.
pub fn load_config_from(path: Option<&Path>) -> Result<WordquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("wordquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<WordquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("WORDQUIZ_API_URL") {
        config.api_url = url;
    }
    if let Ok(file) = std::env::var("WORDQUIZ_TOKEN_FILE") {
        config.token_file = Some(PathBuf::from(file));
    }

    config.api_url = resolve_env_vars(&config.api_url);
    config.token_file = config
        .token_file
        .as_ref()
        .map(|p| expand_home(Path::new(&resolve_env_vars(&p.to_string_lossy()))));

    anyhow::ensure!(
        config.request_timeout_secs > 0,
        "request_timeout_secs must be at least 1"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordquiz"))
}
