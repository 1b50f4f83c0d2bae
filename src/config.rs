use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Default port when neither PORT nor --port is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Default base URL for the OpenAI REST API.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The moderation model requested upstream unless MODERATION_MODEL overrides it.
pub const DEFAULT_MODERATION_MODEL: &str = "omni-moderation-latest";

/// Base origin used when ALLOWED_ORIGIN is unset.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Local development origins that are always on the allow-list.
pub const FALLBACK_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];

/// Central configuration loaded from environment variables.
///
/// Built once at startup and shared read-only behind an `Arc`. The .env file
/// is loaded automatically by main via dotenvy before this runs.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Bearer credential for the OpenAI API. Empty means "not configured".
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub moderation_model: String,
    /// Upstream request timeout. `None` leaves reqwest's default (no timeout).
    pub openai_timeout: Option<Duration>,
    /// Origins permitted to make cross-origin requests, deduplicated.
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };

        let openai_timeout = match var("OPENAI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.parse::<u64>().with_context(|| {
                    format!("OPENAI_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}")
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let base_origin =
            var("ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            port,
            openai_api_key: var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            moderation_model: var("MODERATION_MODEL")
                .unwrap_or_else(|| DEFAULT_MODERATION_MODEL.to_string()),
            openai_timeout,
            allowed_origins: build_allow_list(&base_origin),
        })
    }

    /// Check that the OpenAI credential is configured.
    /// The server refuses to start without it.
    pub fn require_credential(&self) -> Result<()> {
        if self.openai_api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 The gateway cannot reach the Moderation API without it."
            );
        }
        Ok(())
    }
}

/// Merge the configured base origin(s) with the fixed fallbacks.
///
/// `base` may be a comma-separated list. Trailing slashes are dropped since
/// browsers never send them in the Origin header.
fn build_allow_list(base: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    let candidates = base
        .split(',')
        .map(str::trim)
        .chain(FALLBACK_ORIGINS.iter().copied());

    for origin in candidates {
        let origin = origin.trim_end_matches('/');
        if origin.is_empty() || origins.iter().any(|o| o == origin) {
            continue;
        }
        origins.push(origin.to_string());
    }
    origins
}
