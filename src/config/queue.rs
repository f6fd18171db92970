//! Queue configuration structures.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::priority::DEFAULT_PRIORITIES;
use crate::core::AppResult;

/// Environment variable overriding [`QueueConfig::retry_delay_ms`].
pub const ENV_RETRY_DELAY_MS: &str = "SIGNALING_QUEUE_RETRY_DELAY_MS";
/// Environment variable overriding [`QueueConfig::settle_delay_ms`].
pub const ENV_SETTLE_DELAY_MS: &str = "SIGNALING_QUEUE_SETTLE_DELAY_MS";
/// Environment variable overriding [`QueueConfig::priorities`] (comma separated).
pub const ENV_PRIORITIES: &str = "SIGNALING_QUEUE_PRIORITIES";

/// Queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Operation names in priority order, most important first.
    pub priorities: Vec<String>,
    /// Delay before re-polling when the head task is not ready.
    pub retry_delay_ms: u64,
    /// Delay before polling after an enqueue or a successful settle.
    pub settle_delay_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            priorities: DEFAULT_PRIORITIES.iter().map(ToString::to_string).collect(),
            retry_delay_ms: 100,
            settle_delay_ms: 5,
        }
    }
}

impl QueueConfig {
    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Describes the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.retry_delay_ms == 0 {
            return Err("retry_delay_ms must be greater than 0".into());
        }
        if self.settle_delay_ms == 0 {
            return Err("settle_delay_ms must be greater than 0".into());
        }
        let mut seen = HashSet::new();
        for name in &self.priorities {
            if name.trim().is_empty() {
                return Err("priority names must not be empty".into());
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("priority `{name}` listed more than once"));
            }
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// Parse or validation failure.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SIGNALING_QUEUE_*` variables, after loading `.env`.
    ///
    /// # Errors
    ///
    /// A variable is set but unparseable, or the result fails validation.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var(ENV_RETRY_DELAY_MS) {
            cfg.retry_delay_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_RETRY_DELAY_MS}={raw}"))?;
        }
        if let Ok(raw) = std::env::var(ENV_SETTLE_DELAY_MS) {
            cfg.settle_delay_ms = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SETTLE_DELAY_MS}={raw}"))?;
        }
        if let Ok(raw) = std::env::var(ENV_PRIORITIES) {
            cfg.priorities = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// [`Self::retry_delay_ms`] as a duration.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// [`Self::settle_delay_ms`] as a duration.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
