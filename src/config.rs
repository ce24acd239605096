//! Configuration types.

use std::time::Duration;

use chrono::NaiveDate;

use crate::error::ConfigError;

/// How long the composing indicator is held before a generated reply
/// appears, on top of the real network latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPacing {
    pub enabled: bool,
    pub per_char: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl Default for ReplyPacing {
    fn default() -> Self {
        Self {
            enabled: true,
            per_char: Duration::from_millis(20),
            min: Duration::from_millis(600),
            max: Duration::from_millis(2500),
        }
    }
}

impl ReplyPacing {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Hold time for `text`: proportional to its length, clamped to `[min, max]`.
    pub fn delay_for(&self, text: &str) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let chars = text.chars().count() as u32;
        self.per_char
            .saturating_mul(chars)
            .clamp(self.min, self.max.max(self.min))
    }
}

/// Dialog engine configuration.
#[derive(Debug, Clone, Default)]
pub struct DialogConfig {
    pub reply_pacing: ReplyPacing,
    /// Date whose month the calendar opens on. `None` means the local date.
    pub today: Option<NaiveDate>,
    /// Upper bound on generated reply length.
    pub max_reply_tokens: Option<u64>,
}

impl DialogConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut pacing = ReplyPacing::default();

        if let Ok(value) = std::env::var("CONCIERGE_PACING") {
            pacing.enabled = !matches!(value.trim().to_lowercase().as_str(), "off" | "0" | "false");
        }
        if let Some(ms) = env_millis("CONCIERGE_PACING_MS_PER_CHAR")? {
            pacing.per_char = ms;
        }
        if let Some(ms) = env_millis("CONCIERGE_PACING_MIN_MS")? {
            pacing.min = ms;
        }
        if let Some(ms) = env_millis("CONCIERGE_PACING_MAX_MS")? {
            pacing.max = ms;
        }

        let today = match std::env::var("CONCIERGE_TODAY") {
            Ok(value) => Some(NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(
                |e| ConfigError::InvalidValue {
                    key: "CONCIERGE_TODAY".to_string(),
                    message: e.to_string(),
                },
            )?),
            Err(_) => None,
        };

        let max_reply_tokens = match std::env::var("CONCIERGE_MAX_REPLY_TOKENS") {
            Ok(value) => Some(value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "CONCIERGE_MAX_REPLY_TOKENS".to_string(),
                message: format!("'{value}' is not a number"),
            })?),
            Err(_) => None,
        };

        Ok(Self {
            reply_pacing: pacing,
            today,
            max_reply_tokens,
        })
    }
}

fn env_millis(key: &str) -> Result<Option<Duration>, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{value}' is not a number of milliseconds"),
            }),
        Err(_) => Ok(None),
    }
}
