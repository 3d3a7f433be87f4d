//! Client configuration for the real HTTP transport.

use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for `HttpCourseClient`.
#[derive(Debug, Clone)]
pub struct CourseApiConfig {
    /// Base URL of the persistence API, without trailing slash.
    pub base_url: String,
    /// Bearer token attached to every request.
    pub api_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {var}: {value}")]
    InvalidVar { var: &'static str, value: String },
}

impl CourseApiConfig {
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build a configuration from `COURSELOOM_API_URL`,
    /// `COURSELOOM_API_TOKEN` and (optionally)
    /// `COURSELOOM_API_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("COURSELOOM_API_URL")
            .map_err(|_| ConfigError::MissingVar("COURSELOOM_API_URL"))?;
        let api_token = std::env::var("COURSELOOM_API_TOKEN")
            .map_err(|_| ConfigError::MissingVar("COURSELOOM_API_TOKEN"))?;

        let mut config = Self::new(base_url, api_token);
        if let Ok(raw) = std::env::var("COURSELOOM_API_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidVar {
                var: "COURSELOOM_API_TIMEOUT_SECS",
                value: raw,
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let config = CourseApiConfig::new("https://api.example.com/", "token");
        assert_eq!(config.base_url, "https://api.example.com");
    }

    #[test]
    fn default_timeout_applies() {
        let config = CourseApiConfig::new("https://api.example.com", "token");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
