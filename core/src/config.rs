//! Client configuration.
//!
//! `ClientConfig` is built once by the caller (usually at process start via
//! `from_env`) and handed to `ApiClient::new`. The client itself never reads
//! the environment.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4321/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_ENV: &str = "PUBLIC_API_URL";
pub const TIMEOUT_ENV: &str = "API_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix every request path is appended to, verbatim.
    pub base_url: String,
    /// Upper bound on a whole request/response exchange.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `PUBLIC_API_URL` and `API_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.is_empty()) {
            config.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(value = %raw, "ignoring invalid {TIMEOUT_ENV}"),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config.base_url, "http://localhost:4321/api");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_base_url_and_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "https://facilities.example.edu/api"),
            (TIMEOUT_ENV, "5"),
        ]));
        assert_eq!(config.base_url, "https://facilities.example.edu/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        let config = ClientConfig::from_lookup(lookup(&[(TIMEOUT_ENV, "0")]));
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn empty_base_url_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "")]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}
