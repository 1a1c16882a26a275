use std::{env, time::Duration};

use url::Url;

use crate::{
    BACKEND_POLL_ENV, BACKEND_TIMEOUT_ENV, BACKEND_URL_ENV, DEFAULT_BACKEND_URL,
    HEALTH_CHECK_INTERVAL_MS, HEALTH_CHECK_PATH, HEALTH_CHECK_TIMEOUT_MS,
    HEALTH_PROBE_TIMEOUT_MS,
};

/// Everything the supervisor needs to know about where the backend lives and how patiently to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub startup_timeout: Duration,
    pub probe_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            poll_interval: Duration::from_millis(HEALTH_CHECK_INTERVAL_MS),
            startup_timeout: Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS),
            probe_timeout: Duration::from_millis(HEALTH_PROBE_TIMEOUT_MS),
        }
    }
}

impl BackendConfig {
    pub fn from_env() -> Self {
        Self::from_overrides(
            env::var(BACKEND_URL_ENV).ok().as_deref(),
            env::var(BACKEND_POLL_ENV).ok().as_deref(),
            env::var(BACKEND_TIMEOUT_ENV).ok().as_deref(),
        )
    }

    pub fn from_overrides(
        url: Option<&str>,
        poll_ms: Option<&str>,
        timeout_ms: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            base_url: normalize_backend_url(url.unwrap_or(DEFAULT_BACKEND_URL), DEFAULT_BACKEND_URL),
            poll_interval: parse_positive_millis(poll_ms).unwrap_or(defaults.poll_interval),
            startup_timeout: parse_positive_millis(timeout_ms).unwrap_or(defaults.startup_timeout),
            probe_timeout: defaults.probe_timeout,
        }
    }

    pub fn health_check_url(&self) -> String {
        join_backend_path(&self.base_url, HEALTH_CHECK_PATH)
    }

    /// Port the backend should bind, derived from the base URL.
    pub fn port(&self) -> u16 {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.port_or_known_default())
            .unwrap_or(crate::DEFAULT_BACKEND_PORT)
    }
}

fn parse_positive_millis(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
}

pub fn normalize_backend_url(raw: &str, default_url: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default_url.to_string();
    }

    match Url::parse(trimmed) {
        Ok(mut parsed) if matches!(parsed.scheme(), "http" | "https") => {
            if parsed.path().is_empty() {
                parsed.set_path("/");
            }
            parsed.to_string()
        }
        _ => default_url.to_string(),
    }
}

pub fn join_backend_path(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
