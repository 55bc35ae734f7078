use std::time::Duration;

use crate::errors::AppError;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_PER_PAGE: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_TTL_SECS: u64 = 3600;
const DEFAULT_LOGIN_MAX_FAILURES: usize = 5;
const DEFAULT_LOGIN_WINDOW_SECS: u64 = 900;

/// Runtime settings read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub backend_url: String,
    pub per_page: u32,
    pub request_timeout: Duration,
    pub session_ttl: Duration,
    pub login_max_failures: usize,
    pub login_window: Duration,
    pub session_key: Option<String>,
    pub app_name: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let backend_url = get("KARKUN_BACKEND_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| AppError::Config("KARKUN_BACKEND_URL is not set".to_string()))?;

        Ok(Self {
            bind: get("KARKUN_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            backend_url,
            per_page: parse_or(&get, "KARKUN_PER_PAGE", DEFAULT_PER_PAGE)?,
            request_timeout: Duration::from_secs(parse_or(&get, "KARKUN_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            session_ttl: Duration::from_secs(parse_or(&get, "KARKUN_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?),
            login_max_failures: parse_or(&get, "KARKUN_LOGIN_MAX_FAILURES", DEFAULT_LOGIN_MAX_FAILURES)?,
            login_window: Duration::from_secs(parse_or(&get, "KARKUN_LOGIN_WINDOW_SECS", DEFAULT_LOGIN_WINDOW_SECS)?),
            session_key: get("SESSION_KEY"),
            app_name: get("KARKUN_APP_NAME").unwrap_or_else(|| "Karkun Portal".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} has an invalid value: {raw}"))),
    }
}
