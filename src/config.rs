// src/config.rs
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::client::csrf::{CsrfSigner, DEFAULT_CSRF_COOKIE};
use crate::errors::{DashboardError, Result};
use crate::table::TableOptions;

/// Application configuration.
///
/// Values come from an optional TOML file named by `JOBWATCH_CONFIG`, then
/// `JOBWATCH_*` environment variables override individual keys.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Root URL of the job service, e.g. `http://localhost:8000/avi/`
    pub upstream: String,

    pub poll_interval_ms: u64,

    /// Address the dashboard listens on
    pub bind: String,

    pub page_size: usize,

    /// Clamp progress to [0, 100] instead of showing what the service reports
    pub clamp_progress: bool,

    /// Poll even when nobody is watching
    pub always_visible: bool,

    /// Name of the cookie holding the CSRF token
    pub csrf_cookie: String,

    /// Raw `Cookie` header of an authenticated session
    pub cookies: Option<String>,

    /// CSRF token to send as-is. Takes precedence over the cookie.
    pub csrf_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upstream: String::new(),
            poll_interval_ms: 3000,
            bind: "0.0.0.0:8080".to_string(),
            page_size: 10,
            clamp_progress: false,
            always_visible: false,
            csrf_cookie: DEFAULT_CSRF_COOKIE.to_string(),
            cookies: None,
            csrf_token: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional TOML file and environment variables
    pub fn from_env() -> Result<Self> {
        let base = match std::env::var("JOBWATCH_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        let config = base.with_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `JOBWATCH_*` overrides read through `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(upstream) = lookup("JOBWATCH_UPSTREAM") {
            self.upstream = upstream;
        }
        if let Some(raw) = lookup("JOBWATCH_POLL_INTERVAL_MS") {
            self.poll_interval_ms = parse_number("JOBWATCH_POLL_INTERVAL_MS", &raw)?;
        }
        if let Some(bind) = lookup("JOBWATCH_BIND") {
            self.bind = bind;
        }
        if let Some(raw) = lookup("JOBWATCH_PAGE_SIZE") {
            self.page_size = parse_number("JOBWATCH_PAGE_SIZE", &raw)?;
        }
        if let Some(raw) = lookup("JOBWATCH_CLAMP_PROGRESS") {
            self.clamp_progress = parse_flag("JOBWATCH_CLAMP_PROGRESS", &raw)?;
        }
        if let Some(raw) = lookup("JOBWATCH_ALWAYS_VISIBLE") {
            self.always_visible = parse_flag("JOBWATCH_ALWAYS_VISIBLE", &raw)?;
        }
        if let Some(name) = lookup("JOBWATCH_CSRF_COOKIE") {
            self.csrf_cookie = name;
        }
        if let Some(cookies) = lookup("JOBWATCH_COOKIES") {
            self.cookies = Some(cookies);
        }
        if let Some(token) = lookup("JOBWATCH_CSRF_TOKEN") {
            self.csrf_token = Some(token);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.upstream.trim().is_empty() {
            return Err(DashboardError::Config(
                "No job service configured. Please set JOBWATCH_UPSTREAM.".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(DashboardError::Config("page_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            page_size: self.page_size,
            clamp_progress: self.clamp_progress,
        }
    }

    pub fn csrf_signer(&self) -> CsrfSigner {
        if let Some(token) = self.csrf_token.as_deref().filter(|t| !t.is_empty()) {
            return CsrfSigner::new(Some(token.to_string()));
        }
        match &self.cookies {
            Some(header) => CsrfSigner::from_cookie_header(&self.csrf_cookie, header),
            None => CsrfSigner::default(),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DashboardError::Config(format!("{} must be a number, got '{}'", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DashboardError::Config(format!("{} must be true or false, got '{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(3));
        assert_eq!(config.page_size, 10);
        assert!(!config.clamp_progress);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_then_env_overrides() {
        let config = AppConfig::from_toml_str(
            r#"
            upstream = "http://localhost:8000/avi/"
            poll_interval_ms = 5000
            clamp_progress = true
            "#,
        )
        .unwrap()
        .with_overrides(lookup(&[
            ("JOBWATCH_POLL_INTERVAL_MS", "1500"),
            ("JOBWATCH_ALWAYS_VISIBLE", "yes"),
        ]))
        .unwrap();

        assert_eq!(config.upstream, "http://localhost:8000/avi/");
        assert_eq!(config.poll_interval_ms, 1500);
        assert!(config.clamp_progress);
        assert!(config.always_visible);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = AppConfig::default()
            .with_overrides(lookup(&[("JOBWATCH_POLL_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));

        let zero = AppConfig {
            upstream: "http://localhost:8000/".to_string(),
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(matches!(zero.validate(), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_csrf_signer_from_cookies() {
        let config = AppConfig {
            cookies: Some("sessionid=s; csrftoken=abc".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.csrf_signer().token(), Some("abc"));
    }

    #[test]
    fn test_csrf_token_override_beats_cookie() {
        let config = AppConfig {
            cookies: Some("csrftoken=from-cookie".to_string()),
            ..AppConfig::default()
        }
        .with_overrides(lookup(&[("JOBWATCH_CSRF_TOKEN", "from-env")]))
        .unwrap();

        assert_eq!(config.csrf_token.as_deref(), Some("from-env"));
        assert_eq!(config.csrf_signer().token(), Some("from-env"));
    }
}
