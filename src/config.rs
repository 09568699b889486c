//! Application configuration.
//!
//! Loaded from TOML, then overlaid with environment variables:
//!
//! ```toml
//! key = "a long random secret"
//! bind = "127.0.0.1:8000"
//! token_window_secs = 600
//! password_iterations = 100000
//! ```
//!
//! | Variable   | Overrides |
//! |------------|-----------|
//! | `APP_KEY`  | `key`     |
//! | `APP_BIND` | `bind`    |

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::auth::DEFAULT_ITERATIONS;
use crate::error::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_TOKEN_WINDOW_SECS: u64 = 600;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Secret used to sign session cookies and confirmation links.
    pub key: String,
    #[serde(default = "default_bind")]
    pub bind: String,
    /// How long a confirmation link stays valid.
    #[serde(default = "default_token_window")]
    pub token_window_secs: u64,
    #[serde(default = "default_iterations")]
    pub password_iterations: u32,
}

fn default_bind() -> String { DEFAULT_BIND.to_owned() }
fn default_token_window() -> u64 { DEFAULT_TOKEN_WINDOW_SECS }
fn default_iterations() -> u32 { DEFAULT_ITERATIONS }

impl Config {
    /// A config with `key` and every other field at its default.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            bind: default_bind(),
            token_window_secs: DEFAULT_TOKEN_WINDOW_SECS,
            password_iterations: DEFAULT_ITERATIONS,
        }
    }

    pub fn from_toml(source: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path`, applies the process environment, and validates.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&source)?;
        let config = config.overlay(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `APP_KEY` / `APP_BIND` as returned by `lookup`.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("APP_KEY") {
            self.key = key;
        }
        if let Some(bind) = lookup("APP_BIND") {
            self.bind = bind;
        }
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.key.trim().is_empty() {
            return Err(Error::Config("`key` must not be empty".to_owned()));
        }
        if self.token_window_secs == 0 {
            return Err(Error::Config("`token_window_secs` must be positive".to_owned()));
        }
        if self.password_iterations == 0 {
            return Err(Error::Config("`password_iterations` must be positive".to_owned()));
        }
        Ok(())
    }

    pub fn token_window(&self) -> Duration {
        Duration::from_secs(self.token_window_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = Config::from_toml(r#"key = "secret""#).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.token_window(), Duration::from_secs(600));
        assert_eq!(config.password_iterations, DEFAULT_ITERATIONS);
    }

    #[test]
    fn rejects_missing_or_empty_key() {
        assert!(matches!(Config::from_toml("bind = \"0.0.0.0:1\""), Err(Error::Config(_))));
        assert!(matches!(Config::from_toml(r#"key = "  ""#), Err(Error::Config(_))));
        assert!(matches!(
            Config::from_toml("key = \"k\"\ntoken_window_secs = 0"),
            Err(Error::Config(_)),
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let config = Config::new("from-file").overlay(|name| match name {
            "APP_KEY" => Some("from-env".to_owned()),
            _ => None,
        });
        assert_eq!(config.key, "from-env");
        assert_eq!(config.bind, DEFAULT_BIND);
    }
}
