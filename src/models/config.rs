//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteContext;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and extraction behavior settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Sites to extract statistics from
    #[serde(default)]
    pub sites: Vec<SiteContext>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.user_agent.trim().is_empty() {
            return Err(AppError::config("extraction.user_agent is empty"));
        }
        if self.extraction.timeout_secs == 0 {
            return Err(AppError::config("extraction.timeout_secs must be > 0"));
        }
        if self.extraction.run_timeout_secs == 0 {
            return Err(AppError::config("extraction.run_timeout_secs must be > 0"));
        }
        if self.extraction.max_concurrent == 0 {
            return Err(AppError::config("extraction.max_concurrent must be > 0"));
        }
        if self.extraction.seeding_page_cap == 0 {
            return Err(AppError::config("extraction.seeding_page_cap must be > 0"));
        }
        for site in &self.sites {
            if site.name.trim().is_empty() {
                return Err(AppError::config("site with empty name"));
            }
            url::Url::parse(&site.base_url).map_err(|e| {
                AppError::config(format!("site '{}': invalid base_url: {}", site.name, e))
            })?;
        }
        Ok(())
    }
}

/// HTTP client and extraction behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Global timeout for one site's whole run, in seconds.
    /// Expiry cancels that run only.
    #[serde(default = "defaults::run_timeout")]
    pub run_timeout_secs: u64,

    /// Delay between completed runs in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent site runs
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Hard cap on seeding-list pages per run, regardless of what the
    /// site's continuation signals claim
    #[serde(default = "defaults::seeding_page_cap")]
    pub seeding_page_cap: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            run_timeout_secs: defaults::run_timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            seeding_page_cap: defaults::seeding_page_cap(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; pt-stats/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn run_timeout() -> u64 {
        300
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn seeding_page_cap() -> usize {
        50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.extraction.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_page_cap() {
        let mut config = Config::default();
        config.extraction.seeding_page_cap = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_site_url() {
        let mut config = Config::default();
        config.sites.push(SiteContext::new("broken", "not a url"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn parse_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [[sites]]
            name = "example"
            base_url = "https://example.com/"
            cookie = "uid=1; pass=abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.sites.len(), 1);
        assert_eq!(config.extraction.seeding_page_cap, 50);
        assert!(config.validate().is_ok());
    }
}
