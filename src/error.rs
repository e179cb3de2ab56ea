// src/error.rs

//! Unified error handling for the extraction framework.

use std::fmt;

use thiserror::Error;

use crate::models::PageRole;

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// No registered extractor matched the classification page
    #[error("unsupported site: no registered extractor matched")]
    UnsupportedSite,

    /// Page locator could not resolve a mandatory role
    #[error("incomplete page map for scheme '{scheme}': cannot resolve {role} page")]
    PageMap { scheme: String, role: PageRole },

    /// Network/HTTP failure while fetching a page
    #[error("fetch failed for {role} page: {message}")]
    Fetch { role: PageRole, message: String },

    /// Mandatory-field parse failure
    #[error("parse failed for scheme '{scheme}' on {role} page: {message}")]
    Parse {
        scheme: String,
        role: PageRole,
        message: String,
    },

    /// Run aborted by the caller (shutdown or global timeout)
    #[error("extraction cancelled for site '{site}'")]
    Cancelled { site: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a page-map error for an unresolvable mandatory role.
    pub fn page_map(scheme: impl Into<String>, role: PageRole) -> Self {
        Self::PageMap {
            scheme: scheme.into(),
            role,
        }
    }

    /// Create a fetch error with role context.
    pub fn fetch(role: PageRole, message: impl fmt::Display) -> Self {
        Self::Fetch {
            role,
            message: message.to_string(),
        }
    }

    /// Create a parse error with scheme and role context.
    pub fn parse(scheme: impl Into<String>, role: PageRole, message: impl fmt::Display) -> Self {
        Self::Parse {
            scheme: scheme.into(),
            role,
            message: message.to_string(),
        }
    }

    /// Create a cancellation error for a site run.
    pub fn cancelled(site: impl Into<String>) -> Self {
        Self::Cancelled { site: site.into() }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
