//! Per-run site context supplied by the caller.

use serde::{Deserialize, Serialize};

/// Read-only inputs for one extraction run: where the site lives and the
/// pre-authenticated credential context. The framework never mutates this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteContext {
    /// Site display name
    pub name: String,

    /// Base URL, e.g. `https://audiences.me/`
    pub base_url: String,

    /// Session cookie string, already negotiated by the caller
    #[serde(default)]
    pub cookie: Option<String>,

    /// Extra headers to send with every request to this site
    #[serde(default)]
    pub headers: Vec<(String, String)>,

    /// Detail-page URL cached from a prior run, if known
    #[serde(default)]
    pub detail_page_hint: Option<String>,
}

impl SiteContext {
    /// Create a context with no credentials.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            cookie: None,
            headers: Vec::new(),
            detail_page_hint: None,
        }
    }
}
