//! Page plan: which data pages a site exposes and how to request them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Logical data page of the extraction pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRole {
    /// Landing page used for classification and login checks
    Landing,
    /// Identity page (userid, username, unread count)
    BaseInfo,
    /// Upload/download totals page
    Traffic,
    /// Level, join date and bonus page
    Detail,
    /// Unread-message listing page
    MailUnread,
    /// Paginated seeding-torrent listing
    Seeding,
}

impl fmt::Display for PageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PageRole::Landing => "landing",
            PageRole::BaseInfo => "base-info",
            PageRole::Traffic => "traffic",
            PageRole::Detail => "detail",
            PageRole::MailUnread => "mail-unread",
            PageRole::Seeding => "seeding",
        };
        f.write_str(name)
    }
}

/// One request to the external HTTP collaborator: a path relative to the
/// site base URL, query parameters, and extra headers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,

    #[serde(default)]
    pub params: Vec<(String, String)>,

    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl PageRequest {
    /// Create a request for a relative path with no params or headers.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a request header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// Mapping from page role to request, computed per site per run.
///
/// A `None` entry means the site lacks that capability (e.g., no seeding
/// API, or traffic folded into the base-info endpoint).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePlan {
    pub base_info: Option<PageRequest>,
    pub traffic: Option<PageRequest>,
    pub detail: Option<PageRequest>,
    pub mail_unread: Option<PageRequest>,
    pub seeding: Option<PageRequest>,
}

impl PagePlan {
    /// Look up the request for a role, if the site supports it.
    pub fn get(&self, role: PageRole) -> Option<&PageRequest> {
        match role {
            PageRole::BaseInfo => self.base_info.as_ref(),
            PageRole::Traffic => self.traffic.as_ref(),
            PageRole::Detail => self.detail.as_ref(),
            PageRole::MailUnread => self.mail_unread.as_ref(),
            PageRole::Seeding => self.seeding.as_ref(),
            PageRole::Landing => None,
        }
    }

    /// Look up a mandatory role, failing with a page-map error when absent.
    pub fn require(&self, role: PageRole, scheme: &str) -> Result<&PageRequest> {
        self.get(role).ok_or_else(|| AppError::page_map(scheme, role))
    }
}

/// Seeding-pagination cursor returned by one seeding-page parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Fetch this request next
    Next(PageRequest),
    /// Pagination exhausted
    Done,
}
