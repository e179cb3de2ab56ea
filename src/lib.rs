// src/lib.rs

//! pt-stats: private-tracker user-statistics extraction framework.
//!
//! A pure transformation library: given pre-authenticated page content and a
//! cookie context for a PT site, it classifies the site family, locates the
//! data pages, parses each one, and produces a canonical
//! [`models::SiteUserInfo`] record. Fetching is delegated to an injected
//! [`services::PageFetcher`] collaborator.

pub mod error;
pub mod extractors;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
