// src/models/mod.rs

//! Domain models for the extraction framework.
//!
//! This module contains all data structures used throughout the pipeline:
//! the canonical output record, the per-site page plan, the per-run site
//! context, and the application configuration.

mod config;
mod plan;
mod record;
mod site;

// Re-export all public types
pub use config::{Config, ExtractionConfig};
pub use plan::{Continuation, PagePlan, PageRequest, PageRole};
pub use record::{SeedingTorrent, SiteMessage, SiteUserInfo, compute_ratio};
pub use site::SiteContext;
