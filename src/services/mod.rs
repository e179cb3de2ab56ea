//! Service layer for the extraction framework.
//!
//! This module contains the external collaborators around the pure pipeline:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Concurrent multi-site execution (`StatsRunner`)

mod fetch;
mod runner;

pub use fetch::{HttpFetcher, PageFetcher};
pub use runner::{RunOutcome, StatsRunner};
