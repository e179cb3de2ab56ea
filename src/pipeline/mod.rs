//! Pipeline entry points for extraction runs.
//!
//! - `Orchestrator`: drives one site through the fixed extraction pipeline
//! - `Phase`: pipeline progress marker used for logging and diagnostics

mod orchestrator;

pub use orchestrator::{Orchestrator, Phase};
