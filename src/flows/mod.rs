//! Flows module - Command handlers built on the pipeline
//!
//! Provides:
//! - today: resolve and render the daily recipe
//! - cache: inspect or reset the local cache
//! - prompt: show the generator request
//! - doctor: report configuration status

pub mod cache;
pub mod doctor;
pub mod prompt;
pub mod today;
