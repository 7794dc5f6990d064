//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - The recipe model and the report handed to renderers
//! - Calendar-day keys and clocks
//! - Runtime configuration
//! - Rendering functions for different output formats
//! - Storage paths and small utilities

pub mod config;
pub mod date;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
