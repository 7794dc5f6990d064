//! Generate module - Produces a fresh recipe when both caches miss
//!
//! Provides:
//! - The fixed prompt and response schema
//! - Fence stripping and strict parsing of the generator's text
//! - The Gemini `generateContent` client

pub mod gemini;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::core::model::{Recipe, RecipeShapeError};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation service is not configured")]
    NotConfigured,

    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation service returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("generation service returned an empty response")]
    Empty,

    #[error("generated text is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("generated recipe is malformed: {0}")]
    Shape(#[from] RecipeShapeError),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// Content generation service
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self) -> Result<Recipe, GenerateError>;
}
