//! Turning generator output into a recipe

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::core::model::Recipe;
use crate::generate::GenerateError;

/// Opening fence line, with an optional language tag
static OPEN_FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*```[\w-]*[ \t]*\r?\n?").expect("Invalid OPEN_FENCE_RE regex")
});

/// Closing fence at the very end of the text
static CLOSE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?```\s*$").expect("Invalid CLOSE_FENCE_RE regex"));

/// Remove a wrapping Markdown code fence and surrounding whitespace.
/// Backticks inside the payload are left alone.
pub fn strip_code_fences(text: &str) -> String {
    let opened = OPEN_FENCE_RE.replace(text, "");
    CLOSE_FENCE_RE.replace(&opened, "").trim().to_string()
}

/// Parse the raw text returned by the generator
pub fn parse_generated(text: &str) -> Result<Recipe, GenerateError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(GenerateError::Empty);
    }
    let value: Value = serde_json::from_str(&body)?;
    Ok(Recipe::from_generated(value)?)
}
