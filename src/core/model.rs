//! Recipe model
//!
//! Every stage of the pipeline (local cache, shared store, generator) maps its
//! payload to a [`Recipe`] through [`Recipe::from_value`] or
//! [`Recipe::from_generated`] before handing it on.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Wire names of the six recipe fields, in display order
pub const RECIPE_FIELDS: [&str; 6] = [
    "title",
    "description",
    "ingredients",
    "instructions",
    "benefits",
    "quickTip",
];

/// Preparation steps as returned by the generator.
///
/// The response schema asks for a list, but a single text block is also
/// accepted and kept as-is until the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instructions {
    Steps(Vec<String>),
    Block(String),
}

impl Default for Instructions {
    fn default() -> Self {
        Instructions::Steps(Vec::new())
    }
}

impl Instructions {
    /// Normalize to an ordered list of steps
    pub fn to_steps(&self) -> Vec<String> {
        match self {
            Instructions::Steps(steps) => steps.clone(),
            Instructions::Block(text) if text.trim().is_empty() => Vec::new(),
            Instructions::Block(text) => vec![text.trim().to_string()],
        }
    }
}

/// The daily snack recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub instructions: Instructions,

    /// Required: a recipe without a benefits list is not a recipe
    pub benefits: Vec<String>,

    #[serde(default)]
    pub quick_tip: String,
}

/// Reasons a payload was rejected as a recipe
#[derive(Debug, Error)]
pub enum RecipeShapeError {
    #[error("recipe payload is not a JSON object")]
    NotAnObject,

    #[error("recipe payload has no `benefits` field")]
    MissingBenefits,

    #[error("recipe field `benefits` is not a list")]
    BenefitsNotSequence,

    #[error("recipe payload is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("recipe payload has a malformed field: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Recipe {
    /// Decode a cached payload. Only the `benefits` invariant is enforced
    /// beyond field types.
    pub fn from_value(value: Value) -> Result<Self, RecipeShapeError> {
        check_benefits(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Decode a freshly generated payload, which must carry all six fields.
    pub fn from_generated(value: Value) -> Result<Self, RecipeShapeError> {
        check_benefits(&value)?;
        if let Value::Object(map) = &value {
            if let Some(missing) = RECIPE_FIELDS.iter().find(|f| !map.contains_key(**f)) {
                return Err(RecipeShapeError::MissingField(*missing));
            }
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn check_benefits(value: &Value) -> Result<(), RecipeShapeError> {
    let map = value.as_object().ok_or(RecipeShapeError::NotAnObject)?;
    match map.get("benefits") {
        None => Err(RecipeShapeError::MissingBenefits),
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(RecipeShapeError::BenefitsNotSequence),
    }
}

/// A recipe as handed to the UI: instructions are always a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeView {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub benefits: Vec<String>,
    pub quick_tip: String,
}

impl From<&Recipe> for RecipeView {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.to_steps(),
            benefits: recipe.benefits.clone(),
            quick_tip: recipe.quick_tip.clone(),
        }
    }
}

/// Which stage produced the recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Local,
    Shared,
    Generated,
    None,
}

/// Error information attached to a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportError {
    pub code: String,
    pub message: String,
}

impl ReportError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Outcome of `receita today`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeReport {
    pub date_key: String,
    pub freshness_tag: String,
    pub source: Source,
    pub recipe: Option<RecipeView>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ReportError>,
}

#[cfg(test)]
pub(crate) fn sample_recipe() -> Recipe {
    Recipe {
        title: "Espeto de Frutas".to_string(),
        description: "Espetinhos coloridos de frutas frescas".to_string(),
        ingredients: vec!["morango".to_string(), "banana".to_string()],
        instructions: Instructions::Steps(vec![
            "Corte as frutas".to_string(),
            "Monte no espeto".to_string(),
        ]),
        benefits: vec!["Vitamina C".to_string()],
        quick_tip: "Sirva gelado".to_string(),
    }
}
