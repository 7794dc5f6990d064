//! The fixed request sent to the generation service

use serde_json::{json, Value};

use crate::core::model::RECIPE_FIELDS;

/// Instruction sent verbatim on every generation
pub const RECIPE_PROMPT: &str = "Crie uma receita de lanche saudável para crianças, \
usando frutas e sem açúcar adicionado. A receita deve ser simples, divertida e \
fácil de preparar em casa. Responda com: um título curto, uma descrição breve do \
lanche, a lista de ingredientes, a lista de passos do modo de preparo, a lista de \
benefícios nutricionais e uma dica rápida de montagem.";

/// Response schema: six required fields matching the recipe shape
pub fn response_schema() -> Value {
    let list = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    let text = json!({ "type": "STRING" });

    json!({
        "type": "OBJECT",
        "properties": {
            "title": text,
            "description": text,
            "ingredients": list,
            "instructions": list,
            "benefits": list,
            "quickTip": text,
        },
        "required": RECIPE_FIELDS,
        "propertyOrdering": RECIPE_FIELDS,
    })
}
