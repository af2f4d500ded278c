//! Tool catalog adapter
//!
//! Converts provider-side [`ToolDescriptor`]s into the function specs a
//! function-calling chat model accepts:
//!
//! ```json
//! { "type": "function",
//!   "function": { "name": "...", "description": "...", "parameters": { ... } } }
//! ```
//!
//! The conversion is pure: no I/O, no validation of the schema, same input
//! gives the same output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entities::ToolDescriptor;
use super::value_objects::MISSING_DESCRIPTION;

/// Kind tag of a model tool spec. Only functions exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Function,
}

/// Function part of a [`ModelToolSpec`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool definition in the format the model provider expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelToolSpec {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub function: FunctionSpec,
}

impl ModelToolSpec {
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

impl From<&ToolDescriptor> for ModelToolSpec {
    fn from(descriptor: &ToolDescriptor) -> Self {
        let description = descriptor
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(MISSING_DESCRIPTION);

        Self {
            kind: ToolKind::Function,
            function: FunctionSpec {
                name: descriptor.name.clone(),
                description: description.to_string(),
                parameters: descriptor.input_schema.clone(),
            },
        }
    }
}

/// Adapt a whole catalog, preserving order.
pub fn adapt(descriptors: &[ToolDescriptor]) -> Vec<ModelToolSpec> {
    descriptors.iter().map(ModelToolSpec::from).collect()
}
