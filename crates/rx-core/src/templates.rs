//! Prompt templates grouped per target language.
//!
//! Templates are opaque strings. Nothing here inspects their content; they
//! are resolved once at setup and borrowed by every generation call.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Templates for generating function implementations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplTemplates {
    /// System instruction for chat backends, simple strategy
    pub simple_chat_instruction: String,
    /// Header for completion backends, simple strategy
    pub simple_completion_instruction: String,
    /// System instruction for chat backends, reflexion strategy
    pub reflexion_chat_instruction: String,
    /// Header for completion backends, reflexion strategy
    pub reflexion_completion_instruction: String,
    /// Example block placed ahead of the previous attempt (chat, reflexion)
    pub reflexion_few_shot: String,
}

/// Templates for generating unit tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTemplates {
    /// System instruction for chat backends
    pub chat_instruction: String,
    /// Header for completion backends
    pub completion_instruction: String,
    /// Example block placed ahead of the signature (chat)
    pub few_shot: String,
}

/// Templates for generating self-reflections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionTemplates {
    /// System instruction for chat backends
    pub chat_instruction: String,
    /// Header for completion backends
    pub completion_instruction: String,
    /// Optional example block (chat). Absent selects the plain message shape.
    #[serde(default)]
    pub few_shot: Option<String>,
}

/// Every template one target language needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSet {
    /// Implementation prompts
    #[serde(rename = "impl")]
    pub implementation: ImplTemplates,
    /// Test generation prompts
    pub tests: TestTemplates,
    /// Self-reflection prompts
    pub reflection: ReflectionTemplates,
}

impl TemplateSet {
    /// Load a template set from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse a template set from JSON text.
    pub fn from_json(content: &str) -> Result<Self, TemplateError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Serialize as pretty JSON, e.g. to seed a custom template file.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Template loading errors.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read templates from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
}
