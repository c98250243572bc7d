//! Model catalog and completion collaborator
//!
//! The catalog is seed data: it is never read from the store.

mod completion;

pub use completion::{CannedCompletion, CompletionError, CompletionProvider};

use crate::types::ModelCapability;

/// Known models, in presentation order
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelCapability>,
}

impl ModelCatalog {
    /// Catalog with an explicit model list
    pub fn with_models(models: Vec<ModelCapability>) -> Self {
        Self { models }
    }

    pub fn all(&self) -> &[ModelCapability] {
        &self.models
    }

    pub fn find(&self, name: &str) -> Option<&ModelCapability> {
        self.models.iter().find(|m| m.name == name)
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::with_models(vec![
            ModelCapability::new(
                "claude-3-opus-20240229",
                &["chat", "vision", "system-messages", "code-generation"],
                200_000,
            ),
            ModelCapability::new("claude-2", &["chat", "system-messages", "code-generation"], 100_000),
            ModelCapability::new("gpt-4", &["chat", "function-calling", "system-messages"], 8_192),
            ModelCapability::new(
                "gpt-4-turbo-preview",
                &["chat", "function-calling", "system-messages"],
                128_000,
            ),
            ModelCapability::new("gpt-3.5-turbo", &["chat", "function-calling"], 16_385),
            ModelCapability::new("deepseek-chat", &["chat", "code-generation"], 32_768),
        ])
    }
}
