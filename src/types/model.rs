//! Model capability descriptors

use serde::{Deserialize, Serialize};

/// Static description of a model the service can converse with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, async_graphql::SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct ModelCapability {
    pub name: String,
    pub capabilities: Vec<String>,
    pub max_tokens: i32,
}

impl ModelCapability {
    pub fn new(name: &str, capabilities: &[&str], max_tokens: i32) -> Self {
        Self {
            name: name.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            max_tokens,
        }
    }

    pub fn supports(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}
