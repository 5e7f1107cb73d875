//! LLM client seam
//!
//! The conversation runtime only needs "user text + history in, raw text
//! out". Concrete providers live outside this crate and implement
//! [`LlmClient`]; [`PassthroughClient`] echoes the user text, which lets an
//! operator type action JSON directly.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Who said a line of the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One line of conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Tool/function definition for structured output
///
/// Providers that support tool calling can hand [`action_tool`] to the model
/// so its output decodes with [`crate::intent::parse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters
    pub parameters: serde_json::Value,
}

/// Schema of the action envelope the intent interpreter accepts
pub fn action_tool() -> ToolDefinition {
    ToolDefinition {
        name: "category_action".to_string(),
        description: "Read or update WordPress product category metadata".to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "required": ["action"],
            "additionalProperties": false,
            "properties": {
                "action": {
                    "type": "string",
                    "enum": [
                        "list_categories",
                        "get_category_metadata",
                        "update_category_metadata",
                        "copy_meta_description_to_description"
                    ]
                },
                "payload": {
                    "type": "object",
                    "description": "Only categoryName for get/copy; update fields are for update_category_metadata",
                    "additionalProperties": false,
                    "properties": {
                        "categoryName": {"type": "string"},
                        "name": {"type": "string"},
                        "slug": {"type": "string"},
                        "description": {"type": "string"},
                        "metaTitle": {"type": "string"},
                        "metaDescription": {"type": "string"},
                        "focusKeyphrase": {"type": "string"}
                    }
                }
            }
        }),
    }
}

/// Interface to the language model collaborator
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Produce the raw response for `user_text`, given prior turns
    async fn get_response(&self, user_text: &str, history: &[ChatMessage]) -> Result<String>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}

/// Returns the user text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughClient;

#[async_trait]
impl LlmClient for PassthroughClient {
    async fn get_response(&self, user_text: &str, _history: &[ChatMessage]) -> Result<String> {
        Ok(user_text.to_string())
    }

    fn model_name(&self) -> &str {
        "passthrough"
    }

    fn provider_name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_echoes() {
        let client = PassthroughClient;
        let out = client
            .get_response(r#"{"action":"list_categories"}"#, &[])
            .await
            .unwrap();
        assert_eq!(out, r#"{"action":"list_categories"}"#);
        assert_eq!(client.provider_name(), "local");
    }

    #[test]
    fn test_action_tool_lists_every_action() {
        let tool = action_tool();
        let actions = tool.parameters["properties"]["action"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| {
                let sample = if s == "list_categories" {
                    format!(r#"{{"action":"{}"}}"#, s)
                } else {
                    format!(r#"{{"action":"{}","payload":{{"categoryName":"Shoes"}}}}"#, s)
                };
                crate::intent::parse(&sample)
            })
            .collect::<Vec<_>>();

        assert_eq!(actions.len(), 4);
        assert!(actions.iter().all(|a| !a.is_reply()));
    }

    #[test]
    fn test_chat_message_serde() {
        let msg = ChatMessage::assistant("Bonjour");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "Bonjour"}));
    }
}
