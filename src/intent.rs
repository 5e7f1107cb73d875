//! Intent interpretation
//!
//! Decodes the LLM's raw text into a typed [`Action`]. The expected shape is
//!
//! ```json
//! {"action": "update_category_metadata",
//!  "payload": {"categoryName": "Shoes", "metaTitle": "New Title"}}
//! ```
//!
//! Anything that does not decode cleanly (malformed JSON, unknown action,
//! missing payload, unknown keys, non-string values) becomes
//! [`Action::Reply`] carrying the raw text, shown verbatim to the user.
//! Parsing never fails.

use serde::Deserialize;
use tracing::debug;

/// Fields an update may carry, as sent by the LLM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFields {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub focus_keyphrase: Option<String>,
}

/// A decoded intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ListCategories,
    GetCategoryMetadata {
        category_name: Option<String>,
    },
    UpdateCategoryMetadata {
        category_name: Option<String>,
        fields: UpdateFields,
    },
    CopyMetaDescriptionToDescription {
        category_name: Option<String>,
    },
    /// Not an action: plain conversational text for the user
    Reply(String),
}

impl Action {
    /// Wire tag of the action, if it is one
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Action::ListCategories => Some("list_categories"),
            Action::GetCategoryMetadata { .. } => Some("get_category_metadata"),
            Action::UpdateCategoryMetadata { .. } => Some("update_category_metadata"),
            Action::CopyMetaDescriptionToDescription { .. } => {
                Some("copy_meta_description_to_description")
            }
            Action::Reply(_) => None,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, Action::Reply(_))
    }
}

/// Outer shape of an LLM action
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Envelope {
    action: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NamedPayload {
    #[serde(default)]
    category_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdatePayload {
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    meta_title: Option<String>,
    #[serde(default)]
    meta_description: Option<String>,
    #[serde(default)]
    focus_keyphrase: Option<String>,
}

/// Why a text is not an action. Only ever logged.
#[derive(Debug)]
enum Rejection {
    Json(serde_json::Error),
    UnknownAction(String),
    BadPayload(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Json(e) => write!(f, "invalid JSON: {}", e),
            Rejection::UnknownAction(a) => write!(f, "unknown action '{}'", a),
            Rejection::BadPayload(a) => write!(f, "missing or malformed payload for '{}'", a),
        }
    }
}

/// Parse raw LLM output into an action
pub fn parse(raw_text: &str) -> Action {
    match decode(extract_json(raw_text)) {
        Ok(action) => {
            debug!(action = action.name(), "decoded LLM action");
            action
        }
        Err(reason) => {
            debug!(%reason, "LLM output is not an action, treating as reply");
            Action::Reply(raw_text.to_string())
        }
    }
}

fn decode(json: &str) -> Result<Action, Rejection> {
    let envelope: Envelope = serde_json::from_str(json).map_err(Rejection::Json)?;

    match envelope.action.as_str() {
        "list_categories" => match envelope.payload {
            None | Some(serde_json::Value::Object(_)) => Ok(Action::ListCategories),
            Some(_) => Err(Rejection::BadPayload("list_categories")),
        },
        "get_category_metadata" => {
            let p: NamedPayload = payload(envelope.payload, "get_category_metadata")?;
            Ok(Action::GetCategoryMetadata {
                category_name: non_blank(p.category_name),
            })
        }
        "update_category_metadata" => {
            let p: UpdatePayload = payload(envelope.payload, "update_category_metadata")?;
            Ok(Action::UpdateCategoryMetadata {
                category_name: non_blank(p.category_name),
                fields: UpdateFields {
                    name: p.name,
                    slug: p.slug,
                    description: p.description,
                    meta_title: p.meta_title,
                    meta_description: p.meta_description,
                    focus_keyphrase: p.focus_keyphrase,
                },
            })
        }
        "copy_meta_description_to_description" => {
            let p: NamedPayload =
                payload(envelope.payload, "copy_meta_description_to_description")?;
            Ok(Action::CopyMetaDescriptionToDescription {
                category_name: non_blank(p.category_name),
            })
        }
        other => Err(Rejection::UnknownAction(other.to_string())),
    }
}

fn payload<T: serde::de::DeserializeOwned>(
    value: Option<serde_json::Value>,
    action: &'static str,
) -> Result<T, Rejection> {
    match value {
        Some(v @ serde_json::Value::Object(_)) => serde_json::from_value(v).map_err(Rejection::Json),
        _ => Err(Rejection::BadPayload(action)),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Strip a surrounding ```json ... ``` fence if present
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    let inner = if text.contains("```json") {
        text.split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else if text.starts_with("```") {
        text.split("```")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .unwrap_or(text)
    } else {
        text
    };

    inner.trim()
}
