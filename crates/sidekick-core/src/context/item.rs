use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rich-editor document as produced by the input box (ProseMirror-style JSON).
pub type EditorState = Value;

/// Identifies where a context item came from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextItemId {
    pub provider_title: String,
    pub item_id: String,
}

/// A piece of context resolved from an `@provider` mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub id: ContextItemId,
}

impl ContextItem {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }
}
