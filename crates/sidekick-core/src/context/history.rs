use crate::context::{ContextItem, EditorState};
use crate::llm::{ChatMessage, MessageContent, MessagePart, PromptLog};
use serde::{Deserialize, Serialize};

/// One turn of the conversation together with the context resolved for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatHistoryItem {
    pub message: ChatMessage,
    #[serde(default)]
    pub context_items: Vec<ContextItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_state: Option<EditorState>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prompt_logs: Vec<PromptLog>,
}

impl ChatHistoryItem {
    pub fn new(message: ChatMessage) -> Self {
        Self {
            message,
            context_items: Vec::new(),
            editor_state: None,
            prompt_logs: Vec::new(),
        }
    }

    pub fn with_context_items(mut self, items: Vec<ContextItem>) -> Self {
        self.context_items = items;
        self
    }

    pub fn with_editor_state(mut self, editor_state: EditorState) -> Self {
        self.editor_state = Some(editor_state);
        self
    }
}

/// Linear conversation history. Only appended to or truncated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatHistory {
    items: Vec<ChatHistoryItem>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ChatHistoryItem) {
        self.items.push(item);
    }

    /// Keep the first `len` items.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn get(&self, index: usize) -> Option<&ChatHistoryItem> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChatHistoryItem> {
        self.items.get_mut(index)
    }

    pub fn last(&self) -> Option<&ChatHistoryItem> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut ChatHistoryItem> {
        self.items.last_mut()
    }

    pub fn items(&self) -> &[ChatHistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl From<Vec<ChatHistoryItem>> for ChatHistory {
    fn from(items: Vec<ChatHistoryItem>) -> Self {
        Self { items }
    }
}

/// Build the prompt for a history: one message per turn, with that turn's
/// non-blank context items placed ahead of its own content.
pub fn construct_messages(history: &[ChatHistoryItem]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|item| {
            let mut parts: Vec<MessagePart> = item
                .context_items
                .iter()
                .map(|ctx| format!("{}\n", ctx.content))
                .filter(|text| !text.trim().is_empty())
                .map(MessagePart::text)
                .collect();

            if parts.is_empty() {
                return item.message.clone();
            }

            parts.extend(item.message.content.clone().into_parts());
            ChatMessage {
                role: item.message.role,
                content: MessageContent::Parts(parts),
            }
        })
        .collect()
}
