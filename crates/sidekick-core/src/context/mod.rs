mod history;
mod item;

pub use history::{construct_messages, ChatHistory, ChatHistoryItem};
pub use item::{ContextItem, ContextItemId, EditorState};
