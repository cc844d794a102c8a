use crate::context::{ChatHistory, ChatHistoryItem, ContextItem, EditorState};
use crate::error::{Result, SidekickError};
use crate::llm::{ChatMessage, MessageContent, PromptLog, Role};

/// State updates emitted while a turn is handled, in the order they are applied.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    InitNewActiveMessage {
        editor_state: EditorState,
    },
    ResubmitAtIndex {
        index: usize,
        editor_state: EditorState,
    },
    SetMessageAtIndex {
        index: usize,
        message: ChatMessage,
        context_items: Vec<ContextItem>,
    },
    StreamUpdate(String),
    AddLogs(Vec<PromptLog>),
    SetInactive,
    Error(String),
}

/// Conversation state the chat handler drives.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub history: ChatHistory,
    /// Context items selected for the next turn.
    pub context_items: Vec<ContextItem>,
    pub active: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &ChatEvent) -> Result<()> {
        match event {
            ChatEvent::InitNewActiveMessage { editor_state } => {
                self.init_new_active_message(editor_state.clone());
            }
            ChatEvent::ResubmitAtIndex {
                index,
                editor_state,
            } => self.resubmit_at_index(*index, editor_state.clone())?,
            ChatEvent::SetMessageAtIndex {
                index,
                message,
                context_items,
            } => self.set_message_at_index(*index, message.clone(), context_items.clone()),
            ChatEvent::StreamUpdate(delta) => self.stream_update(delta),
            ChatEvent::AddLogs(logs) => self.add_logs(logs.clone()),
            ChatEvent::SetInactive => self.set_inactive(),
            ChatEvent::Error(_) => {}
        }
        Ok(())
    }

    /// Open a new user turn with empty content.
    pub fn init_new_active_message(&mut self, editor_state: EditorState) {
        self.history.push(
            ChatHistoryItem::new(ChatMessage::user(""))
                .with_context_items(self.context_items.clone())
                .with_editor_state(editor_state),
        );
        self.active = true;
    }

    /// Reopen the turn at `index` and drop everything after it.
    pub fn resubmit_at_index(&mut self, index: usize, editor_state: EditorState) -> Result<()> {
        let len = self.history.len();
        let item = self
            .history
            .get_mut(index)
            .ok_or(SidekickError::InvalidIndex { index, len })?;
        item.message.content = MessageContent::default();
        item.editor_state = Some(editor_state);

        self.history.truncate(index + 1);
        self.context_items.clear();
        self.active = true;
        Ok(())
    }

    /// Store the resolved message at `index`, appending when it is past the end.
    pub fn set_message_at_index(
        &mut self,
        index: usize,
        message: ChatMessage,
        context_items: Vec<ContextItem>,
    ) {
        match self.history.get_mut(index) {
            Some(item) => {
                item.message = message;
                item.context_items = context_items;
            }
            None => self.history.push(ChatHistoryItem::new(message)),
        }
    }

    /// Append streamed text to the assistant reply, opening one after a user turn.
    pub fn stream_update(&mut self, delta: &str) {
        let Some(last) = self.history.last() else {
            return;
        };
        if last.message.role == Role::User {
            self.history
                .push(ChatHistoryItem::new(ChatMessage::assistant("")));
        }
        if let Some(last) = self.history.last_mut() {
            last.message.content.append_text(delta);
        }
    }

    pub fn add_logs(&mut self, logs: Vec<PromptLog>) {
        if let Some(last) = self.history.last_mut() {
            last.prompt_logs.extend(logs);
        }
    }

    pub fn set_inactive(&mut self) {
        self.active = false;
    }
}
