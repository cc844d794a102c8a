use crate::context::ContextItem;
use crate::error::SidekickError;
use crate::llm::{ChatMessage, PromptLog};
use crate::submenu::SubmenuItem;
use futures::channel::mpsc::UnboundedReceiver;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Response to a `context/loadSubmenuItems` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LoadSubmenuItemsResponse {
    Ok { content: Vec<SubmenuItem> },
    Error { error: String },
}

/// Events produced by a model stream.
#[derive(Debug, Clone)]
pub enum ChatStreamEvent {
    Chunk(ChatMessage),
    Done(PromptLog),
    Error(String),
}

/// Incremental output of a slash command. Only `Content` is shown to the user.
#[derive(Debug, Clone)]
pub enum SlashCommandUpdate {
    Content(String),
    Other(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSlashCommandRequest {
    pub input: String,
    pub history: Vec<ChatMessage>,
    pub model_title: String,
    pub slash_command_name: String,
    pub context_items: Vec<ContextItem>,
    pub params: Value,
}

/// Cooperative cancellation signal handed to the producer of a stream.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Arc<AtomicBool>,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Request/response side of the bridge to the host extension process.
#[async_trait::async_trait]
pub trait IdeMessenger: Send + Sync {
    /// Absolute paths of the files open in the editor, in tab order.
    async fn get_open_files(&self) -> Result<Vec<String>, SidekickError>;

    /// Full item set of one context provider.
    async fn load_submenu_items(
        &self,
        title: &str,
    ) -> Result<LoadSubmenuItemsResponse, SidekickError>;

    async fn run_slash_command(
        &self,
        request: RunSlashCommandRequest,
    ) -> Result<UnboundedReceiver<SlashCommandUpdate>, SidekickError>;

    async fn stream_chat(
        &self,
        model_title: &str,
        abort: AbortSignal,
        messages: Vec<ChatMessage>,
    ) -> Result<UnboundedReceiver<ChatStreamEvent>, SidekickError>;

    /// Show an error notification in the host UI.
    async fn error_popup(&self, message: &str);

    fn is_jetbrains(&self) -> bool {
        false
    }

    /// Ask the host whether off-screen rendering is enabled. The answer
    /// arrives later as [`HostEvent::IsOsrEnabled`](super::HostEvent).
    async fn request_osr_status(&self) -> Result<(), SidekickError> {
        Ok(())
    }
}
