use super::resolver::EditorContentResolver;
use super::slash::slash_command_for_input;
use super::state::{ChatEvent, ChatState};
use crate::config::{ModelDescription, Settings, SlashCommandDescription};
use crate::constants::chat::{ERROR_PREFIX, USER_INPUT_STEP};
use crate::context::{construct_messages, ChatHistoryItem, ContextItem, EditorState};
use crate::error::{Result, SidekickError};
use crate::ide::{
    AbortSignal, ChatStreamEvent, IdeMessenger, RunSlashCommandRequest, SlashCommandUpdate,
};
use crate::llm::{strip_images, ChatMessage};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;

/// Runs a chat turn: resolves the editor input, then streams either the
/// model reply or a slash command's output into the chat state.
///
/// Every state change is applied to the shared [`ChatState`] and then sent,
/// in the same order, to the optional event listener.
pub struct ChatHandler {
    messenger: Arc<dyn IdeMessenger>,
    resolver: Arc<dyn EditorContentResolver>,
    settings: Settings,
    state: Arc<Mutex<ChatState>>,
    active: Arc<AtomicBool>,
    event_tx: Option<UnboundedSender<ChatEvent>>,
}

impl ChatHandler {
    pub fn new(
        messenger: Arc<dyn IdeMessenger>,
        resolver: Arc<dyn EditorContentResolver>,
        settings: Settings,
    ) -> Self {
        Self {
            messenger,
            resolver,
            settings,
            state: Arc::new(Mutex::new(ChatState::new())),
            active: Arc::new(AtomicBool::new(false)),
            event_tx: None,
        }
    }

    pub fn with_events(mut self, event_tx: UnboundedSender<ChatEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    pub fn with_state(mut self, state: ChatState) -> Self {
        self.active.store(state.active, Ordering::SeqCst);
        self.state = Arc::new(Mutex::new(state));
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop the running turn. Updates already applied are kept.
    pub async fn cancel(&self) {
        if let Err(e) = self.dispatch(ChatEvent::SetInactive).await {
            tracing::warn!("Failed to cancel chat turn: {}", e);
        }
    }

    pub async fn state(&self) -> ChatState {
        self.state.lock().await.clone()
    }

    /// Context items attached to the next new turn.
    pub async fn set_context_items(&self, items: Vec<ContextItem>) {
        self.state.lock().await.context_items = items;
    }

    /// Submit editor content as a new turn, or as a replacement of the turn at
    /// `index` (dropping everything after it).
    ///
    /// Failures are reported to the user through the host; the turn is
    /// always left inactive.
    pub async fn stream_response(&self, editor_state: EditorState, index: Option<usize>) {
        if let Err(e) = self.try_stream_response(editor_state, index).await {
            tracing::error!("Error streaming response: {}", e);
            let message = format!("{ERROR_PREFIX}: {e}");
            self.messenger.error_popup(&message).await;
            self.emit(ChatEvent::Error(message));
        }
        if let Err(e) = self.dispatch(ChatEvent::SetInactive).await {
            tracing::error!("Failed to mark chat turn inactive: {}", e);
        }
    }

    async fn try_stream_response(
        &self,
        editor_state: EditorState,
        index: Option<usize>,
    ) -> Result<()> {
        let history = self.state.lock().await.history.clone();

        match index {
            Some(index) => {
                self.dispatch(ChatEvent::ResubmitAtIndex {
                    index,
                    editor_state: editor_state.clone(),
                })
                .await?
            }
            None => {
                self.dispatch(ChatEvent::InitNewActiveMessage {
                    editor_state: editor_state.clone(),
                })
                .await?
            }
        }

        let model = self
            .settings
            .default_model()
            .cloned()
            .ok_or_else(|| SidekickError::Config("No default model selected".to_string()))?;

        let (context_items, content) = self
            .resolver
            .resolve(
                &editor_state,
                &self.settings.context_providers,
                &model,
                self.settings.embeddings_provider.as_deref(),
            )
            .await?;
        let message = ChatMessage::user(content);

        // A resubmitted turn keeps the context it was first sent with.
        let turn_context = match index {
            Some(index) => history
                .get(index)
                .map(|item| item.context_items.clone())
                .unwrap_or_default(),
            None => context_items.clone(),
        };
        let kept = index.unwrap_or(history.len()).min(history.len());
        let mut new_history: Vec<ChatHistoryItem> = history.items()[..kept].to_vec();
        new_history.push(
            ChatHistoryItem::new(message.clone())
                .with_context_items(turn_context)
                .with_editor_state(editor_state),
        );

        self.dispatch(ChatEvent::SetMessageAtIndex {
            index: index.unwrap_or(new_history.len() - 1),
            message: message.clone(),
            context_items: context_items.clone(),
        })
        .await?;

        // Let listeners see the new turn before streaming starts.
        tokio::task::yield_now().await;

        tracing::info!(step_name = USER_INPUT_STEP, "step run");

        let messages = construct_messages(&new_history);
        match slash_command_for_input(&message.content, &self.settings.slash_commands) {
            None => self.stream_normal_input(&model, messages).await,
            Some((command, input)) => {
                tracing::info!(step_name = %command.name, "step run");
                self.stream_slash_command(&model, messages, command, input, context_items)
                    .await
            }
        }
    }

    async fn stream_normal_input(
        &self,
        model: &ModelDescription,
        messages: Vec<ChatMessage>,
    ) -> Result<()> {
        let abort = AbortSignal::new();
        let mut stream = self
            .messenger
            .stream_chat(&model.title, abort.clone(), messages)
            .await?;

        while let Some(event) = stream.next().await {
            if !self.is_active() {
                tracing::debug!("Chat stream cancelled");
                abort.abort();
                return Ok(());
            }
            match event {
                ChatStreamEvent::Chunk(chunk) => {
                    self.dispatch(ChatEvent::StreamUpdate(strip_images(&chunk.content)))
                        .await?;
                }
                ChatStreamEvent::Done(log) => {
                    self.dispatch(ChatEvent::AddLogs(vec![log])).await?;
                    break;
                }
                ChatStreamEvent::Error(e) => return Err(SidekickError::Stream(e)),
            }
        }
        Ok(())
    }

    async fn stream_slash_command(
        &self,
        model: &ModelDescription,
        messages: Vec<ChatMessage>,
        command: &SlashCommandDescription,
        input: String,
        context_items: Vec<ContextItem>,
    ) -> Result<()> {
        let request = RunSlashCommandRequest {
            input,
            history: messages,
            model_title: model.title.clone(),
            slash_command_name: command.name.clone(),
            context_items,
            params: command.params.clone(),
        };
        let mut updates = self.messenger.run_slash_command(request).await?;

        while let Some(update) = updates.next().await {
            if !self.is_active() {
                tracing::debug!(command = %command.name, "Slash command cancelled");
                break;
            }
            if let SlashCommandUpdate::Content(text) = update {
                self.dispatch(ChatEvent::StreamUpdate(text)).await?;
            }
        }
        Ok(())
    }

    /// Apply an event to the state, then forward it to the listener.
    async fn dispatch(&self, event: ChatEvent) -> Result<()> {
        {
            let mut state = self.state.lock().await;
            state.apply(&event)?;
            self.active.store(state.active, Ordering::SeqCst);
        }
        self.emit(event);
        Ok(())
    }

    fn emit(&self, event: ChatEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }
}
