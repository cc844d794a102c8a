pub mod chat;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod ide;
pub mod llm;
pub mod search;
pub mod submenu;

// Re-export key types
pub use chat::{ChatEvent, ChatHandler, ChatState, EditorContentResolver, PlainTextResolver};
pub use config::Settings;
pub use context::{ChatHistory, ChatHistoryItem, ContextItem, EditorState};
pub use error::SidekickError;
pub use ide::{HostEvent, IdeMessenger, LoadSubmenuItemsResponse, OsrStatus};
pub use llm::{ChatMessage, MessageContent, PromptLog, Role};
pub use search::{ItemIndex, SearchOptions};
pub use submenu::{
    OpenFilesRefresher, SearchResult, SubmenuContextItem, SubmenuContextProviders, SubmenuItem,
    SubmenuTarget,
};
