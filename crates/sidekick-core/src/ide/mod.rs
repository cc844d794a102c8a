mod events;
mod messenger;
mod osr;

pub use events::HostEvent;
pub use messenger::{
    AbortSignal, ChatStreamEvent, IdeMessenger, LoadSubmenuItemsResponse, RunSlashCommandRequest,
    SlashCommandUpdate,
};
pub use osr::OsrStatus;
