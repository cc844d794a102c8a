mod handler;
mod resolver;
mod slash;
mod state;

pub use handler::ChatHandler;
pub use resolver::{editor_content, EditorContentResolver, PlainTextResolver};
pub use slash::slash_command_for_input;
pub use state::{ChatEvent, ChatState};
