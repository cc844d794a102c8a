use crate::config::SlashCommandDescription;
use crate::constants::chat::SLASH_PREFIX;
use crate::llm::{strip_images, MessageContent};

/// Match `/name ...` at the start of the first text part against the
/// configured commands by exact name. Returns the command and the rest of the
/// text, with images stripped, as its input.
pub fn slash_command_for_input<'a>(
    content: &MessageContent,
    commands: &'a [SlashCommandDescription],
) -> Option<(&'a SlashCommandDescription, String)> {
    let name = content
        .first_text()
        .strip_prefix(SLASH_PREFIX)?
        .split_whitespace()
        .next()?;
    let command = commands.iter().find(|command| command.name == name)?;

    let text = strip_images(content);
    let input = text
        .strip_prefix(SLASH_PREFIX)
        .and_then(|rest| rest.strip_prefix(name))
        .map(str::trim_start)
        .unwrap_or(&text)
        .to_string();
    Some((command, input))
}
