use crate::config::{ContextProviderDescription, ModelDescription};
use crate::context::{ContextItem, EditorState};
use crate::error::SidekickError;
use crate::llm::{MessageContent, MessagePart};
use serde_json::Value;

/// Turns rich editor content into message content plus the context items
/// its mentions refer to.
#[async_trait::async_trait]
pub trait EditorContentResolver: Send + Sync {
    async fn resolve(
        &self,
        editor_state: &EditorState,
        context_providers: &[ContextProviderDescription],
        model: &ModelDescription,
        embeddings_provider: Option<&str>,
    ) -> Result<(Vec<ContextItem>, MessageContent), SidekickError>;
}

/// Reads the text and images out of the editor document without resolving
/// any mentions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextResolver;

#[async_trait::async_trait]
impl EditorContentResolver for PlainTextResolver {
    async fn resolve(
        &self,
        editor_state: &EditorState,
        _context_providers: &[ContextProviderDescription],
        _model: &ModelDescription,
        _embeddings_provider: Option<&str>,
    ) -> Result<(Vec<ContextItem>, MessageContent), SidekickError> {
        Ok((Vec::new(), editor_content(editor_state)?))
    }
}

/// Flatten an editor document: block texts joined by newlines, images as
/// separate parts after the text.
pub fn editor_content(doc: &Value) -> Result<MessageContent, SidekickError> {
    let blocks = match doc {
        Value::Object(_) => doc.get("content").and_then(Value::as_array),
        Value::String(text) => return Ok(MessageContent::Text(text.clone())),
        _ => None,
    }
    .ok_or_else(|| SidekickError::Resolve("editor document has no content".to_string()))?;

    let mut lines = Vec::new();
    let mut images = Vec::new();
    for block in blocks {
        if block.get("type").and_then(Value::as_str) == Some("image") {
            if let Some(src) = block.pointer("/attrs/src").and_then(Value::as_str) {
                images.push(src.to_string());
            }
            continue;
        }
        let mut line = String::new();
        inline_text(block, &mut line);
        lines.push(line);
    }

    let text = lines.join("\n");
    if images.is_empty() {
        return Ok(MessageContent::Text(text));
    }
    let mut parts = vec![MessagePart::text(text)];
    parts.extend(images.into_iter().map(MessagePart::image));
    Ok(MessageContent::Parts(parts))
}

fn inline_text(node: &Value, out: &mut String) {
    match node.get("type").and_then(Value::as_str) {
        Some("text") => {
            if let Some(text) = node.get("text").and_then(Value::as_str) {
                out.push_str(text);
            }
        }
        Some("mention") => {
            if let Some(label) = node.pointer("/attrs/label").and_then(Value::as_str) {
                out.push('@');
                out.push_str(label);
            }
        }
        Some("hardBreak") => out.push('\n'),
        _ => {
            for child in node
                .get("content")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                inline_text(child, out);
            }
        }
    }
}
