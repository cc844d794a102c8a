use thiserror::Error;

#[derive(Error, Debug)]
pub enum SidekickError {
    #[error("Host error: {0}")]
    Host(String),

    #[error("Failed to load items for {provider}: {message}")]
    ProviderLoad { provider: String, message: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Could not resolve editor content: {0}")]
    Resolve(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("History index {index} out of range (history has {len} items)")]
    InvalidIndex { index: usize, len: usize },

    #[error("Lock poisoned: {0}")]
    Poisoned(String),

    #[error("{0}")]
    Other(String),
}

impl SidekickError {
    pub fn provider_load(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProviderLoad {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn poisoned(what: impl Into<String>) -> Self {
        Self::Poisoned(what.into())
    }
}

pub type Result<T> = std::result::Result<T, SidekickError>;
