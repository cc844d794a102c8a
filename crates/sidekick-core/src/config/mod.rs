use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::constants::paths;
use crate::error::SidekickError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub context_providers: Vec<ContextProviderDescription>,
    /// Skips providers whose items come from the background indexer.
    #[serde(default)]
    pub disable_indexing: bool,
    #[serde(default)]
    pub slash_commands: Vec<SlashCommandDescription>,
    #[serde(default)]
    pub models: Vec<ModelDescription>,
    /// Title of the selected model. Falls back to the first entry in `models`.
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub embeddings_provider: Option<String>,
}

/// A context provider the host declared as available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextProviderDescription {
    pub title: String,
    #[serde(default)]
    pub display_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub depends_on_indexing: bool,
}

impl ContextProviderDescription {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            display_title: title.clone(),
            title,
            description: String::new(),
            depends_on_indexing: false,
        }
    }

    pub fn depending_on_indexing(mut self) -> Self {
        self.depends_on_indexing = true;
        self
    }

    /// Whether this provider must be skipped under the given indexing setting.
    pub fn is_skipped(&self, disable_indexing: bool) -> bool {
        self.depends_on_indexing && disable_indexing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlashCommandDescription {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

impl SlashCommandDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            params: Value::Null,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub title: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
}

impl ModelDescription {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            provider: String::new(),
            model: String::new(),
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    /// Load settings from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_else(|e| {
            tracing::debug!("Using default settings: {}", e);
            Self::default()
        })
    }

    pub fn load_from(path: &Path) -> Result<Self, SidekickError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SidekickError::Config(e.to_string()))
    }

    pub fn save(&self) -> Result<(), SidekickError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SidekickError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SidekickError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The model chat turns are sent to.
    pub fn default_model(&self) -> Option<&ModelDescription> {
        match &self.default_model {
            Some(title) => self.models.iter().find(|m| &m.title == title),
            None => self.models.first(),
        }
    }

    /// Exact-name lookup of a configured slash command.
    pub fn slash_command(&self, name: &str) -> Option<&SlashCommandDescription> {
        self.slash_commands.iter().find(|c| c.name == name)
    }

    /// Providers that take part in submenu loading.
    pub fn indexed_providers(&self) -> impl Iterator<Item = &ContextProviderDescription> {
        let disable_indexing = self.disable_indexing;
        self.context_providers
            .iter()
            .filter(move |d| !d.is_skipped(disable_indexing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Settings {
        Settings {
            context_providers: vec![
                ContextProviderDescription::new("file"),
                ContextProviderDescription::new("code").depending_on_indexing(),
            ],
            disable_indexing: true,
            slash_commands: vec![SlashCommandDescription::new("edit")],
            models: vec![ModelDescription::new("GPT-4"), ModelDescription::new("Llama")],
            default_model: Some("Llama".to_string()),
            embeddings_provider: None,
        }
    }

    #[test]
    fn test_default_model_prefers_selection() {
        let settings = sample();
        assert_eq!(settings.default_model().unwrap().title, "Llama");

        let mut unselected = sample();
        unselected.default_model = None;
        assert_eq!(unselected.default_model().unwrap().title, "GPT-4");

        let mut missing = sample();
        missing.default_model = Some("Nope".to_string());
        assert!(missing.default_model().is_none());
    }

    #[test]
    fn test_indexed_providers_skip_indexing_dependents() {
        let mut settings = sample();
        let titles: Vec<_> = settings.indexed_providers().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["file"]);

        settings.disable_indexing = false;
        assert_eq!(settings.indexed_providers().count(), 2);
    }

    #[test]
    fn test_slash_command_lookup_is_exact() {
        let settings = sample();
        assert!(settings.slash_command("edit").is_some());
        assert!(settings.slash_command("ed").is_none());
        assert!(settings.slash_command("Edit").is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        sample().save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded.context_providers, sample().context_providers);
        assert!(loaded.disable_indexing);
        assert_eq!(loaded.default_model.as_deref(), Some("Llama"));
    }

    #[test]
    fn test_load_from_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "context_providers = 12").unwrap();

        assert!(matches!(
            Settings::load_from(&path),
            Err(SidekickError::Config(_))
        ));
    }
}
