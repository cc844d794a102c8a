use serde::{Deserialize, Serialize};

/// One selectable entry offered by a context provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmenuItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl SubmenuItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn with_provider(self, provider_title: impl Into<String>) -> SubmenuContextItem {
        SubmenuContextItem {
            id: self.id,
            title: self.title,
            description: self.description,
            provider_title: provider_title.into(),
        }
    }
}

/// A submenu item as returned to the UI, tagged with its provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmenuContextItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub provider_title: String,
}

/// A scored match produced by one query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub description: String,
    pub provider_title: String,
    pub score: f64,
}

impl From<SearchResult> for SubmenuContextItem {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.id,
            title: result.title,
            description: result.description,
            provider_title: result.provider_title,
        }
    }
}

/// Which providers a query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubmenuTarget {
    AllProviders,
    Provider(String),
}

impl SubmenuTarget {
    pub fn provider(title: impl Into<String>) -> Self {
        Self::Provider(title.into())
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::AllProviders => None,
            Self::Provider(title) => Some(title),
        }
    }
}

/// Load lifecycle of one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProviderState {
    #[default]
    Unregistered,
    Loading,
    Ready,
}
