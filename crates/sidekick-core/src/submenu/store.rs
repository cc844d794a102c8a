use super::{FallbackStore, ProviderState, SearchResult, SubmenuItem};
use crate::search::{ItemIndex, SearchOptions};
use std::collections::HashMap;

/// Per-provider indexes, fallback lists, and load states.
///
/// Owned by [`SubmenuContextProviders`](super::SubmenuContextProviders); all
/// mutation goes through the methods below. Indexes are replaced whole.
#[derive(Debug, Default)]
pub struct ProviderStore {
    indexes: HashMap<String, ItemIndex>,
    fallback: FallbackStore,
    states: HashMap<String, ProviderState>,
}

impl ProviderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_index(&mut self, provider_title: &str, index: ItemIndex) {
        self.indexes.insert(provider_title.to_string(), index);
        self.states
            .insert(provider_title.to_string(), ProviderState::Ready);
    }

    /// Append to a provider's live index. Returns false when it has none.
    pub fn append_item(&mut self, provider_title: &str, item: SubmenuItem) -> bool {
        match self.indexes.get_mut(provider_title) {
            Some(index) => {
                index.add(item);
                true
            }
            None => false,
        }
    }

    pub fn set_fallback(&mut self, provider_title: &str, items: Vec<SubmenuItem>) {
        self.fallback.set(provider_title, items);
    }

    pub fn fallback(&self) -> &FallbackStore {
        &self.fallback
    }

    pub fn fallback_mut(&mut self) -> &mut FallbackStore {
        &mut self.fallback
    }

    pub fn state(&self, provider_title: &str) -> ProviderState {
        self.states
            .get(provider_title)
            .copied()
            .unwrap_or_default()
    }

    pub fn mark_loading(&mut self, provider_title: &str) {
        self.states
            .insert(provider_title.to_string(), ProviderState::Loading);
    }

    /// Settle a provider whose load failed: it keeps its old index if it had one.
    pub fn mark_failed(&mut self, provider_title: &str) {
        let state = if self.indexes.contains_key(provider_title) {
            ProviderState::Ready
        } else {
            ProviderState::Unregistered
        };
        self.states.insert(provider_title.to_string(), state);
    }

    /// Settle a provider that is still `Loading`; no-op in any other state.
    pub fn settle_loading(&mut self, provider_title: &str) {
        if self.state(provider_title) == ProviderState::Loading {
            self.mark_failed(provider_title);
        }
    }

    pub fn has_index(&self, provider_title: &str) -> bool {
        self.indexes.contains_key(provider_title)
    }

    /// Search one provider's index.
    pub fn search_provider(
        &self,
        provider_title: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        let Some(index) = self.indexes.get(provider_title) else {
            return Vec::new();
        };
        index
            .search(query, options)
            .into_iter()
            .map(|hit| SearchResult {
                id: hit.item.id,
                title: hit.item.title,
                description: hit.item.description,
                provider_title: provider_title.to_string(),
                score: hit.score,
            })
            .collect()
    }

    /// Search every provider and merge by descending score.
    pub fn search_all(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult> {
        let mut providers: Vec<&String> = self.indexes.keys().collect();
        providers.sort();

        let mut results: Vec<SearchResult> = providers
            .into_iter()
            .flat_map(|provider| self.search_provider(provider, query, options))
            .collect();
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}
