use super::paths::open_file_items;
use super::store::ProviderStore;
use super::{ProviderState, SearchResult, SubmenuContextItem, SubmenuItem, SubmenuTarget};
use crate::config::{ContextProviderDescription, Settings};
use crate::constants::submenu::{
    FILE_PROVIDER, LOADING_DESCRIPTION, LOADING_ID, LOADING_TITLE, MAX_LENGTH,
    OPEN_FILE_GROUP_PARTS, UNKNOWN_PROVIDER,
};
use crate::error::{Result, SidekickError};
use crate::ide::{HostEvent, IdeMessenger, LoadSubmenuItemsResponse};
use crate::search::{ItemIndex, SearchOptions};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Debug, Clone, Default)]
struct ProviderConfig {
    descriptions: Vec<ContextProviderDescription>,
    disable_indexing: bool,
}

/// Searchable item sets for every context provider the host declares.
///
/// Owns one index and one fallback list per provider. Queries never fail:
/// they fall back to recently known items, then to a loading placeholder
/// while the first load is still running.
pub struct SubmenuContextProviders {
    messenger: Arc<dyn IdeMessenger>,
    store: RwLock<ProviderStore>,
    config: RwLock<ProviderConfig>,
    search_options: SearchOptions,
    initial_load_complete: AtomicBool,
    loading: AtomicBool,
    refreshing_open_files: AtomicBool,
}

impl SubmenuContextProviders {
    pub fn new(messenger: Arc<dyn IdeMessenger>) -> Self {
        Self {
            messenger,
            store: RwLock::new(ProviderStore::new()),
            config: RwLock::new(ProviderConfig::default()),
            search_options: SearchOptions::default(),
            initial_load_complete: AtomicBool::new(false),
            loading: AtomicBool::new(false),
            refreshing_open_files: AtomicBool::new(false),
        }
    }

    pub fn from_settings(messenger: Arc<dyn IdeMessenger>, settings: &Settings) -> Self {
        let providers = Self::new(messenger);
        providers.configure(
            settings.context_providers.clone(),
            settings.disable_indexing,
        );
        providers
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.search_options = options;
        self
    }

    /// Record the providers the host declared. Takes effect on the next load.
    pub fn configure(&self, descriptions: Vec<ContextProviderDescription>, disable_indexing: bool) {
        match self.config.write() {
            Ok(mut config) => {
                config.descriptions = descriptions;
                config.disable_indexing = disable_indexing;
            }
            Err(e) => tracing::error!("Provider config lock poisoned: {}", e),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn initial_load_complete(&self) -> bool {
        self.initial_load_complete.load(Ordering::SeqCst)
    }

    pub fn provider_state(&self, provider_title: &str) -> ProviderState {
        self.read_store()
            .map(|store| store.state(provider_title))
            .unwrap_or_default()
    }

    /// Fetch every declared provider concurrently and rebuild its index.
    ///
    /// A failing provider is logged and skipped; the load is marked complete
    /// once every provider has settled.
    pub async fn load_submenu_items(&self) {
        let config = match self.config.read() {
            Ok(config) => config.clone(),
            Err(e) => {
                tracing::error!("Provider config lock poisoned: {}", e);
                return;
            }
        };
        if config.descriptions.is_empty() {
            return;
        }
        let Some(_loading) = BusyFlag::acquire(&self.loading) else {
            tracing::debug!("Submenu load already in progress");
            return;
        };

        let loads = config.descriptions.iter().filter_map(|description| {
            if description.is_skipped(config.disable_indexing) {
                tracing::debug!(
                    provider = %description.title,
                    "Skipping provider due to disabled indexing"
                );
                return None;
            }
            Some(self.load_provider(&description.title))
        });
        futures::future::join_all(loads).await;

        self.initial_load_complete.store(true, Ordering::SeqCst);
        tracing::info!("Submenu items loaded");
    }

    /// Drop the completed-load marker and fetch every provider again.
    /// Ignored while a load is running.
    pub async fn refresh(&self) {
        if self.is_loading() {
            tracing::debug!("Ignoring submenu refresh while loading");
            return;
        }
        self.initial_load_complete.store(false, Ordering::SeqCst);
        self.load_submenu_items().await;
    }

    /// Replace one provider's index and fallback list with a pushed item set.
    pub async fn update_submenu_items(
        &self,
        provider_title: &str,
        items: Vec<SubmenuItem>,
    ) -> Result<()> {
        self.write_store()?.mark_loading(provider_title);
        let _settle = SettleOnExit {
            store: &self.store,
            provider_title,
        };
        self.install(provider_title, items).await
    }

    /// Append one item to a provider's live index. No-op when the provider
    /// has not been loaded.
    pub fn add_item(&self, provider_title: &str, item: SubmenuItem) {
        match self.write_store() {
            Ok(mut store) => {
                if !store.append_item(provider_title, item) {
                    tracing::debug!(provider = %provider_title, "No index to add item to");
                }
            }
            Err(e) => tracing::error!("Failed to add submenu item: {}", e),
        }
    }

    pub fn get_submenu_context_items(
        &self,
        target: &SubmenuTarget,
        query: &str,
    ) -> Vec<SubmenuContextItem> {
        self.get_submenu_context_items_limited(target, query, MAX_LENGTH)
    }

    /// Search results for `query`, else the provider's fallback list, else a
    /// loading placeholder if the first load has not finished.
    pub fn get_submenu_context_items_limited(
        &self,
        target: &SubmenuTarget,
        query: &str,
        limit: usize,
    ) -> Vec<SubmenuContextItem> {
        match self.try_submenu_context_items(target, query, limit) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("Error in get_submenu_context_items: {}", e);
                Vec::new()
            }
        }
    }

    /// Scored matches without the fallback and placeholder handling.
    pub fn search(&self, target: &SubmenuTarget, query: &str) -> Vec<SearchResult> {
        match self.read_store() {
            Ok(store) => Self::search_store(&store, target, query, &self.search_options),
            Err(e) => {
                tracing::error!("Submenu search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Re-read the open editor files into the `file` fallback list.
    ///
    /// Files that were known before but are no longer open stay after the
    /// open ones. A call made while another is running returns immediately.
    pub async fn refresh_open_files(&self) -> Result<()> {
        let Some(_refreshing) = BusyFlag::acquire(&self.refreshing_open_files) else {
            tracing::debug!("Open files refresh already running");
            return Ok(());
        };

        let open_files = self.open_file_items().await?;
        self.write_store()?
            .fallback_mut()
            .merge_open_files(open_files);
        Ok(())
    }

    /// React to a push message from the host.
    pub async fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::RefreshSubmenuItems => self.refresh().await,
            HostEvent::UpdateSubmenuItems {
                provider,
                submenu_items,
            } => {
                if let Err(e) = self.update_submenu_items(&provider, submenu_items).await {
                    tracing::error!(provider = %provider, "Failed to update submenu items: {}", e);
                }
            }
            HostEvent::IsOsrEnabled(_) => {}
        }
    }

    /// Apply host push messages until the sender is dropped.
    pub async fn listen(self: Arc<Self>, mut events: UnboundedReceiver<HostEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_host_event(event).await;
        }
    }

    async fn load_provider(&self, title: &str) {
        if let Err(e) = self.try_load_provider(title).await {
            tracing::error!(provider = %title, "Error loading submenu items: {}", e);
        }
    }

    async fn try_load_provider(&self, title: &str) -> Result<()> {
        self.write_store()?.mark_loading(title);
        let _settle = SettleOnExit {
            store: &self.store,
            provider_title: title,
        };
        match self.messenger.load_submenu_items(title).await? {
            LoadSubmenuItemsResponse::Ok { content } => self.install(title, content).await,
            LoadSubmenuItemsResponse::Error { error } => {
                Err(SidekickError::provider_load(title, error))
            }
        }
    }

    /// Build the new index and fallback list, then swap both in under one lock.
    async fn install(&self, title: &str, items: Vec<SubmenuItem>) -> Result<()> {
        let index = ItemIndex::build(items.iter().cloned());

        let open_files = if title == FILE_PROVIDER {
            match self.open_file_items().await {
                Ok(files) => Some(files),
                Err(e) => {
                    tracing::warn!("Could not read open files: {}", e);
                    Some(Vec::new())
                }
            }
        } else {
            None
        };

        let mut store = self.write_store()?;
        store.replace_index(title, index);
        match open_files {
            Some(open_files) => store.fallback_mut().set_file_items(open_files, &items),
            None => store.set_fallback(title, items),
        }
        tracing::debug!(provider = %title, "Submenu index rebuilt");
        Ok(())
    }

    async fn open_file_items(&self) -> Result<Vec<SubmenuItem>> {
        let paths = self.messenger.get_open_files().await?;
        Ok(open_file_items(&paths, OPEN_FILE_GROUP_PARTS))
    }

    fn try_submenu_context_items(
        &self,
        target: &SubmenuTarget,
        query: &str,
        limit: usize,
    ) -> Result<Vec<SubmenuContextItem>> {
        let store = self.read_store()?;
        let results = Self::search_store(&store, target, query, &self.search_options);
        if !results.is_empty() {
            return Ok(results
                .into_iter()
                .take(limit)
                .map(SubmenuContextItem::from)
                .collect());
        }

        let fallback = target
            .title()
            .map(|title| store.fallback().get(title))
            .unwrap_or(&[]);
        if fallback.is_empty() && !self.initial_load_complete() {
            return Ok(vec![SubmenuContextItem {
                id: LOADING_ID.to_string(),
                title: LOADING_TITLE.to_string(),
                description: LOADING_DESCRIPTION.to_string(),
                provider_title: target.title().unwrap_or(UNKNOWN_PROVIDER).to_string(),
            }]);
        }

        let provider_title = target.title().unwrap_or(UNKNOWN_PROVIDER);
        Ok(fallback
            .iter()
            .take(limit)
            .cloned()
            .map(|item| item.with_provider(provider_title))
            .collect())
    }

    fn search_store(
        store: &ProviderStore,
        target: &SubmenuTarget,
        query: &str,
        options: &SearchOptions,
    ) -> Vec<SearchResult> {
        match target {
            SubmenuTarget::AllProviders => store.search_all(query, options),
            SubmenuTarget::Provider(title) => store.search_provider(title, query, options),
        }
    }

    fn read_store(&self) -> Result<RwLockReadGuard<'_, ProviderStore>> {
        self.store
            .read()
            .map_err(|e| SidekickError::poisoned(e.to_string()))
    }

    fn write_store(&self) -> Result<RwLockWriteGuard<'_, ProviderStore>> {
        self.store
            .write()
            .map_err(|e| SidekickError::poisoned(e.to_string()))
    }
}

/// Holds a busy flag for the lifetime of the guard. Released on drop, so an
/// early return or a dropped future never leaves it set.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Moves a provider out of `Loading` when its load ends without installing
/// an index: on error or when the load future is dropped.
struct SettleOnExit<'a> {
    store: &'a RwLock<ProviderStore>,
    provider_title: &'a str,
}

impl Drop for SettleOnExit<'_> {
    fn drop(&mut self) {
        match self.store.write() {
            Ok(mut store) => store.settle_loading(self.provider_title),
            Err(e) => tracing::error!("Provider store lock poisoned: {}", e),
        }
    }
}
