use futures::channel::mpsc::UnboundedReceiver;
use sidekick_core::config::ContextProviderDescription;
use sidekick_core::constants::submenu::{FILE_PROVIDER, LOADING_ID, MAX_LENGTH, UNKNOWN_PROVIDER};
use sidekick_core::ide::{AbortSignal, ChatStreamEvent, RunSlashCommandRequest, SlashCommandUpdate};
use sidekick_core::submenu::ProviderState;
use sidekick_core::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Mock host that serves canned provider item sets and open files.
#[derive(Default)]
struct MockHost {
    /// Provider title to its items, or to an error the host reports.
    providers: Mutex<HashMap<String, Result<Vec<SubmenuItem>, String>>>,
    open_files: Mutex<Vec<String>>,
    open_files_delay: Duration,
    open_files_calls: AtomicUsize,
    load_delay: Duration,
    load_calls: Mutex<Vec<String>>,
}

impl MockHost {
    fn with_provider(self, title: &str, items: Vec<SubmenuItem>) -> Self {
        self.set_items(title, items);
        self
    }

    fn with_failing_provider(self, title: &str, error: &str) -> Self {
        self.providers
            .lock()
            .unwrap()
            .insert(title.to_string(), Err(error.to_string()));
        self
    }

    fn with_open_files(self, paths: &[&str]) -> Self {
        self.set_open_files(paths);
        self
    }

    fn set_items(&self, title: &str, items: Vec<SubmenuItem>) {
        self.providers
            .lock()
            .unwrap()
            .insert(title.to_string(), Ok(items));
    }

    fn slow(load_delay: Duration) -> Self {
        Self {
            load_delay,
            ..Self::default()
        }
    }

    fn set_open_files(&self, paths: &[&str]) {
        *self.open_files.lock().unwrap() = paths.iter().map(|p| p.to_string()).collect();
    }

    fn loads_of(&self, title: &str) -> usize {
        self.load_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| *t == title)
            .count()
    }
}

#[async_trait::async_trait]
impl IdeMessenger for MockHost {
    async fn get_open_files(&self) -> Result<Vec<String>, SidekickError> {
        self.open_files_calls.fetch_add(1, Ordering::SeqCst);
        let files = self.open_files.lock().unwrap().clone();
        if !self.open_files_delay.is_zero() {
            tokio::time::sleep(self.open_files_delay).await;
        }
        Ok(files)
    }

    async fn load_submenu_items(
        &self,
        title: &str,
    ) -> Result<LoadSubmenuItemsResponse, SidekickError> {
        self.load_calls.lock().unwrap().push(title.to_string());
        let response = self.providers.lock().unwrap().get(title).cloned();
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        match response {
            Some(Ok(content)) => Ok(LoadSubmenuItemsResponse::Ok { content }),
            Some(Err(error)) => Ok(LoadSubmenuItemsResponse::Error { error }),
            None => Err(SidekickError::Host(format!("no provider named {title}"))),
        }
    }

    async fn run_slash_command(
        &self,
        _request: RunSlashCommandRequest,
    ) -> Result<UnboundedReceiver<SlashCommandUpdate>, SidekickError> {
        Err(SidekickError::Host("not supported".to_string()))
    }

    async fn stream_chat(
        &self,
        _model_title: &str,
        _abort: AbortSignal,
        _messages: Vec<ChatMessage>,
    ) -> Result<UnboundedReceiver<ChatStreamEvent>, SidekickError> {
        Err(SidekickError::Host("not supported".to_string()))
    }

    async fn error_popup(&self, _message: &str) {}
}

fn item(id: &str, title: &str, description: &str) -> SubmenuItem {
    SubmenuItem::new(id, title, description)
}

fn docs() -> Vec<SubmenuItem> {
    vec![
        item("docs/start", "Getting Started", "docs/getting-started"),
        item("docs/install", "Installation Guide", "docs/installation"),
        item("docs/api", "API Reference", "docs/reference"),
    ]
}

fn registry(host: MockHost, titles: &[&str]) -> (Arc<MockHost>, SubmenuContextProviders) {
    let host = Arc::new(host);
    let providers = SubmenuContextProviders::new(host.clone());
    providers.configure(
        titles
            .iter()
            .map(|title| ContextProviderDescription::new(*title))
            .collect(),
        false,
    );
    (host, providers)
}

fn ids(items: &[SubmenuContextItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn test_loading_placeholder_before_first_load() {
    let (_host, providers) = registry(MockHost::default(), &["docs"]);

    let items = providers.get_submenu_context_items(&SubmenuTarget::provider("docs"), "");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, LOADING_ID);
    assert_eq!(items[0].provider_title, "docs");

    let items = providers.get_submenu_context_items(&SubmenuTarget::AllProviders, "anything");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].provider_title, UNKNOWN_PROVIDER);
}

#[tokio::test]
async fn test_load_then_search_provider() {
    let (_host, providers) = registry(MockHost::default().with_provider("docs", docs()), &["docs"]);
    providers.load_submenu_items().await;

    assert!(providers.initial_load_complete());
    assert!(!providers.is_loading());
    assert_eq!(providers.provider_state("docs"), ProviderState::Ready);

    let items = providers.get_submenu_context_items(&SubmenuTarget::provider("docs"), "install");
    assert_eq!(items[0].id, "docs/install");
    assert_eq!(items[0].title, "Installation Guide");
    assert_eq!(items[0].provider_title, "docs");
}

#[tokio::test]
async fn test_empty_or_unmatched_query_returns_fallback() {
    let many: Vec<_> = (0..100)
        .map(|i| item(&format!("page/{i}"), &format!("Page {i}"), ""))
        .collect();
    let (_host, providers) = registry(MockHost::default().with_provider("pages", many), &["pages"]);
    providers.load_submenu_items().await;

    let target = SubmenuTarget::provider("pages");
    let items = providers.get_submenu_context_items(&target, "");
    assert_eq!(items.len(), MAX_LENGTH);
    assert_eq!(items[0].id, "page/0");
    assert_eq!(items[MAX_LENGTH - 1].id, format!("page/{}", MAX_LENGTH - 1));

    let items = providers.get_submenu_context_items(&target, "xylophone");
    assert_eq!(items.len(), MAX_LENGTH);
    assert!(providers.search(&target, "xylophone").is_empty());
}

#[tokio::test]
async fn test_limit_caps_search_results() {
    let many: Vec<_> = (0..20)
        .map(|i| item(&format!("note/{i}"), "meeting notes", ""))
        .collect();
    let (_host, providers) = registry(MockHost::default().with_provider("notes", many), &["notes"]);
    providers.load_submenu_items().await;

    let items = providers.get_submenu_context_items_limited(
        &SubmenuTarget::provider("notes"),
        "meeting",
        5,
    );
    assert_eq!(items.len(), 5);
}

#[tokio::test]
async fn test_failing_provider_does_not_block_others() {
    let host = MockHost::default()
        .with_provider("docs", docs())
        .with_failing_provider("broken", "permission denied");
    let (_host, providers) = registry(host, &["broken", "docs", "missing"]);
    providers.load_submenu_items().await;

    assert!(providers.initial_load_complete());
    assert_eq!(providers.provider_state("docs"), ProviderState::Ready);
    assert_eq!(providers.provider_state("broken"), ProviderState::Unregistered);
    assert_eq!(providers.provider_state("missing"), ProviderState::Unregistered);

    let items = providers.get_submenu_context_items(&SubmenuTarget::provider("docs"), "reference");
    assert_eq!(items[0].id, "docs/api");

    // Failed providers have nothing to fall back to once loading is done.
    assert!(providers
        .get_submenu_context_items(&SubmenuTarget::provider("broken"), "")
        .is_empty());
}

#[tokio::test]
async fn test_indexing_providers_skipped_when_disabled() {
    let host = Arc::new(
        MockHost::default()
            .with_provider("docs", docs())
            .with_provider("codebase", vec![item("src/lib.rs", "lib.rs", "src")]),
    );
    let providers = SubmenuContextProviders::new(host.clone());
    providers.configure(
        vec![
            ContextProviderDescription::new("docs"),
            ContextProviderDescription::new("codebase").depending_on_indexing(),
        ],
        true,
    );
    providers.load_submenu_items().await;

    assert_eq!(host.loads_of("docs"), 1);
    assert_eq!(host.loads_of("codebase"), 0);
    assert_eq!(providers.provider_state("codebase"), ProviderState::Unregistered);
}

#[tokio::test]
async fn test_add_item_extends_live_index() {
    let (_host, providers) = registry(MockHost::default().with_provider("docs", docs()), &["docs"]);
    providers.load_submenu_items().await;

    providers.add_item("docs", item("docs/faq", "Troubleshooting FAQ", "docs/faq"));
    let results = providers.search(&SubmenuTarget::provider("docs"), "troubleshooting");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "docs/faq");

    // Unknown providers are ignored.
    providers.add_item("nowhere", item("x", "Troubleshooting", ""));
    assert!(providers
        .search(&SubmenuTarget::provider("nowhere"), "troubleshooting")
        .is_empty());
}

#[tokio::test]
async fn test_pushed_items_replace_provider_contents() {
    let (_host, providers) = registry(MockHost::default().with_provider("docs", docs()), &["docs"]);
    providers.load_submenu_items().await;

    providers
        .handle_host_event(HostEvent::UpdateSubmenuItems {
            provider: "docs".to_string(),
            submenu_items: vec![item("docs/changes", "Changelog", "docs/changelog")],
        })
        .await;

    let target = SubmenuTarget::provider("docs");
    assert!(providers.search(&target, "installation").is_empty());
    assert_eq!(providers.search(&target, "changelog")[0].id, "docs/changes");

    // The fallback list was replaced along with the index.
    assert_eq!(
        ids(&providers.get_submenu_context_items(&target, "")),
        vec!["docs/changes"]
    );
}

#[tokio::test]
async fn test_pushed_items_register_new_provider() {
    let (_host, providers) = registry(MockHost::default(), &[]);
    providers
        .update_submenu_items("issues", vec![item("#12", "Crash on startup", "open")])
        .await
        .unwrap();

    assert_eq!(providers.provider_state("issues"), ProviderState::Ready);
    assert_eq!(
        providers.search(&SubmenuTarget::provider("issues"), "crash")[0].id,
        "#12"
    );
}

#[tokio::test]
async fn test_refresh_reloads_every_provider() {
    let (host, providers) = registry(MockHost::default().with_provider("docs", docs()), &["docs"]);
    providers.load_submenu_items().await;

    host.set_items("docs", vec![item("docs/deploy", "Deployment", "docs/deploy")]);
    providers.handle_host_event(HostEvent::RefreshSubmenuItems).await;

    assert_eq!(host.loads_of("docs"), 2);
    assert!(providers.initial_load_complete());
    let target = SubmenuTarget::provider("docs");
    assert_eq!(providers.search(&target, "deployment")[0].id, "docs/deploy");
    assert!(providers.search(&target, "installation").is_empty());
}

#[tokio::test]
async fn test_search_all_providers_merges_by_score() {
    let host = MockHost::default()
        .with_provider("docs", docs())
        .with_provider(
            "snippets",
            vec![
                item("s/1", "guide", "guide"),
                item("s/2", "unrelated", "snippet"),
            ],
        );
    let (_host, providers) = registry(host, &["docs", "snippets"]);
    providers.load_submenu_items().await;

    let results = providers.search(&SubmenuTarget::AllProviders, "guide");
    assert!(results.len() >= 2);
    assert!(results.iter().any(|r| r.provider_title == "docs"));
    assert!(results.iter().any(|r| r.provider_title == "snippets"));
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_file_provider_fallback_tracks_open_files() {
    let host = MockHost::default()
        .with_provider(
            FILE_PROVIDER,
            vec![item("/repo/README.md", "README.md", "repo/README.md")],
        )
        .with_open_files(&["/repo/src/main.rs", "/repo/src/lib.rs"]);
    let (host, providers) = registry(host, &[FILE_PROVIDER]);
    providers.load_submenu_items().await;

    let target = SubmenuTarget::provider(FILE_PROVIDER);
    let items = providers.get_submenu_context_items(&target, "");
    assert_eq!(
        ids(&items),
        vec!["/repo/src/main.rs", "/repo/src/lib.rs", "/repo/README.md"]
    );
    assert_eq!(items[0].title, "main.rs");
    assert_eq!(items[0].description, "src/main.rs");

    host.set_open_files(&["/repo/src/lib.rs", "/repo/build.rs"]);
    providers.refresh_open_files().await.unwrap();
    assert_eq!(
        ids(&providers.get_submenu_context_items(&target, "")),
        vec![
            "/repo/src/lib.rs",
            "/repo/build.rs",
            "/repo/src/main.rs",
            "/repo/README.md"
        ]
    );
}

#[tokio::test]
async fn test_listen_applies_host_events_in_order() {
    let (_host, providers) = registry(MockHost::default(), &[]);
    let providers = Arc::new(providers);
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let listener = tokio::spawn(providers.clone().listen(rx));

    for title in ["First draft", "Second draft"] {
        tx.send(HostEvent::UpdateSubmenuItems {
            provider: "drafts".to_string(),
            submenu_items: vec![item("d", title, "")],
        })
        .unwrap();
    }
    tx.send(HostEvent::IsOsrEnabled(true)).unwrap();
    drop(tx);
    listener.await.unwrap();

    let results = providers.search(&SubmenuTarget::provider("drafts"), "second");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "Second draft");
}

#[tokio::test(start_paused = true)]
async fn test_refresher_skips_ticks_while_refresh_runs() {
    let host = MockHost {
        open_files_delay: Duration::from_secs(5),
        ..MockHost::default()
    }
    .with_open_files(&["/repo/src/main.rs"]);
    let (host, providers) = registry(host, &[]);
    let providers = Arc::new(providers);

    let refresher = OpenFilesRefresher::spawn_with_period(providers.clone(), Duration::from_secs(1));
    assert!(refresher.is_running());

    // Ticks at 1s..4s land while the first refresh is still waiting on the host.
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(host.open_files_calls.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    let items = providers.get_submenu_context_items(&SubmenuTarget::provider(FILE_PROVIDER), "");
    assert_eq!(ids(&items), vec!["/repo/src/main.rs"]);

    refresher.stop();
    let calls = host.open_files_calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(host.open_files_calls.load(Ordering::SeqCst), calls);
}

#[tokio::test(start_paused = true)]
async fn test_provider_loads_run_concurrently() {
    let host = MockHost::slow(Duration::from_secs(5))
        .with_provider("docs", docs())
        .with_provider("snippets", vec![item("s/1", "guide", "")]);
    let (_host, providers) = registry(host, &["docs", "snippets"]);

    let started = Instant::now();
    providers.load_submenu_items().await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(6));
    assert_eq!(providers.provider_state("docs"), ProviderState::Ready);
    assert_eq!(providers.provider_state("snippets"), ProviderState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_ignored_while_load_in_flight() {
    let host = MockHost::slow(Duration::from_secs(5)).with_provider("docs", docs());
    let (host, providers) = registry(host, &["docs"]);
    let providers = Arc::new(providers);

    let load = tokio::spawn({
        let providers = providers.clone();
        async move { providers.load_submenu_items().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(providers.is_loading());
    assert_eq!(providers.provider_state("docs"), ProviderState::Loading);

    providers.refresh().await;
    assert_eq!(host.loads_of("docs"), 1);

    load.await.unwrap();
    assert!(!providers.is_loading());
    assert_eq!(host.loads_of("docs"), 1);

    providers.refresh().await;
    assert_eq!(host.loads_of("docs"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_shows_placeholder_until_reload_settles() {
    let host = MockHost::slow(Duration::from_secs(5)).with_provider("empty", vec![]);
    let (_host, providers) = registry(host, &["empty"]);
    let providers = Arc::new(providers);
    let target = SubmenuTarget::provider("empty");

    providers.load_submenu_items().await;
    assert!(providers.get_submenu_context_items(&target, "").is_empty());

    let reload = tokio::spawn({
        let providers = providers.clone();
        async move { providers.refresh().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(!providers.initial_load_complete());
    assert_eq!(
        ids(&providers.get_submenu_context_items(&target, "")),
        vec![LOADING_ID]
    );

    reload.await.unwrap();
    assert!(providers.initial_load_complete());
    assert!(providers.get_submenu_context_items(&target, "").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dropped_load_releases_loading_flag() {
    let host = MockHost::slow(Duration::from_secs(5)).with_provider("docs", docs());
    let (host, providers) = registry(host, &["docs"]);

    let cut_short = timeout(Duration::from_secs(1), providers.load_submenu_items()).await;
    assert!(cut_short.is_err());
    assert!(!providers.is_loading());
    assert!(!providers.initial_load_complete());
    assert_eq!(providers.provider_state("docs"), ProviderState::Unregistered);

    providers.refresh().await;
    assert_eq!(host.loads_of("docs"), 2);
    assert!(providers.initial_load_complete());
    assert_eq!(providers.provider_state("docs"), ProviderState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_open_files_refresh_releases_busy_flag() {
    let host = MockHost {
        open_files_delay: Duration::from_secs(5),
        ..MockHost::default()
    }
    .with_open_files(&["/repo/src/main.rs"]);
    let (host, providers) = registry(host, &[]);

    let cut_short = timeout(Duration::from_secs(1), providers.refresh_open_files()).await;
    assert!(cut_short.is_err());

    providers.refresh_open_files().await.unwrap();
    assert_eq!(host.open_files_calls.load(Ordering::SeqCst), 2);
    let items = providers.get_submenu_context_items(&SubmenuTarget::provider(FILE_PROVIDER), "");
    assert_eq!(ids(&items), vec!["/repo/src/main.rs"]);
}

#[tokio::test(start_paused = true)]
async fn test_stopped_refresher_cancels_refresh_in_flight() {
    let host = MockHost {
        open_files_delay: Duration::from_secs(5),
        ..MockHost::default()
    }
    .with_open_files(&["/repo/src/main.rs"]);
    let (host, providers) = registry(host, &[]);
    let providers = Arc::new(providers);

    let refresher = OpenFilesRefresher::spawn_with_period(providers.clone(), Duration::from_secs(1));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(host.open_files_calls.load(Ordering::SeqCst), 1);
    refresher.stop();

    tokio::time::sleep(Duration::from_secs(10)).await;
    let target = SubmenuTarget::provider(FILE_PROVIDER);
    assert_eq!(
        ids(&providers.get_submenu_context_items(&target, "")),
        vec![LOADING_ID]
    );

    // The cancelled refresh released its busy flag.
    providers.refresh_open_files().await.unwrap();
    assert_eq!(host.open_files_calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        ids(&providers.get_submenu_context_items(&target, "")),
        vec!["/repo/src/main.rs"]
    );
}
