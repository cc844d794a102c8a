use super::SubmenuContextProviders;
use crate::constants::submenu::OPEN_FILES_REFRESH_INTERVAL;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically re-reads open editor files into the `file` fallback list.
///
/// The first refresh runs immediately. Refreshes run on the timer task, so
/// ticks missed while one is still waiting on the host are skipped rather
/// than queued. Dropping the handle stops the timer and cancels a refresh in
/// flight.
pub struct OpenFilesRefresher {
    handle: JoinHandle<()>,
}

impl OpenFilesRefresher {
    pub fn spawn(providers: Arc<SubmenuContextProviders>) -> Self {
        Self::spawn_with_period(providers, OPEN_FILES_REFRESH_INTERVAL)
    }

    pub fn spawn_with_period(providers: Arc<SubmenuContextProviders>, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if let Err(e) = providers.refresh_open_files().await {
                    tracing::warn!("Failed to refresh open files: {}", e);
                }
            }
        });
        Self { handle }
    }

    pub fn stop(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for OpenFilesRefresher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl SubmenuContextProviders {
    /// Start the open-files refresh timer for the lifetime of the returned handle.
    pub fn spawn_open_files_refresher(self: &Arc<Self>) -> OpenFilesRefresher {
        OpenFilesRefresher::spawn(self.clone())
    }
}
