use super::IdeMessenger;
use std::sync::atomic::{AtomicBool, Ordering};

/// Tracks whether the JetBrains host renders the webview off-screen.
///
/// The status is requested once; answers that arrive while no request is
/// in flight are ignored.
#[derive(Debug, Default)]
pub struct OsrStatus {
    fetching: AtomicBool,
    enabled: AtomicBool,
}

impl OsrStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send the capability query if the host is JetBrains and none is pending.
    pub async fn request(&self, messenger: &dyn IdeMessenger) {
        if !messenger.is_jetbrains() {
            return;
        }
        if self
            .fetching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        if let Err(e) = messenger.request_osr_status().await {
            tracing::warn!("OSR status request failed: {}", e);
            self.fetching.store(false, Ordering::SeqCst);
        }
    }

    pub fn on_response(&self, enabled: bool) {
        if self.fetching.swap(false, Ordering::SeqCst) {
            self.enabled.store(enabled, Ordering::SeqCst);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching.load(Ordering::SeqCst)
    }
}
