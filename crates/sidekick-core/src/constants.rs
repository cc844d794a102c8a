//! Centralized constants. Limits, intervals and placeholder strings live here.

// ─── Submenu ──────────────────────────────────────────────────────────────────

pub mod submenu {
    use std::time::Duration;

    /// Maximum number of items returned by a query and kept in a fallback list.
    pub const MAX_LENGTH: usize = 70;

    /// Title of the provider whose fallback list tracks open editor files.
    pub const FILE_PROVIDER: &str = "file";

    /// How often the open-files fallback is refreshed from the host.
    pub const OPEN_FILES_REFRESH_INTERVAL: Duration = Duration::from_millis(2000);

    /// Trailing path parts used to group open files before disambiguation.
    pub const OPEN_FILE_GROUP_PARTS: usize = 2;

    pub const LOADING_ID: &str = "loading";
    pub const LOADING_TITLE: &str = "Loading...";
    pub const LOADING_DESCRIPTION: &str = "Please wait while items are being loaded";
    pub const UNKNOWN_PROVIDER: &str = "unknown";
}

// ─── Search ───────────────────────────────────────────────────────────────────

pub mod search {
    /// Maximum Levenshtein distance for fuzzy term matches.
    pub const FUZZY_DISTANCE: usize = 2;

    /// Weight applied to terms reached by prefix expansion.
    pub const PREFIX_WEIGHT: f64 = 0.375;

    /// Weight applied to terms reached by fuzzy expansion.
    pub const FUZZY_WEIGHT: f64 = 0.45;

    /// BM25+ parameters.
    pub const BM25_K: f64 = 1.2;
    pub const BM25_B: f64 = 0.7;
    pub const BM25_D: f64 = 0.5;
}

// ─── Chat ─────────────────────────────────────────────────────────────────────

pub mod chat {
    pub const SLASH_PREFIX: char = '/';
    pub const ERROR_PREFIX: &str = "Error streaming response";
    pub const USER_INPUT_STEP: &str = "User Input";
}

// ─── Paths ────────────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "sidekick";
    pub const CONFIG_FILE: &str = "config.toml";
}
