use super::SubmenuItem;
use crate::constants::submenu::{FILE_PROVIDER, MAX_LENGTH};
use std::collections::{HashMap, HashSet};

/// Recently known items per provider, shown when a query has no matches.
///
/// Every list is capped at [`MAX_LENGTH`] entries.
#[derive(Debug, Default)]
pub struct FallbackStore {
    lists: HashMap<String, Vec<SubmenuItem>>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a provider's list with the first `MAX_LENGTH` items.
    pub fn set(&mut self, provider_title: &str, mut items: Vec<SubmenuItem>) {
        items.truncate(MAX_LENGTH);
        self.lists.insert(provider_title.to_string(), items);
    }

    /// Store the open files followed by as many loaded items as still fit.
    pub fn set_file_items(&mut self, open_files: Vec<SubmenuItem>, loaded: &[SubmenuItem]) {
        let room = MAX_LENGTH.saturating_sub(open_files.len());
        let combined = open_files
            .into_iter()
            .chain(loaded.iter().take(room).cloned())
            .collect();
        self.set(FILE_PROVIDER, dedup_by_id(combined));
    }

    /// Put freshly fetched open files first and keep previously known file
    /// entries that are no longer open after them.
    pub fn merge_open_files(&mut self, open_files: Vec<SubmenuItem>) {
        let previous = self.lists.remove(FILE_PROVIDER).unwrap_or_default();
        let merged = open_files.into_iter().chain(previous).collect();
        self.set(FILE_PROVIDER, dedup_by_id(merged));
    }

    pub fn get(&self, provider_title: &str) -> &[SubmenuItem] {
        self.lists
            .get(provider_title)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Drop later items whose id was already seen.
pub fn dedup_by_id(items: Vec<SubmenuItem>) -> Vec<SubmenuItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str) -> SubmenuItem {
        SubmenuItem::new(id, id.trim_start_matches('/'), id)
    }

    fn ids(items: &[SubmenuItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_set_truncates_to_max_length() {
        let mut store = FallbackStore::new();
        let items = (0..100).map(|i| file(&format!("/{i}"))).collect();
        store.set("docs", items);
        assert_eq!(store.get("docs").len(), MAX_LENGTH);
        assert_eq!(store.get("docs")[0].id, "/0");
    }

    #[test]
    fn test_unknown_provider_is_empty() {
        assert!(FallbackStore::new().get("nope").is_empty());
    }

    #[test]
    fn test_file_items_put_open_files_first() {
        let mut store = FallbackStore::new();
        let loaded: Vec<_> = (0..100).map(|i| file(&format!("/loaded/{i}"))).collect();
        store.set_file_items(vec![file("/open/a"), file("/open/b")], &loaded);

        let list = store.get(FILE_PROVIDER);
        assert_eq!(list.len(), MAX_LENGTH);
        assert_eq!(ids(&list[..3]), vec!["/open/a", "/open/b", "/loaded/0"]);
    }

    #[test]
    fn test_file_items_dedup_open_and_loaded() {
        let mut store = FallbackStore::new();
        store.set_file_items(vec![file("/a")], &[file("/a"), file("/b")]);
        assert_eq!(ids(store.get(FILE_PROVIDER)), vec!["/a", "/b"]);
    }

    #[test]
    fn test_merge_keeps_previously_known_files() {
        let mut store = FallbackStore::new();
        store.set(FILE_PROVIDER, vec![file("/a"), file("/b")]);

        store.merge_open_files(vec![file("/b"), file("/c")]);
        assert_eq!(ids(store.get(FILE_PROVIDER)), vec!["/b", "/c", "/a"]);

        store.merge_open_files(vec![file("/b"), file("/c")]);
        assert_eq!(ids(store.get(FILE_PROVIDER)), vec!["/b", "/c", "/a"]);
    }

    #[test]
    fn test_merge_caps_at_max_length() {
        let mut store = FallbackStore::new();
        store.set(
            FILE_PROVIDER,
            (0..MAX_LENGTH).map(|i| file(&format!("/old/{i}"))).collect(),
        );
        let open: Vec<_> = (0..10).map(|i| file(&format!("/open/{i}"))).collect();
        store.merge_open_files(open);

        let list = store.get(FILE_PROVIDER);
        assert_eq!(list.len(), MAX_LENGTH);
        assert_eq!(list[0].id, "/open/0");
        assert_eq!(list[10].id, "/old/0");
    }
}
