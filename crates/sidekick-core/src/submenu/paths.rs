//! Display names for open editor files.

use super::SubmenuItem;
use std::collections::HashMap;

fn parts(path: &str) -> Vec<&str> {
    path.split(['/', '\\']).collect()
}

/// Last component of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or("")
}

/// The last `n` components of a path joined with `/`.
pub fn last_n_path_parts(path: &str, n: usize) -> String {
    if n == 0 {
        return String::new();
    }
    let parts = parts(path);
    let start = parts.len().saturating_sub(n);
    parts[start..].join("/")
}

/// Group paths by their last `n` components.
pub fn group_by_last_n_path_parts<'a>(
    paths: &'a [String],
    n: usize,
) -> HashMap<String, Vec<&'a str>> {
    let mut groups: HashMap<String, Vec<&str>> = HashMap::new();
    for path in paths {
        groups
            .entry(last_n_path_parts(path, n))
            .or_default()
            .push(path.as_str());
    }
    groups
}

/// Shortest trailing path (at least `group_parts` parts) that tells `path`
/// apart from the other members of its group. `groups` must be keyed by the
/// last `group_parts` components.
pub fn unique_file_path(
    path: &str,
    groups: &HashMap<String, Vec<&str>>,
    group_parts: usize,
) -> String {
    let mut n = group_parts;
    let Some(group) = groups.get(&last_n_path_parts(path, n)) else {
        return last_n_path_parts(path, n);
    };

    let depth = parts(path).len();
    while n < depth
        && group
            .iter()
            .any(|other| *other != path && last_n_path_parts(other, n) == last_n_path_parts(path, n))
    {
        n += 1;
    }
    last_n_path_parts(path, n)
}

/// Submenu items for the files currently open in the editor.
pub fn open_file_items(paths: &[String], group_parts: usize) -> Vec<SubmenuItem> {
    let groups = group_by_last_n_path_parts(paths, group_parts);
    paths
        .iter()
        .map(|path| SubmenuItem {
            id: path.clone(),
            title: basename(path).to_string(),
            description: unique_file_path(path, &groups, group_parts),
        })
        .collect()
}
