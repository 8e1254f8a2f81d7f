//! Display abbreviation of directories under known roots.

use crate::paths;
use crate::roots::RootTable;

/// Replace the longest root path that contains `dir` by its display key.
///
/// `dir` matches a root path when it is that path or lies below it. Among
/// equally long matches the smallest display key wins. Directories outside
/// every root are returned unchanged.
///
/// A root of `/` never substitutes: `$top/srv` would expand to `//srv`.
pub fn abbreviate(dir: &str, table: &RootTable) -> String {
    let mut best: Option<(&str, &str)> = None;
    for (key, root_paths) in table.iter() {
        for root in root_paths.iter().map(String::as_str) {
            if root == "/" {
                continue;
            }
            let matches = dir == root || paths::strip_ancestor(dir, root).is_some();
            if !matches {
                continue;
            }
            if best.is_none_or(|(_, current)| root.len() > current.len()) {
                best = Some((key, root));
            }
        }
    }

    match best {
        Some((key, root)) => format!("{}{}", key, &dir[root.len()..]),
        None => dir.to_string(),
    }
}
