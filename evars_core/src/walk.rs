//! Discovery of git repositories below a root directory.

use crate::error::Result;
use std::path::Path;
use tracing::warn;

/// Marker file that excludes a directory and everything below it.
pub const IGNORE_MARKER: &str = ".ignore";

/// Directories found while walking one root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkReport {
    /// Repository directories, in walk order.
    pub repos: Vec<String>,
    /// Directories skipped because they hold an `.ignore` file.
    pub ignored: Vec<String>,
}

fn is_repo(dir: &Path) -> bool {
    dir.join(".git").exists()
}

fn is_ignored(dir: &Path) -> bool {
    dir.join(IGNORE_MARKER).exists()
}

/// Find every git repository at or below `root`.
///
/// The walk does not descend into repositories or into directories marked
/// with an `.ignore` file. Gitignore rules are not applied.
pub fn find_git_repos(root: &Path) -> Result<WalkReport> {
    let walker = ignore::WalkBuilder::new(root)
        .standard_filters(false) // .ignore is a marker here, not a pattern file
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            // Prune below repositories and ignored directories.
            let parent_done = entry
                .path()
                .parent()
                .is_some_and(|parent| is_repo(parent) || is_ignored(parent));
            is_dir && !parent_done
        })
        .build();

    let mut report = WalkReport::default();
    for entry in walker {
        let entry = entry?;
        let dir = entry.path();
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let Some(display) = dir.to_str() else {
            warn!(path = %dir.display(), "skipping directory with non UTF-8 path");
            continue;
        };

        if is_ignored(dir) {
            report.ignored.push(display.to_string());
        } else if is_repo(dir) {
            report.repos.push(display.to_string());
        }
    }

    Ok(report)
}
