//! Path string algebra.
//!
//! Every function here works on `/`-separated absolute path strings and never
//! touches the filesystem. Symbolic links are not resolved.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Fallback returned when the only shared ancestor is the filesystem root.
fn root_fallback(allow_root_match: bool) -> String {
    if allow_root_match {
        "/".to_string()
    } else {
        String::new()
    }
}

fn ensure_absolute<S: AsRef<str>>(paths: &[S], caller: &str) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        if !path.starts_with('/') {
            return Err(Error::invalid_input(format!(
                "{} received relative path: {}",
                caller, path
            )));
        }
    }
    Ok(())
}

/// Number of non-empty components in `path`.
pub fn depth(path: &str) -> usize {
    path.split('/').filter(|part| !part.is_empty()).count()
}

/// Parent directory of `path`, `/` for top-level entries and `.` for bare names.
pub fn parent_dir(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }
    match trimmed.rfind('/') {
        Some(idx) => {
            let head = trimmed[..idx].trim_end_matches('/');
            if head.is_empty() { "/" } else { head }
        }
        None => ".",
    }
}

/// Final component of `path`; `/` for the root and `.` for an empty string.
pub fn basename(path: &str) -> &str {
    if path.is_empty() {
        return ".";
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// If `ancestor` is a strict directory ancestor of `path`, return the remainder.
///
/// `strip_ancestor("/a/b/c", "/a")` is `Some("b/c")`; `"/ab"` is not below `"/a"`.
pub fn strip_ancestor<'a>(path: &'a str, ancestor: &str) -> Option<&'a str> {
    if ancestor == "/" {
        return path.strip_prefix('/').filter(|rest| !rest.is_empty());
    }
    path.strip_prefix(ancestor)?.strip_prefix('/')
}

/// Lexically normalize an absolute path: drop `.`, empty components and
/// trailing slashes, and fold `..` into its parent.
pub fn clean(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    format!("/{}", stack.join("/"))
}

/// Make `path` absolute against `cwd` without consulting the filesystem.
pub fn absolutize(path: &str, cwd: &str) -> String {
    if path.starts_with('/') {
        clean(path)
    } else {
        clean(&format!("{}/{}", cwd, path))
    }
}

/// Longest directory path shared by all `paths`.
///
/// An empty slice yields `""`. A single path yields its parent directory.
/// When nothing but the root is shared, the result is `/` if
/// `allow_root_match` is set and `""` otherwise.
///
/// Every path takes part in the comparison, not only the first and last in
/// sorted order: `/a-b` sorts between `/a` and `/a/c`, so comparing the
/// extremes alone would report `/a` for a set that only shares `/`.
pub fn common_prefix<S: AsRef<str>>(paths: &[S], allow_root_match: bool) -> Result<String> {
    if paths.is_empty() {
        return Ok(String::new());
    }
    ensure_absolute(paths, "common_prefix")?;

    if paths.len() == 1 {
        let dir = parent_dir(paths[0].as_ref());
        if dir == "/" {
            return Ok(root_fallback(allow_root_match));
        }
        return Ok(dir.to_string());
    }

    let mut sorted: Vec<&str> = paths.iter().map(|p| p.as_ref()).collect();
    sorted.sort_unstable();

    let first: Vec<&str> = sorted[0].split('/').collect();
    let mut shared = first.len();
    // Compare every path, not only the extremes: "/a-b" sorts between "/a" and "/a/c".
    for other in &sorted[1..] {
        shared = first
            .iter()
            .zip(other.split('/'))
            .take(shared)
            .take_while(|(a, b)| **a == *b)
            .count();
    }

    let prefix = first[..shared].join("/");
    if prefix.is_empty() {
        return Ok(root_fallback(allow_root_match));
    }
    Ok(prefix)
}

/// Keep at most the first `level` components of every path, deduplicated and sorted.
pub fn trim_to_level<S: AsRef<str>>(paths: &[S], level: usize) -> BTreeSet<String> {
    paths
        .iter()
        .map(|path| {
            let kept: Vec<&str> = path
                .as_ref()
                .split('/')
                .filter(|part| !part.is_empty())
                .take(level)
                .collect();
            format!("/{}", kept.join("/"))
        })
        .collect()
}

/// Shared root directory of `paths`, climbing `level - 1` directories above
/// the deepest directory they have in common.
///
/// Trimming starts `level` components above the shallowest path and moves up
/// one component at a time until the trimmed set collapses to a single
/// directory. `level` must be at least 1.
///
/// Starting below the shallowest depth means a higher level can skip a
/// shared ancestor that a plain walk up from the deepest component would
/// find: `roots(["/a/x", "/a/y"], 2)` gives `""` rather than `/a`, while
/// level 1 on deeper trees reports the directory one step above the
/// repositories.
pub fn roots<S: AsRef<str>>(paths: &[S], level: usize, allow_root_match: bool) -> Result<String> {
    if level == 0 {
        return Err(Error::invalid_input(format!(
            "level must be positive, but it is {}",
            level
        )));
    }
    if paths.is_empty() {
        return Ok(root_fallback(allow_root_match));
    }
    ensure_absolute(paths, "roots")?;

    if paths.len() == 1 {
        let dir = parent_dir(paths[0].as_ref());
        if dir == "/" {
            return Ok(root_fallback(allow_root_match));
        }
        return Ok(dir.to_string());
    }

    let shallowest = paths.iter().map(|p| depth(p.as_ref())).min().unwrap_or(0);
    let mut current = shallowest.saturating_sub(level);
    while current > 0 {
        let trimmed = trim_to_level(paths, current);
        if trimmed.len() == 1 {
            if let Some(root) = trimmed.into_iter().next() {
                return Ok(root);
            }
        }
        current -= 1;
    }

    Ok(root_fallback(allow_root_match))
}
