//! Shell variable names derived from directory names.

use crate::paths;

/// Candidate variable name from the final component of `path`, before sanitizing.
///
/// `www.example.com` becomes `example`, other dotted names keep their first
/// segment, and `-` or space become `_`. Returns `None` for the root, `.`,
/// and names with an empty first segment such as `.config`.
pub(crate) fn candidate_name(path: &str) -> Option<String> {
    let base = paths::basename(path);
    if matches!(base, "" | "." | "/") {
        return None;
    }

    let segments: Vec<&str> = base.split('.').collect();
    let stem = match segments.as_slice() {
        ["www", domain, ..] => domain,
        [first, ..] => first,
        [] => return None,
    };
    if stem.is_empty() {
        return None;
    }
    Some(stem.replace(['-', ' '], "_"))
}

/// Make `name` a valid shell identifier.
pub(crate) fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", cleaned)
    } else {
        cleaned
    }
}

/// Variable name for `path` without any collision handling.
pub fn env_var_name(path: &str) -> Option<String> {
    candidate_name(path).map(|name| sanitize(&name))
}
