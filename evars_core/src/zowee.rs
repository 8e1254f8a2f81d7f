//! Compact `export` scripts for a set of directories.
//!
//! [`ZoweeOptimizer`] names every requested directory with a shell variable
//! and writes each value relative to the longest variable already defined
//! above it. Directories shared by two or more requested paths get an
//! intermediate variable of their own so the requested ones stay short:
//!
//! ```
//! use evars_core::ZoweeOptimizer;
//!
//! let lines = ZoweeOptimizer::new().optimize(&["/a", "/a/b", "/a/b/c"], &[] as &[&str]);
//! assert_eq!(lines, ["export a=/a", "export b=$a/b", "export c=$b/c"]);
//! ```
//!
//! Output is a pure function of the inputs. Intermediate definitions come
//! first, shortest source path first, followed by one line per requested
//! path in input order. Every `$NAME` in a value refers to a variable defined
//! on an earlier line or to one of the seeded roots.

use crate::binding::{BindingClass, VariableBinding, dedup_lines};
use crate::naming::{candidate_name, sanitize};
use crate::paths;
use crate::roots::RootTable;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

/// Produces minimal `export` scripts, optionally on top of known roots.
///
/// The optimizer itself only holds the seed variables; each call to
/// [`optimize`](Self::optimize) works on a fresh binding table.
#[derive(Debug, Clone, Default)]
pub struct ZoweeOptimizer {
    /// Variable name → path for roots the caller already defines.
    seeds: BTreeMap<String, String>,
}

impl ZoweeOptimizer {
    /// Optimizer without any pre-defined variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimizer that may substitute the variable roots of `table`.
    ///
    /// Each `$name` (or `'$name'`) display key contributes `name` bound to
    /// its first path. Literal path keys are not shell variables and are
    /// left out, as are roots at `/`.
    pub fn with_roots(table: &RootTable) -> Self {
        let mut seeds = BTreeMap::new();
        for (key, root_paths) in table.variable_roots().iter() {
            let Some(first) = root_paths.first() else {
                continue;
            };
            if first == "/" {
                trace!(key, "root at / is never substituted");
                continue;
            }
            seeds.insert(key.trim_start_matches('$').to_string(), first.clone());
        }
        Self { seeds }
    }

    /// Variables available before any line is emitted.
    pub fn seeds(&self) -> &BTreeMap<String, String> {
        &self.seeds
    }

    /// `export NAME=VALUE` lines for `paths`.
    ///
    /// `initial_display_keys` lists the roots the caller already exports
    /// (for example `$work`); a requested path equal to such a root is not
    /// redefined.
    pub fn optimize<S, K>(&self, paths: &[S], initial_display_keys: &[K]) -> Vec<String>
    where
        S: AsRef<str>,
        K: AsRef<str>,
    {
        self.optimize_bindings(paths, initial_display_keys)
            .iter()
            .map(VariableBinding::export_line)
            .collect()
    }

    /// Same as [`optimize`](Self::optimize), keeping the structured bindings.
    pub fn optimize_bindings<S, K>(
        &self,
        paths: &[S],
        initial_display_keys: &[K],
    ) -> Vec<VariableBinding>
    where
        S: AsRef<str>,
        K: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let requested: Vec<&str> = paths
            .iter()
            .map(|p| p.as_ref())
            .filter(|p| seen.insert(*p))
            .collect();
        let supplied: HashSet<&str> = initial_display_keys.iter().map(|k| k.as_ref()).collect();

        let mut builder = Bindings::new(self.seeds.clone());
        builder.synthesize_intermediates(&requested);
        builder.emit_terminals(&requested, &supplied);
        builder.finish()
    }
}

/// `true` when `a` and `b` are the same directory or one contains the other.
fn nested(a: &str, b: &str) -> bool {
    a == b || paths::strip_ancestor(a, b).is_some() || paths::strip_ancestor(b, a).is_some()
}

/// Binding table for a single optimization run.
struct Bindings {
    /// Variable name → source path, for everything defined so far.
    defined: BTreeMap<String, String>,
    intermediates: Vec<VariableBinding>,
    terminals: Vec<VariableBinding>,
}

impl Bindings {
    fn new(seeds: BTreeMap<String, String>) -> Self {
        Self {
            defined: seeds,
            intermediates: Vec::new(),
            terminals: Vec::new(),
        }
    }

    /// Variable name for `path`, prefixed by its parent's name when the plain
    /// name already belongs to another directory.
    fn var_name(&self, path: &str) -> Option<String> {
        let mut name = candidate_name(path)?;
        if self.defined.get(&name).is_some_and(|existing| existing != path) {
            let parent = paths::basename(paths::parent_dir(path));
            name = format!("{}_{}", parent, name);
        }
        Some(sanitize(&name))
    }

    /// Render `path` relative to the deepest defined ancestor.
    ///
    /// Equally deep ancestors under several names resolve to the smallest name.
    /// A variable bound to `/` is never used.
    fn substitute(&self, path: &str) -> String {
        let mut best: Option<(&str, &str, &str)> = None;
        for (name, source) in &self.defined {
            if source == "/" {
                continue;
            }
            let Some(rest) = paths::strip_ancestor(path, source) else {
                continue;
            };
            if best.is_none_or(|(_, current, _)| source.len() > current.len()) {
                best = Some((name.as_str(), source.as_str(), rest));
            }
        }
        match best {
            Some((name, _, rest)) => format!("${}/{}", name, rest),
            None => path.to_string(),
        }
    }

    /// Define variables for directories shared by at least two requested paths.
    fn synthesize_intermediates(&mut self, requested: &[&str]) {
        let inputs: HashSet<&str> = requested.iter().copied().collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for path in requested {
            for (idx, _) in path.match_indices('/').filter(|(idx, _)| *idx > 0) {
                *counts.entry(&path[..idx]).or_insert(0) += 1;
            }
        }

        let mut candidates: Vec<&str> = counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(prefix, _)| *prefix)
            .collect();
        // Ancestors first so deeper candidates see them as defined.
        candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

        for prefix in candidates {
            if inputs.contains(prefix) || inputs.contains(paths::parent_dir(prefix)) {
                continue;
            }
            if self.defined.values().any(|source| nested(prefix, source)) {
                continue;
            }

            let Some(name) = self.var_name(prefix) else {
                continue;
            };
            if self.defined.contains_key(&name) {
                trace!(prefix, name = %name, "intermediate name already taken");
                continue;
            }

            let value = self.substitute(prefix);
            debug!(prefix, name = %name, value = %value, "defining intermediate variable");
            self.defined.insert(name.clone(), prefix.to_string());
            self.intermediates.push(VariableBinding::new(
                name,
                prefix,
                value,
                BindingClass::Intermediate,
            ));
        }
    }

    /// One binding per requested path, in request order.
    fn emit_terminals(&mut self, requested: &[&str], supplied: &HashSet<&str>) {
        for &path in requested {
            let Some(name) = self.var_name(path) else {
                trace!(path, "no variable name for path");
                continue;
            };

            let is_supplied_root = supplied.contains(format!("${}", name).as_str())
                && self.defined.get(&name).is_some_and(|source| source == path);
            if is_supplied_root {
                debug!(path, name = %name, "path is a supplied root, not redefining");
                continue;
            }

            let value = self.substitute(path);
            self.defined.insert(name.clone(), path.to_string());
            self.terminals.push(VariableBinding::new(
                name,
                path,
                value,
                BindingClass::Terminal,
            ));
        }
    }

    fn finish(self) -> Vec<VariableBinding> {
        let mut all = self.intermediates;
        all.extend(self.terminals);
        dedup_lines(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use regex::Regex;
    use std::collections::HashMap;

    const NONE: [&str; 0] = [];

    fn optimize(paths: &[&str]) -> Vec<String> {
        ZoweeOptimizer::new().optimize(paths, &NONE)
    }

    #[test]
    fn test_simple_nested_structure() {
        assert_eq!(
            optimize(&["/a", "/a/b", "/a/b/c"]),
            vec!["export a=/a", "export b=$a/b", "export c=$b/c"]
        );
    }

    #[test]
    fn test_unrelated_paths() {
        assert_eq!(
            optimize(&["/x/y", "/m/n"]),
            vec!["export y=/x/y", "export n=/m/n"]
        );
    }

    #[test]
    fn test_branches_from_requested_root() {
        // "/a" is shared by all three and not requested, so it gets its own variable.
        assert_eq!(
            optimize(&["/a/b", "/a/b/c", "/a/b/d"]),
            vec![
                "export a=/a",
                "export b=$a/b",
                "export c=$b/c",
                "export d=$b/d",
            ]
        );
    }

    #[test]
    fn test_intermediate_variable_for_shared_ancestor() {
        assert_eq!(
            optimize(&[
                "/root/projects/app1",
                "/root/projects/app2",
                "/root/projects/app3",
            ]),
            vec![
                "export root=/root",
                "export app1=$root/projects/app1",
                "export app2=$root/projects/app2",
                "export app3=$root/projects/app3",
            ]
        );
    }

    #[test]
    fn test_intermediates_precede_terminals_by_length() {
        let lines = optimize(&["/srv/x/one", "/srv/x/two", "/home/longer/a", "/home/longer/b"]);
        assert_eq!(
            lines,
            vec![
                "export srv=/srv",
                "export home=/home",
                "export one=$srv/x/one",
                "export two=$srv/x/two",
                "export a=$home/longer/a",
                "export b=$home/longer/b",
            ]
        );
    }

    #[test]
    fn test_no_intermediate_when_parent_is_requested() {
        // "/w" is requested, so "/w/shared" is left to the terminals.
        let lines = optimize(&["/w", "/w/shared/a", "/w/shared/b"]);
        assert_eq!(
            lines,
            vec![
                "export w=/w",
                "export a=$w/shared/a",
                "export b=$w/shared/b",
            ]
        );
    }

    #[test]
    fn test_with_initial_variables() {
        let mut table = RootTable::new();
        table
            .insert("$work", vec!["/path/to/work".to_string()])
            .unwrap();
        let optimizer = ZoweeOptimizer::with_roots(&table);

        let lines = optimizer.optimize(
            &["/path/to/work/project_a", "/path/to/work/project_b"],
            &["$work"],
        );
        assert_eq!(
            lines,
            vec![
                "export project_a=$work/project_a",
                "export project_b=$work/project_b",
            ]
        );
    }

    #[test]
    fn test_supplied_root_not_redefined() {
        let mut table = RootTable::new();
        table.insert("$work", vec!["/srv/work".to_string()]).unwrap();
        let optimizer = ZoweeOptimizer::with_roots(&table);

        let lines = optimizer.optimize(&["/srv/work", "/srv/work/app"], &["$work"]);
        assert_eq!(lines, vec!["export app=$work/app"]);

        // Without the display key the root is emitted like any other path.
        let lines = optimizer.optimize(&["/srv/work", "/srv/work/app"], &NONE);
        assert_eq!(lines, vec!["export work=/srv/work", "export app=$work/app"]);
    }

    #[test]
    fn test_literal_root_keys_are_not_seeds() {
        let mut table = RootTable::new();
        table.insert("/srv/work", vec!["/srv/work".to_string()]).unwrap();
        table.insert("'$sites'", vec!["/var/www".to_string()]).unwrap();
        let optimizer = ZoweeOptimizer::with_roots(&table);

        let seeds: Vec<_> = optimizer.seeds().keys().cloned().collect();
        assert_eq!(seeds, vec!["sites"]);
    }

    #[test]
    fn test_filesystem_root_is_not_a_seed() {
        let mut table = RootTable::new();
        table.insert("$top", vec!["/".to_string()]).unwrap();
        let optimizer = ZoweeOptimizer::with_roots(&table);
        assert!(optimizer.seeds().is_empty());

        let lines = optimizer.optimize(&["/srv/x"], &["$top"]);
        assert_eq!(lines, vec!["export x=/srv/x"]);
    }

    #[test]
    fn test_intermediate_without_name_skipped() {
        assert_eq!(
            optimize(&["/.cfg/a", "/.cfg/b"]),
            vec!["export a=/.cfg/a", "export b=/.cfg/b"]
        );
    }

    #[test]
    fn test_intermediate_with_taken_name_skipped() {
        // "/q" would be named "q", which belongs to "/s/q", so it falls back to
        // "__q" (empty parent prefix), which is taken as well.
        let mut table = RootTable::new();
        table.insert("$q", vec!["/s/q".to_string()]).unwrap();
        table.insert("$__q", vec!["/t/z".to_string()]).unwrap();
        let optimizer = ZoweeOptimizer::with_roots(&table);

        let lines = optimizer.optimize(&["/q/a", "/q/b"], &NONE);
        assert_eq!(lines, vec!["export a=/q/a", "export b=/q/b"]);
    }

    #[test]
    fn test_empty_paths() {
        assert!(optimize(&[]).is_empty());
    }

    #[test]
    fn test_single_path() {
        assert_eq!(optimize(&["/usr/local/bin"]), vec!["export bin=/usr/local/bin"]);
    }

    #[test]
    fn test_collision_prefixes_parent_name() {
        assert_eq!(
            optimize(&["/path1/project", "/path2/project"]),
            vec![
                "export project=/path1/project",
                "export path2_project=/path2/project",
            ]
        );
    }

    #[test]
    fn test_duplicates_collapse() {
        let lines = optimize(&["/a/b", "/a/b", "/a/c"]);
        assert_eq!(lines, vec!["export a=/a", "export b=$a/b", "export c=$a/c"]);
    }

    #[test]
    fn test_unnamed_paths_skipped() {
        assert_eq!(optimize(&["/", "/x/.hidden", "/x/y"]), vec!["export y=/x/y"]);
    }

    #[test]
    fn test_generated_names() {
        let builder = Bindings::new(BTreeMap::new());
        assert_eq!(builder.var_name("/path/to/project").as_deref(), Some("project"));
        assert_eq!(builder.var_name("/path/to/www.example.com").as_deref(), Some("example"));
        assert_eq!(builder.var_name("/path/to/my-project").as_deref(), Some("my_project"));
        assert_eq!(builder.var_name("/path/to/123project").as_deref(), Some("_123project"));
        assert_eq!(builder.var_name("/path/to/app.com").as_deref(), Some("app"));
    }

    #[test]
    fn test_generated_name_collision_with_digit_parent() {
        let mut defined = BTreeMap::new();
        defined.insert("app".to_string(), "/elsewhere/app".to_string());
        let builder = Bindings::new(defined);
        assert_eq!(builder.var_name("/9x/app").as_deref(), Some("_9x_app"));
        assert_eq!(builder.var_name("/elsewhere/app").as_deref(), Some("app"));
    }

    #[test]
    fn test_substitute_prefers_deepest() {
        let mut defined = BTreeMap::new();
        defined.insert("a".to_string(), "/a".to_string());
        defined.insert("ab".to_string(), "/a/b".to_string());
        defined.insert("abc".to_string(), "/a/bc".to_string());
        let builder = Bindings::new(defined);
        assert_eq!(builder.substitute("/a/b/c"), "$ab/c");
        assert_eq!(builder.substitute("/a/x"), "$a/x");
        assert_eq!(builder.substitute("/a"), "/a");
        assert_eq!(builder.substitute("/z"), "/z");
    }

    #[test]
    fn test_idempotent_across_calls() {
        let optimizer = ZoweeOptimizer::new();
        let paths = ["/r/p/a", "/r/p/b", "/r/q", "/s"];
        assert_eq!(optimizer.optimize(&paths, &NONE), optimizer.optimize(&paths, &NONE));
    }

    /// Replay `lines` like a shell would, starting from `seeds`.
    fn replay(bindings: &[VariableBinding], seeds: &BTreeMap<String, String>) -> Vec<String> {
        let mut env: HashMap<String, String> = seeds.clone().into_iter().collect();
        let mut expanded = Vec::new();
        for binding in bindings {
            let value = match binding.value.strip_prefix('$') {
                Some(reference) => {
                    let (name, rest) = reference.split_once('/').unwrap();
                    format!("{}/{}", env[name], rest)
                }
                None => binding.value.clone(),
            };
            env.insert(binding.name.clone(), value.clone());
            expanded.push(value);
        }
        expanded
    }

    fn arb_paths() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::collection::vec("[ab]{1,2}", 1..4), 1..10).prop_map(
            |dirs| {
                dirs.into_iter()
                    .map(|parts| format!("/{}", parts.join("/")))
                    .collect()
            },
        )
    }

    /// Paths whose leaf names are all distinct, so no two requested paths compete for a name.
    fn arb_unique_leaf_paths() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::collection::vec("[ab]{1,2}", 0..4), 1..10).prop_map(
            |dirs| {
                dirs.into_iter()
                    .enumerate()
                    .map(|(i, parts)| {
                        let mut parts = parts;
                        parts.push(format!("r{}", i));
                        format!("/{}", parts.join("/"))
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            max_shrink_iters: 10000,
            ..ProptestConfig::default()
        })]

        #[test]
        fn prop_output_is_deterministic(paths in arb_paths()) {
            let first = ZoweeOptimizer::new().optimize(&paths, &NONE);
            let second = ZoweeOptimizer::new().optimize(&paths, &NONE);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_no_forward_references(paths in arb_paths()) {
            let line = Regex::new(r"^export ([A-Za-z_][A-Za-z0-9_]*)=(\S+)$").unwrap();
            let mut defined = HashSet::new();
            for text in ZoweeOptimizer::new().optimize(&paths, &NONE) {
                let caps = line.captures(&text);
                prop_assert!(caps.is_some(), "malformed line: {}", text);
                let caps = caps.unwrap();
                if let Some(reference) = caps[2].strip_prefix('$') {
                    let name = reference.split('/').next().unwrap_or_default();
                    prop_assert!(defined.contains(name), "{} used before definition", name);
                }
                defined.insert(caps[1].to_string());
            }
        }

        #[test]
        fn prop_one_terminal_per_path(paths in arb_unique_leaf_paths()) {
            let bindings = ZoweeOptimizer::new().optimize_bindings(&paths, &NONE);
            let distinct: HashSet<&String> = paths.iter().collect();
            for path in distinct {
                let count = bindings
                    .iter()
                    .filter(|b| b.class == BindingClass::Terminal && &b.source_path == path)
                    .count();
                prop_assert_eq!(count, 1, "path {} has {} terminal lines", path, count);
            }
        }

        #[test]
        fn prop_replay_reproduces_paths(paths in arb_unique_leaf_paths()) {
            let mut table = RootTable::new();
            table.insert("$top", vec!["/a".to_string()]).unwrap();
            let optimizer = ZoweeOptimizer::with_roots(&table);

            let bindings = optimizer.optimize_bindings(&paths, &["$top"]);
            let expanded = replay(&bindings, optimizer.seeds());
            for (binding, value) in bindings.iter().zip(expanded) {
                prop_assert_eq!(&binding.source_path, &value);
            }
        }
    }
}
