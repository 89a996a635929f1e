//! User-supplied exclusion rules.
//!
//! Rules come in two strengths. Soft-excluded files stay visible in the
//! structure listing but contribute no content; forced-excluded files are
//! removed from the output entirely. Each strength holds three rule kinds
//! (path prefix, regex, substring) reduced by logical OR.

use regex::Regex;
use std::path::{Path, PathBuf};

use crate::patterns::relative_path;

/// One exclusion rule. Ordered prefix -> regex -> substring inside each
/// strength; order affects only where the OR short-circuits.
#[derive(Debug, Clone)]
enum Rule {
    /// Absolute path prefix: matches the path itself and everything under it.
    Prefix(PathBuf),
    /// Searched (not anchored) against the absolute path string.
    Pattern(Regex),
    /// Plain substring test. Soft rules also see the base-relative form and
    /// the basename; forced rules see the absolute path only.
    Substring(String),
}

impl Rule {
    fn matches(&self, path: &Path, abs: &str, rel: Option<&str>, name: Option<&str>) -> bool {
        match self {
            Rule::Prefix(prefix) => path.starts_with(prefix),
            Rule::Pattern(re) => re.is_match(abs),
            Rule::Substring(needle) => {
                abs.contains(needle.as_str())
                    || rel.is_some_and(|r| r.contains(needle.as_str()))
                    || name.is_some_and(|n| n.contains(needle.as_str()))
            }
        }
    }
}

/// Raw exclusion patterns as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    pub exclude: Vec<String>,
    pub exclude_regex: Vec<String>,
    pub exclude_match: Vec<String>,
    pub force_exclude: Vec<String>,
    pub force_exclude_regex: Vec<String>,
    pub force_exclude_match: Vec<String>,
}

/// Compiled exclusion rules, queried per path during collection and
/// classification.
#[derive(Debug, Clone, Default)]
pub struct ExclusionEngine {
    soft: Vec<Rule>,
    forced: Vec<Rule>,
}

impl ExclusionEngine {
    /// Compile the raw patterns. Relative path patterns are resolved against
    /// every base directory; a pattern that is not a valid regex is dropped
    /// with a warning and never matches (the run continues).
    pub fn new(bases: &[PathBuf], rules: &ExcludeRules) -> Self {
        ExclusionEngine {
            soft: compile_tier(bases, &rules.exclude, &rules.exclude_regex, &rules.exclude_match),
            forced: compile_tier(
                bases,
                &rules.force_exclude,
                &rules.force_exclude_regex,
                &rules.force_exclude_match,
            ),
        }
    }

    /// Soft exclusion: the path stays listed but its content is omitted.
    /// For directories this also stops traversal.
    pub fn is_excluded(&self, path: &Path, base: &Path) -> bool {
        if self.soft.is_empty() {
            return false;
        }
        let abs = path.to_string_lossy();
        let rel = relative_path(path, base);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.soft
            .iter()
            .any(|r| r.matches(path, &abs, Some(&rel), Some(&name)))
    }

    /// Forced exclusion: the path is removed from the output entirely.
    pub fn is_forced_excluded(&self, path: &Path) -> bool {
        if self.forced.is_empty() {
            return false;
        }
        let abs = path.to_string_lossy();
        self.forced.iter().any(|r| r.matches(path, &abs, None, None))
    }
}

fn compile_tier(
    bases: &[PathBuf],
    exact: &[String],
    regexes: &[String],
    substrings: &[String],
) -> Vec<Rule> {
    let mut rules = Vec::new();

    for pattern in exact {
        let p = Path::new(pattern);
        if p.is_absolute() {
            rules.push(Rule::Prefix(p.to_path_buf()));
        } else {
            // A relative pattern applies under every base directory.
            for base in bases {
                rules.push(Rule::Prefix(base.join(pattern)));
            }
        }
    }

    for pattern in regexes {
        match Regex::new(pattern) {
            Ok(re) => rules.push(Rule::Pattern(re)),
            Err(err) => {
                eprintln!("Warning: Ignoring invalid exclude regex '{pattern}': {err}");
            }
        }
    }

    for pattern in substrings {
        rules.push(Rule::Substring(pattern.clone()));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(bases: &[&str], rules: ExcludeRules) -> ExclusionEngine {
        let bases: Vec<PathBuf> = bases.iter().map(PathBuf::from).collect();
        ExclusionEngine::new(&bases, &rules)
    }

    #[test]
    fn test_relative_prefix_resolves_against_every_base() {
        let eng = engine(
            &["/repo_a", "/repo_b"],
            ExcludeRules {
                exclude: vec!["vendor".into()],
                ..Default::default()
            },
        );
        let base_a = PathBuf::from("/repo_a");
        let base_b = PathBuf::from("/repo_b");
        assert!(eng.is_excluded(Path::new("/repo_a/vendor/x.go"), &base_a));
        assert!(eng.is_excluded(Path::new("/repo_b/vendor"), &base_b));
        assert!(!eng.is_excluded(Path::new("/repo_a/src/x.go"), &base_a));
    }

    #[test]
    fn test_prefix_requires_component_boundary() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                exclude: vec!["src/gen".into()],
                ..Default::default()
            },
        );
        let base = PathBuf::from("/repo");
        assert!(eng.is_excluded(Path::new("/repo/src/gen"), &base));
        assert!(eng.is_excluded(Path::new("/repo/src/gen/a.rs"), &base));
        assert!(!eng.is_excluded(Path::new("/repo/src/gentle.rs"), &base));
    }

    #[test]
    fn test_absolute_prefix_used_as_is() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                force_exclude: vec!["/elsewhere/secrets".into()],
                ..Default::default()
            },
        );
        assert!(eng.is_forced_excluded(Path::new("/elsewhere/secrets/key.pem")));
        assert!(!eng.is_forced_excluded(Path::new("/repo/secrets/key.pem")));
    }

    #[test]
    fn test_regex_is_searched_not_anchored() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                exclude_regex: vec![r"\.lock$".into()],
                ..Default::default()
            },
        );
        let base = PathBuf::from("/repo");
        assert!(eng.is_excluded(Path::new("/repo/Cargo.lock"), &base));
        assert!(!eng.is_excluded(Path::new("/repo/lockfree.rs"), &base));
    }

    #[test]
    fn test_invalid_regex_is_dropped_not_fatal() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                exclude_regex: vec!["[invalid".into()],
                exclude_match: vec!["zzz".into()],
                ..Default::default()
            },
        );
        let base = PathBuf::from("/repo");
        assert!(!eng.is_excluded(Path::new("/repo/[invalid"), &base));
        assert!(eng.is_excluded(Path::new("/repo/zzz.txt"), &base));
    }

    #[test]
    fn test_soft_substring_sees_relative_form_and_basename() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                exclude_match: vec!["snapshot".into()],
                ..Default::default()
            },
        );
        let base = PathBuf::from("/repo");
        assert!(eng.is_excluded(Path::new("/repo/tests/snapshot_v1.rs"), &base));
        assert!(!eng.is_excluded(Path::new("/repo/tests/unit.rs"), &base));
    }

    #[test]
    fn test_forced_substring_sees_absolute_path_only() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                force_exclude_match: vec!["generated".into()],
                ..Default::default()
            },
        );
        assert!(eng.is_forced_excluded(Path::new("/repo/src/generated/api.rs")));
        assert!(!eng.is_forced_excluded(Path::new("/repo/src/api.rs")));
    }

    #[test]
    fn test_strengths_are_independent() {
        let eng = engine(
            &["/repo"],
            ExcludeRules {
                exclude_match: vec!["fixtures".into()],
                ..Default::default()
            },
        );
        let base = PathBuf::from("/repo");
        assert!(eng.is_excluded(Path::new("/repo/fixtures/a.json"), &base));
        assert!(!eng.is_forced_excluded(Path::new("/repo/fixtures/a.json")));
    }

    #[test]
    fn test_empty_rules_match_nothing() {
        let eng = engine(&["/repo"], ExcludeRules::default());
        let base = PathBuf::from("/repo");
        assert!(!eng.is_excluded(Path::new("/repo/anything"), &base));
        assert!(!eng.is_forced_excluded(Path::new("/repo/anything")));
    }
}
