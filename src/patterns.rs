//! Gitignore-style rule loading and matching.
//!
//! This is a deliberate approximation of gitignore semantics: patterns are
//! shell-style globs, trailing-slash patterns mean directories, patterns
//! without a slash also match basenames, and negation patterns (`!`) are
//! parsed but never re-include anything. Nested ignore files below the
//! repository root are not consulted.

use glob::Pattern;
use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result};

/// A single parsed ignore rule.
#[derive(Debug, Clone)]
struct IgnorePattern {
    raw: String,
    /// Compiled glob, None when the pattern text is not a valid glob.
    /// An uncompilable rule never matches.
    glob: Option<Pattern>,
    /// Trailing-slash rule: matches the directory and everything under it.
    dir_only: bool,
    /// Leading `!` rule: recognized but inert, it never re-includes.
    negated: bool,
}

impl IgnorePattern {
    fn parse(line: &str) -> Self {
        let negated = line.starts_with('!');
        let dir_only = line.ends_with('/');
        IgnorePattern {
            raw: line.to_string(),
            glob: Pattern::new(line).ok(),
            dir_only,
            negated,
        }
    }

    fn matches(&self, rel: &str, rel_slash: &str, name: &str) -> bool {
        if self.negated {
            return false;
        }
        if self.dir_only {
            return rel_slash.starts_with(self.raw.as_str())
                || self.glob.as_ref().is_some_and(|g| g.matches(rel_slash));
        }
        if self.glob.as_ref().is_some_and(|g| g.matches(rel)) {
            return true;
        }
        // Slashless patterns also match the basename, so `*.log` hits at
        // any depth.
        !self.raw.contains('/') && self.glob.as_ref().is_some_and(|g| g.matches(name))
    }
}

/// An ordered set of ignore rules read from a `.gitignore`-like file.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRules {
    /// Read rules from a file. A missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(IgnoreRules::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ignore file {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(IgnorePattern::parse)
            .collect();
        IgnoreRules { patterns }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check a path relative to the base directory (forward-slash form,
    /// regardless of host OS) against every rule. Used for files and
    /// directories alike; a matching directory stops descent.
    pub fn matches(&self, rel: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let rel_slash = format!("{rel}/");
        let name = rel.rsplit('/').next().unwrap_or(rel);

        self.patterns
            .iter()
            .any(|p| p.matches(rel, &rel_slash, name))
    }
}

/// The base-relative form of a path with forward-slash separators.
/// Falls back to the full path string when the path is not under the base.
pub fn relative_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().into_owned(),
    }
}
