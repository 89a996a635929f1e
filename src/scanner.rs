//! File collection across input paths.
//!
//! Each input resolves to a base directory (its git root when one exists),
//! then a recursive walk prunes ignored and excluded directories and gathers
//! candidate files. Soft and forced exclusion of individual files is decided
//! later, at classification time; pruning here only keeps the walk out of
//! directories whose contents must never surface.

use crate::exclude::ExclusionEngine;
use crate::patterns::{relative_path, IgnoreRules};
use crate::vcs::{find_git_root, VCS_INTERNALS};

use anyhow::Result;
use ignore::WalkBuilder;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Options controlling collection behavior (runtime flags)
#[derive(Clone, Copy, Default)]
pub struct CollectOptions {
    pub verbose: bool,
}

/// A candidate file found during collection, paired with the base directory
/// its display path is computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedFile {
    pub path: PathBuf,
    pub base: PathBuf,
}

/// Bytes sniffed from the head of a file when deciding text vs. binary.
const BINARY_SNIFF_LEN: u64 = 8192;

/// The base directory an input anchors to: the enclosing git root when one
/// exists, otherwise the parent of a file input or the directory itself.
pub fn resolve_base(input: &Path) -> PathBuf {
    if let Some(root) = find_git_root(input) {
        return root;
    }
    if input.is_file() {
        input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.to_path_buf())
    } else {
        input.to_path_buf()
    }
}

/// Collect candidate files from every input path, deduplicated by absolute
/// path and sorted ascending. Inputs are expected to exist; resolution
/// failures at this level were already rejected by the caller.
pub fn collect_files(
    inputs: &[PathBuf],
    engine: &ExclusionEngine,
    options: CollectOptions,
) -> Result<Vec<CollectedFile>> {
    let mut files = Vec::new();

    for input in inputs {
        collect_input(input, engine, options, &mut files)?;
    }

    files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
    files.dedup_by(|a, b| a.path == b.path);
    Ok(files)
}

fn collect_input(
    input: &Path,
    engine: &ExclusionEngine,
    options: CollectOptions,
    files: &mut Vec<CollectedFile>,
) -> Result<()> {
    let input = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());

    let git_root = find_git_root(&input);
    let base = resolve_base(&input);

    // Ignore rules come from the git root's .gitignore only; without a git
    // root no ignore rules apply. Nested .gitignore files are not consulted.
    let rules = match &git_root {
        Some(root) => IgnoreRules::load(&root.join(".gitignore"))?,
        None => IgnoreRules::default(),
    };

    if options.verbose {
        eprintln!(
            "DEBUG: Collecting {} (base {}, {} ignore rules)",
            input.display(),
            base.display(),
            if rules.is_empty() { "no" } else { "with" }
        );
    }

    if input.is_file() {
        let rel = relative_path(&input, &base);
        if !rules.matches(&rel) {
            files.push(CollectedFile { path: input, base });
        }
        return Ok(());
    }

    let rules_filter = rules.clone();
    let engine_filter = engine.clone();
    let base_filter = base.clone();

    let walker = WalkBuilder::new(&input)
        .hidden(false)
        // This tool's own rules are the source of truth; the walker's
        // built-in gitignore handling has different semantics.
        .git_ignore(false)
        .ignore(false)
        .git_global(false)
        .git_exclude(false)
        .filter_entry(move |entry| {
            let path = entry.path();

            // Never traverse VCS internals
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if VCS_INTERNALS.contains(&name) {
                    return false;
                }
            }

            // Prune directories; the walk root itself is always entered.
            // Soft exclusion prunes here too: a soft-excluded directory's
            // contents never become candidates.
            if entry.depth() > 0 && entry.file_type().is_some_and(|ft| ft.is_dir()) {
                let rel = relative_path(path, &base_filter);
                if rules_filter.matches(&rel) {
                    return false;
                }
                if engine_filter.is_forced_excluded(path)
                    || engine_filter.is_excluded(path, &base_filter)
                {
                    return false;
                }
            }

            true
        })
        .build();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                eprintln!("Warning: Failed to access entry: {err}");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        let rel = relative_path(path, &base);
        if rules.matches(&rel) {
            if options.verbose {
                eprintln!("DEBUG: Ignore rule skips {rel}");
            }
            continue;
        }

        // Soft/forced status of files is evaluated during classification,
        // so soft-excluded files can still be listed in the structure.
        files.push(CollectedFile {
            path: path.to_path_buf(),
            base: base.clone(),
        });
    }

    Ok(())
}

/// Sniff the head of a file for NUL bytes. Sniff errors count as text; the
/// later content read reports the error inline instead.
pub fn is_probably_binary(path: &Path) -> bool {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let mut head = Vec::new();
    match file.take(BINARY_SNIFF_LEN).read_to_end(&mut head) {
        Ok(_) => head.contains(&0),
        Err(_) => false,
    }
}
