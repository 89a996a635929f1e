//! code2llm - Code-to-Prompt Collector
//!
//! code2llm walks a set of input paths and concatenates the surviving files
//! into a single text artifact for a language model. File selection runs
//! through three layers: the git root's .gitignore (approximate semantics,
//! no negation), soft exclusion rules (file stays listed, content omitted),
//! and forced exclusion rules (file removed from the output entirely).
//!
//! ## Architecture
//!
//! - `vcs` finds the git root that anchors relative paths and ignore rules
//! - `patterns` parses and matches gitignore-style rules
//! - `exclude` compiles the user's six exclusion buckets (two strengths,
//!   three match kinds) and answers per-path queries
//! - `scanner` walks inputs, prunes, and produces the sorted candidate list
//! - `output` classifies candidates and renders the final artifact
//! - `language` maps file extensions to guidance text from languages.toml

pub mod exclude;
pub mod language;
pub mod output;
pub mod patterns;
pub mod scanner;
pub mod vcs;

// Re-export commonly used items
pub use exclude::{ExcludeRules, ExclusionEngine};
pub use language::{detect_languages, load_language_guidance, LanguageGuidance};
pub use output::{render, OutputOptions};
pub use patterns::{relative_path, IgnoreRules};
pub use scanner::{
    collect_files, is_probably_binary, resolve_base, CollectOptions, CollectedFile,
};
pub use vcs::{find_git_root, is_vcs_internal, VCS_INTERNALS};
