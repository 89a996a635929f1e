//! Language guidance loading and detection from languages.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Guidance for one language, emitted when files of that language are
/// included in the output.
#[derive(Debug, Clone)]
pub struct LanguageGuidance {
    pub name: String,
    pub extensions: Vec<String>,
    pub guidance: String,
}

/// Structure to deserialize language entries from TOML
#[derive(Debug, Deserialize)]
struct LanguageTable {
    #[serde(flatten)]
    languages: HashMap<String, LanguageEntry>,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    name: String,
    extensions: Vec<String>,
    guidance: String,
}

// Embed the TOML file directly in the binary at compile time
const LANGUAGES_TOML: &str = include_str!("../languages.toml");

/// Load the language guidance table from the embedded TOML content.
pub fn load_language_guidance() -> Result<Vec<LanguageGuidance>> {
    let table: LanguageTable =
        toml::from_str(LANGUAGES_TOML).context("Failed to parse languages TOML file")?;

    let mut entries: Vec<LanguageGuidance> = table
        .languages
        .into_values()
        .map(|entry| LanguageGuidance {
            name: entry.name,
            extensions: entry.extensions,
            guidance: entry.guidance,
        })
        .collect();

    // The TOML map has no stable order; sort by name so output is
    // deterministic across runs.
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Pick the guidance entries whose extensions appear among the given paths,
/// preserving the table's sorted order.
pub fn detect_languages<'a, P: AsRef<Path>>(
    table: &'a [LanguageGuidance],
    paths: &[P],
) -> Vec<&'a LanguageGuidance> {
    table
        .iter()
        .filter(|lang| {
            paths.iter().any(|path| {
                path.as_ref()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| lang.extensions.iter().any(|e| e == ext))
            })
        })
        .collect()
}
