//! Git root discovery.

use std::path::{Component, Path, PathBuf};

/// VCS internal directories that should never be traversed.
pub const VCS_INTERNALS: &[&str] = &[
    ".git", ".jj", ".svn", ".hg", ".bzr", "_darcs", ".pijul", "CVS", ".fossil",
];

/// Find the repository root for a given path by walking up to find .git or .jj.
/// If the path is a file, the search starts from its containing directory.
/// Returns None when no ancestor carries a VCS marker.
pub fn find_git_root(path: &Path) -> Option<PathBuf> {
    let start = if path.is_file() { path.parent()? } else { path };

    for ancestor in start.ancestors() {
        if ancestor.join(".git").exists() || ancestor.join(".jj").exists() {
            return Some(ancestor.to_path_buf());
        }
    }

    None
}

/// Check whether any component of the path is a VCS internal directory.
pub fn is_vcs_internal(path: &Path) -> bool {
    path.components().any(|c| {
        if let Component::Normal(name) = c {
            VCS_INTERNALS.contains(&name.to_string_lossy().as_ref())
        } else {
            false
        }
    })
}
