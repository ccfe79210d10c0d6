use crate::paths;
use anyhow::{Result, bail};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Directory searched for a session root; the working directory when unset.
pub fn search_root(root_path: &str) -> PathBuf {
    if root_path.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(root_path)
    }
}

/// `path` relative to `root`, with `/` separators.
pub fn relative_display(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    paths::normalize_separators(&relative.to_string_lossy())
}

/// List files under `root` whose extension is in `exts` (".pdf" style, case
/// insensitive) and whose file name contains `query` (case insensitive).
/// Without `recursive` only direct children are considered.
/// An empty `exts` or `query` does not filter.
pub fn search_files(
    root: &Path,
    recursive: bool,
    exts: &[String],
    query: &str,
    include_ignored: bool,
) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("{} is not a directory", root.display());
    }
    let mut walker = WalkBuilder::new(root);
    if !recursive {
        walker.max_depth(Some(1));
    }
    if include_ignored {
        walker.git_ignore(false).ignore(false);
    }

    let wanted: Vec<String> = exts
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();
    let needle = query.trim().to_lowercase();

    let mut found = Vec::new();
    for result in walker.build() {
        let dirent = match result {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "skipping entry during search");
                continue;
            }
        };
        if !dirent.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = dirent.into_path();
        let keep = wanted.is_empty()
            || path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| wanted.contains(&ext));
        let named = needle.is_empty()
            || path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().to_lowercase().contains(&needle));
        if keep && named {
            found.push(path);
        }
    }

    found.sort();
    Ok(found)
}
