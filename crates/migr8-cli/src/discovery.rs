//! File discovery: globs over a directory walk that honours `.gitignore`.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use crate::error::{ConfigError, Result};

fn glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.kind().to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Files under `root` matching `include` and none of `exclude`
///
/// Patterns match paths relative to `root`. The result is absolute and
/// sorted.
pub fn discover_files(root: &Path, include: &[String], exclude: &[String]) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;
    let include = glob_set(include)?;
    let exclude = glob_set(exclude)?;

    let mut files = Vec::new();
    for entry in WalkBuilder::new(&root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let Ok(relative) = path.strip_prefix(&root) else {
            continue;
        };
        if include.is_match(relative) && !exclude.is_match(relative) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    tracing::debug!(count = files.len(), root = %root.display(), "discovered files");
    Ok(files)
}
