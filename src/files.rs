use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("invalid glob pattern \"{pattern}\": {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Enumerates the PHP files a scan should visit.
///
/// Produces deduplicated, sorted entries; honors include/exclude glob sets
/// matched against workspace-relative paths; takes a fast path when the
/// requested target already names a concrete file. The freshness predicate
/// is applied only to whole-tree scans; naming a file or subdirectory
/// explicitly always revisits it.
#[derive(Debug)]
pub struct FileLister {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl FileLister {
    pub fn new(include: &[String], exclude: &[String]) -> Result<Self, ListError> {
        Ok(Self {
            include: build_glob_set(include)?,
            exclude: build_glob_set(exclude)?,
        })
    }

    /// List files under `root`, narrowed to `sub_path` when given.
    ///
    /// `is_fresh` is the externally supplied freshness test; files it
    /// reports fresh are skipped during whole-tree scans.
    pub fn provide<F>(
        &self,
        root: &Path,
        sub_path: Option<&Path>,
        is_fresh: F,
    ) -> Result<Vec<PathBuf>, ListError>
    where
        F: Fn(&Path) -> bool,
    {
        if let Some(sub) = sub_path {
            let target = if sub.is_absolute() {
                sub.to_path_buf()
            } else {
                root.join(sub)
            };
            if target.is_file() {
                return Ok(vec![target]);
            }
        }

        let walk_root = match sub_path {
            Some(sub) if sub.is_absolute() => sub.to_path_buf(),
            Some(sub) => root.join(sub),
            None => root.to_path_buf(),
        };

        let mut files = BTreeSet::new();
        for entry in WalkDir::new(&walk_root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("php") {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if let Some(include) = &self.include {
                if !include.is_match(relative) {
                    continue;
                }
            }
            if let Some(exclude) = &self.exclude {
                if exclude.is_match(relative) {
                    continue;
                }
            }

            if sub_path.is_none() && is_fresh(path) {
                continue;
            }

            files.insert(path.to_path_buf());
        }

        Ok(files.into_iter().collect())
    }
}

fn build_glob_set(patterns: &[String]) -> Result<Option<GlobSet>, ListError> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|err| ListError::Pattern {
            pattern: pattern.clone(),
            source: err,
        })?;
        builder.add(glob);
    }

    let set = builder.build().map_err(|err| ListError::Pattern {
        pattern: patterns.join(", "),
        source: err,
    })?;

    Ok(Some(set))
}
