use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum FreshnessError {
    #[error("failed to read freshness index {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("freshness index {} is corrupt: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write freshness index {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct Entry {
    mtime: i64,
    hash: u64,
}

/// Incremental-freshness index: records the mtime and content hash each file
/// had when it was last seen, so whole-tree scans revisit only what changed.
///
/// The mtime comparison is the fast path; when it misses (touch without
/// modification, clock skew) the content hash decides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreshnessIndex {
    entries: BTreeMap<PathBuf, Entry>,
}

impl FreshnessIndex {
    /// Load the index from disk. A missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self, FreshnessError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(FreshnessError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        serde_json::from_str(&content).map_err(|err| FreshnessError::Corrupt {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Persist the index.
    pub fn save(&self, path: &Path) -> Result<(), FreshnessError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| FreshnessError::Corrupt {
            path: path.to_path_buf(),
            source: err,
        })?;

        fs::write(path, json).map_err(|err| FreshnessError::Write {
            path: path.to_path_buf(),
            source: err,
        })
    }

    /// Whether `path` is unchanged since it was last recorded. Unknown files
    /// and files that cannot be read are stale.
    pub fn is_fresh(&self, path: &Path) -> bool {
        let Some(entry) = self.entries.get(path) else {
            return false;
        };

        if let Some(mtime) = mtime_of(path) {
            if mtime == entry.mtime {
                return true;
            }
        }

        match fs::read(path) {
            Ok(content) => xxh3_64(&content) == entry.hash,
            Err(_) => false,
        }
    }

    /// Record the current mtime and content hash of `path`.
    pub fn record(&mut self, path: &Path) -> Result<(), FreshnessError> {
        let content = fs::read(path)?;
        let mtime = mtime_of(path).unwrap_or(0);

        self.entries.insert(
            path.to_path_buf(),
            Entry {
                mtime,
                hash: xxh3_64(&content),
            },
        );

        Ok(())
    }

    /// Drop a file from the index, forcing its next scan.
    pub fn forget(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn mtime_of(path: &Path) -> Option<i64> {
    let metadata = fs::metadata(path).ok()?;
    Some(filetime::FileTime::from_last_modification_time(&metadata).unix_seconds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_file_is_stale() {
        let index = FreshnessIndex::default();
        assert!(!index.is_fresh(Path::new("/nowhere/x.php")));
    }

    #[test]
    fn recorded_file_is_fresh_until_changed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.php");
        fs::write(&file, "<?php\nclass A {}\n").unwrap();

        let mut index = FreshnessIndex::default();
        index.record(&file).unwrap();
        assert!(index.is_fresh(&file));

        fs::write(&file, "<?php\nclass B {}\n").unwrap();
        // Bump mtime past the recorded second so the fast path misses too.
        filetime::set_file_mtime(&file, filetime::FileTime::from_unix_time(4_102_444_800, 0))
            .unwrap();
        assert!(!index.is_fresh(&file));
    }

    #[test]
    fn touch_without_modification_stays_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.php");
        fs::write(&file, "<?php\n").unwrap();

        let mut index = FreshnessIndex::default();
        index.record(&file).unwrap();

        // Same content, different mtime: the hash path keeps it fresh.
        filetime::set_file_mtime(&file, filetime::FileTime::from_unix_time(4_102_444_800, 0))
            .unwrap();
        assert!(index.is_fresh(&file));
    }

    #[test]
    fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.php");
        let index_path = dir.path().join("index.json");
        fs::write(&file, "<?php\n").unwrap();

        let mut index = FreshnessIndex::default();
        index.record(&file).unwrap();
        index.save(&index_path).unwrap();

        let loaded = FreshnessIndex::load(&index_path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.is_fresh(&file));
    }

    #[test]
    fn missing_index_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = FreshnessIndex::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("index.json");
        fs::write(&index_path, "not json").unwrap();

        let err = FreshnessIndex::load(&index_path).unwrap_err();
        assert!(matches!(err, FreshnessError::Corrupt { .. }));
    }

    #[test]
    fn forget_forces_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.php");
        fs::write(&file, "<?php\n").unwrap();

        let mut index = FreshnessIndex::default();
        index.record(&file).unwrap();
        index.forget(&file);
        assert!(!index.is_fresh(&file));
    }
}
