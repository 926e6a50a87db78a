use crate::resolver::{Psr4Mapping, Psr4Resolver};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const MANIFEST_NAME: &str = "composer.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} declares no PSR-4 autoload roots", path.display())]
    NoAutoloadRoots { path: PathBuf },
}

/// The slice of `composer.json` this tool consumes: PSR-4 autoload rules,
/// regular and dev.
#[derive(Debug, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    autoload: AutoloadSection,
    #[serde(rename = "autoload-dev", default)]
    autoload_dev: AutoloadSection,
}

#[derive(Debug, Default, Deserialize)]
struct AutoloadSection {
    #[serde(rename = "psr-4", default)]
    psr4: BTreeMap<String, Psr4Dirs>,
}

/// Composer allows a prefix to map to one directory or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Psr4Dirs {
    One(String),
    Many(Vec<String>),
}

impl Psr4Dirs {
    fn dirs(&self) -> Vec<&str> {
        match self {
            Psr4Dirs::One(dir) => vec![dir.as_str()],
            Psr4Dirs::Many(dirs) => dirs.iter().map(String::as_str).collect(),
        }
    }
}

/// Load the PSR-4 resolver for a workspace from its `composer.json`.
pub fn load_resolver(workspace_root: &Path) -> Result<Psr4Resolver, ConfigError> {
    let manifest_path = workspace_root.join(MANIFEST_NAME);
    let content = fs::read_to_string(&manifest_path).map_err(|err| ConfigError::Io {
        path: manifest_path.clone(),
        source: err,
    })?;

    let manifest: ComposerManifest =
        serde_json::from_str(&content).map_err(|err| ConfigError::Json {
            path: manifest_path.clone(),
            source: err,
        })?;

    let mut mappings = Vec::new();
    for section in [&manifest.autoload, &manifest.autoload_dev] {
        for (prefix, dirs) in &section.psr4 {
            for dir in dirs.dirs() {
                mappings.push(Psr4Mapping::new(prefix.clone(), dir.trim_end_matches('/')));
            }
        }
    }

    if mappings.is_empty() {
        return Err(ConfigError::NoAutoloadRoots {
            path: manifest_path,
        });
    }

    Ok(Psr4Resolver::new(workspace_root, mappings))
}

/// Walk up from `start` looking for a directory containing `composer.json`.
pub fn find_workspace_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|ancestor| ancestor.join(MANIFEST_NAME).exists())
        .map(Path::to_path_buf)
}
