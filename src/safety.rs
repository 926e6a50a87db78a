use std::path::{Path, PathBuf};
use thiserror::Error;

/// Workspace safety checks to prevent editing files outside the target
/// workspace or inside managed directories.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Absolute path to workspace root
    workspace_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside workspace: {} (workspace: {})", path.display(), workspace.display())]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is in a managed directory: {} (managed: {})", path.display(), forbidden.display())]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Create a new workspace guard with the given root.
    ///
    /// The workspace root is canonicalized to handle symlinks correctly.
    /// Composer-managed code is never edited: `vendor/` inside the
    /// workspace, the global composer home, and `.git/` are forbidden.
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;

        let mut forbidden_paths = Vec::new();

        if let Ok(vendor) = workspace_root.join("vendor").canonicalize() {
            forbidden_paths.push(vendor);
        }
        if let Ok(git_dir) = workspace_root.join(".git").canonicalize() {
            forbidden_paths.push(git_dir);
        }

        if let Some(home) = home::home_dir() {
            for composer_home in [home.join(".composer"), home.join(".config/composer")] {
                if let Ok(canonical) = composer_home.canonicalize() {
                    forbidden_paths.push(canonical);
                }
            }
        }

        Ok(Self {
            workspace_root,
            forbidden_paths,
        })
    }

    /// Check if a path is safe to edit.
    ///
    /// Returns the canonicalized absolute path if safe. Relative paths
    /// resolve against the workspace root.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        let canonical = absolute.canonicalize()?;
        self.check_canonical(&canonical)?;

        Ok(canonical)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        if !canonical.starts_with(&self.workspace_root) {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical.to_path_buf(),
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(())
    }

    /// Get the workspace root.
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }
}
