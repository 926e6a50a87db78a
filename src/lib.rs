//! Classfix: namespace and class-name reconciliation for PHP sources
//!
//! Given a PHP file and the canonical fully-qualified class name its path
//! implies (via PSR-4 autoload rules), classfix decides whether the file's
//! `namespace` clause and first class-like declaration match, and produces
//! either byte-precise corrections or read-only diagnostics.
//!
//! # Architecture
//!
//! All corrections compile down to a single primitive: [`TextEdit`], a
//! verified byte-span replacement against the original text. Intelligence
//! lives in offset acquisition (via tree-sitter), not in the application
//! logic. A reconciliation call touches at most two spans (the namespace
//! clause and the declaration's name token), which are disjoint by
//! construction.
//!
//! # Safety
//!
//! - Edits validate ranges and reject overlap before splicing
//! - Atomic file writes (tempfile + fsync + rename)
//! - Workspace boundary enforcement; `vendor/` is never edited
//! - Diagnostics never mutate and never fail
//!
//! # Example
//!
//! ```no_run
//! use classfix::{PhpParser, Psr4Mapping, Psr4Resolver, Reconciler, SourceUnit};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = Psr4Resolver::new("/project", vec![Psr4Mapping::new("Acme\\", "src")]);
//! let mut reconciler = Reconciler::new(resolver, PhpParser::new()?);
//!
//! let unit = SourceUnit::php_at("<?php\nclass Foo {}\n", "/project/src/Bar.php");
//! let edits = reconciler.reconcile(&unit)?;
//! let corrected = edits.apply(unit.text())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod edit;
pub mod files;
pub mod freshness;
pub mod reconcile;
pub mod resolver;
pub mod safety;
pub mod ts;

// Re-exports
pub use config::{find_workspace_root, load_resolver, ConfigError};
pub use document::{ByteRange, Language, SourceUnit, Uri};
pub use edit::{EditError, TextEdit, TextEdits};
pub use files::{FileLister, ListError};
pub use freshness::{FreshnessError, FreshnessIndex};
pub use reconcile::{Diagnostic, ReconcileError, Reconciler, Severity};
pub use resolver::{
    CandidateResolver, ClassName, Psr4Mapping, Psr4Resolver, ResolveError,
};
pub use safety::{SafetyError, WorkspaceGuard};
pub use ts::{PhpParser, TreeSitterError};
