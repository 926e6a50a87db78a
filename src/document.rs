use std::fmt;
use std::path::{Path, PathBuf};

/// A half-open byte range `[start, end)` into a source unit's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An immutable unit of source text with an optional on-disk location.
///
/// The text is the sole source of truth for byte offsets computed against it;
/// the URI is advisory and may be absent, in which case no canonical class
/// name can be derived for the unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    text: String,
    uri: Option<Uri>,
    language: Language,
}

impl SourceUnit {
    /// Create a PHP source unit.
    pub fn php(text: impl Into<String>, uri: Option<Uri>) -> Self {
        Self {
            text: text.into(),
            uri,
            language: Language::Php,
        }
    }

    /// Create a PHP source unit located at a local file path.
    pub fn php_at(text: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::php(text, Some(Uri::file(path)))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.uri.as_ref()
    }

    pub fn language(&self) -> Language {
        self.language
    }
}

impl fmt::Display for SourceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Language tag carried by a source unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Php,
}

/// A scheme-qualified document location.
///
/// Only `file` URIs are addressable on the filesystem; other schemes
/// (editor buffers, untitled documents) carry a path-like identifier that
/// cannot be mapped to a class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    scheme: String,
    path: PathBuf,
}

impl Uri {
    pub const FILE_SCHEME: &'static str = "file";

    /// A `file` scheme URI for a local path.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: Self::FILE_SCHEME.to_string(),
            path: path.into(),
        }
    }

    /// A URI with an explicit non-file scheme (e.g. `untitled`).
    pub fn with_scheme(scheme: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_file(&self) -> bool {
        self.scheme == Self::FILE_SCHEME
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path.display())
    }
}
