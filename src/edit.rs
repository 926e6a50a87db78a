use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// The fundamental correction primitive: remove `length` bytes at `offset`,
/// insert `new_text` there.
///
/// All reconciliation output compiles down to this single primitive.
/// Intelligence lives in offset acquisition (via tree-sitter), not in the
/// application logic. Offsets always refer to the text the edit was computed
/// from; edits are not rebased.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until applied"]
pub struct TextEdit {
    /// Starting byte offset into the original text
    pub offset: usize,
    /// Number of bytes replaced (0 for a pure insertion)
    pub length: usize,
    /// Replacement text
    pub new_text: String,
}

impl TextEdit {
    /// Create an edit. Callers are trusted to derive offset and length from
    /// the same text the edit will be applied to.
    pub fn create(offset: usize, length: usize, new_text: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            new_text: new_text.into(),
        }
    }

    /// Byte offset one past the replaced region.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("invalid byte range [{offset}, {end}) in text of length {text_len}")]
    OutOfRange {
        offset: usize,
        end: usize,
        text_len: usize,
    },

    #[error("edit at byte {offset} overlaps a preceding edit ending at byte {prior_end}")]
    Overlap { offset: usize, prior_end: usize },

    #[error("edit range [{offset}, {end}) splits a UTF-8 code point")]
    NotCharBoundary { offset: usize, end: usize },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An ordered sequence of non-overlapping edits against one text.
///
/// Order is discovery order, not offset order; application sorts internally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use = "TextEdits do nothing until applied"]
pub struct TextEdits {
    edits: Vec<TextEdit>,
}

impl TextEdits {
    /// An empty, no-op edit set.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build a set from edits in discovery order.
    pub fn from_edits(edits: Vec<TextEdit>) -> Self {
        Self { edits }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextEdit> {
        self.edits.iter()
    }

    /// Apply the set to `text`, producing the corrected string.
    ///
    /// Edits are validated against the original text and spliced by
    /// descending offset so earlier splices never invalidate later offsets.
    /// The engine produces disjoint edits by construction; overlap is
    /// rejected anyway.
    pub fn apply(&self, text: &str) -> Result<String, EditError> {
        let mut sorted: Vec<&TextEdit> = self.edits.iter().collect();
        sorted.sort_by_key(|e| e.offset);

        for edit in &sorted {
            if edit.end() > text.len() {
                return Err(EditError::OutOfRange {
                    offset: edit.offset,
                    end: edit.end(),
                    text_len: text.len(),
                });
            }
            if !text.is_char_boundary(edit.offset) || !text.is_char_boundary(edit.end()) {
                return Err(EditError::NotCharBoundary {
                    offset: edit.offset,
                    end: edit.end(),
                });
            }
        }

        for window in sorted.windows(2) {
            let (earlier, later) = (window[0], window[1]);
            if earlier.end() > later.offset {
                return Err(EditError::Overlap {
                    offset: later.offset,
                    prior_end: earlier.end(),
                });
            }
        }

        let mut result = text.to_string();
        for edit in sorted.iter().rev() {
            result.replace_range(edit.offset..edit.end(), &edit.new_text);
        }

        Ok(result)
    }

    /// Apply the set to a file on disk.
    ///
    /// Reads the file, applies in memory, then writes atomically (tempfile +
    /// fsync + rename) and bumps the mtime so downstream freshness checks see
    /// the change. A no-op set leaves the file untouched.
    pub fn apply_to_file(&self, path: &Path) -> Result<(), EditError> {
        if self.is_empty() {
            return Ok(());
        }

        let original = fs::read_to_string(path)?;
        let corrected = self.apply(&original)?;
        atomic_write(path, corrected.as_bytes())?;

        let now = filetime::FileTime::now();
        filetime::set_file_mtime(path, now)?;

        Ok(())
    }
}

impl IntoIterator for TextEdits {
    type Item = TextEdit;
    type IntoIter = std::vec::IntoIter<TextEdit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.into_iter()
    }
}

/// Atomic file write: tempfile in the same directory + fsync + rename, so
/// either the full write lands or nothing changes.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
