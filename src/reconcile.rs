use crate::document::{ByteRange, SourceUnit};
use crate::edit::{TextEdit, TextEdits};
use crate::resolver::{CandidateResolver, ClassName, ResolveError};
use crate::ts::locator;
use crate::ts::parser::{ParsedSource, PhpParser};
use thiserror::Error;

/// Opening tag prefixed to an inserted namespace statement when the unit has
/// no code-open marker of its own.
const PHP_OPEN_TAG: &str = "<?php";

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("source is not a file:// document, it is \"{scheme}\"")]
    NotFileScheme { scheme: String },

    #[error("source unit has no location associated with it")]
    MissingLocation,

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Diagnostic severity. Identity mismatches are always advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A non-mutating, range-anchored advisory describing a detected mismatch.
///
/// Diagnostics are declaration-scoped where edits are identifier-scoped: the
/// range covers the whole clause or declaration so an editor can underline
/// the relevant construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: ByteRange,
    pub message: String,
    pub severity: Severity,
}

/// Reconciles a source unit's declared identity with the canonical class
/// name derived from its path.
///
/// Produces at most two corrections per unit: one for the namespace clause,
/// one for the first class-like declaration's name. Holds no state beyond
/// its two injected collaborators; every call parses fresh.
pub struct Reconciler<R> {
    resolver: R,
    parser: PhpParser,
}

impl<R: CandidateResolver> Reconciler<R> {
    /// Build a reconciler from an explicitly constructed resolver and parser.
    pub fn new(resolver: R, parser: PhpParser) -> Self {
        Self { resolver, parser }
    }

    /// Compute the edits that make the unit's declarations match its
    /// canonical class name. An empty set means the unit already matches.
    ///
    /// Fails loudly when the unit cannot be reconciled at all: no location,
    /// a non-file scheme, or a path no resolver root covers. Mutation must
    /// never be silently skipped.
    pub fn reconcile(&mut self, unit: &SourceUnit) -> Result<TextEdits, ReconcileError> {
        let canonical = self.canonical_for(unit)?;

        let Ok(parsed) = self.parser.parse_with_source(unit.text()) else {
            return Ok(TextEdits::none());
        };

        let mut edits = Vec::new();
        if let Some(edit) = fix_namespace(&parsed, canonical.namespace()) {
            edits.push(edit);
        }
        if let Some(edit) = fix_type_name(&parsed, canonical.name()) {
            edits.push(edit);
        }

        Ok(TextEdits::from_edits(edits))
    }

    /// Project the same mismatch detection into read-only diagnostics.
    ///
    /// Best-effort: units with no usable location or no candidate produce an
    /// empty sequence instead of an error, so a diagnostic pass over many
    /// files never aborts on one ambiguous unit.
    pub fn inspect(&mut self, unit: &SourceUnit) -> Vec<Diagnostic> {
        let Ok(canonical) = self.canonical_for(unit) else {
            return Vec::new();
        };
        let Ok(parsed) = self.parser.parse_with_source(unit.text()) else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();

        if fix_namespace(&parsed, canonical.namespace()).is_some() {
            let range = locator::namespace_clause(&parsed)
                .map(|clause| clause.range)
                .unwrap_or(ByteRange::new(0, 0));
            diagnostics.push(Diagnostic {
                range,
                message: format!(
                    "Namespace should probably be \"{}\"",
                    canonical.namespace()
                ),
                severity: Severity::Warning,
            });
        }

        if fix_type_name(&parsed, canonical.name()).is_some() {
            let range = locator::type_declaration(&parsed)
                .map(|decl| decl.range)
                .unwrap_or(ByteRange::new(0, 0));
            diagnostics.push(Diagnostic {
                range,
                message: format!("Class name should probably be \"{}\"", canonical.name()),
                severity: Severity::Warning,
            });
        }

        diagnostics
    }

    fn canonical_for(&self, unit: &SourceUnit) -> Result<ClassName, ReconcileError> {
        let uri = unit.uri().ok_or(ReconcileError::MissingLocation)?;
        if !uri.is_file() {
            return Err(ReconcileError::NotFileScheme {
                scheme: uri.scheme().to_string(),
            });
        }

        Ok(self.resolver.best_candidate(uri.path())?)
    }
}

/// Correction for the namespace clause, if one is needed.
///
/// Missing clause + non-empty canonical namespace is an insertion at the
/// point code mode begins; a unit with no code-open marker gets one prefixed.
/// A clause whose name differs byte-for-byte is replaced whole.
fn fix_namespace(parsed: &ParsedSource<'_>, correct: &str) -> Option<TextEdit> {
    let clause = locator::namespace_clause(parsed);
    let statement = format!("namespace {correct};");

    let Some(clause) = clause else {
        if correct.is_empty() {
            return None;
        }

        let open_end = locator::code_open_end(parsed).unwrap_or(0);
        let mut inserted = format!("\n{statement}\n");
        if open_end == 0 {
            inserted = format!("{PHP_OPEN_TAG}\n{inserted}");
        }

        return Some(TextEdit::create(open_end, 0, inserted));
    };

    if let Some(name) = &clause.name {
        if name.text == correct {
            return None;
        }
    }

    Some(TextEdit::create(
        clause.range.start,
        clause.range.len(),
        statement,
    ))
}

/// Correction for the first class-like declaration's name, if one is needed.
/// Replaces exactly the identifier token; keyword and body stay untouched.
fn fix_type_name(parsed: &ParsedSource<'_>, correct: &str) -> Option<TextEdit> {
    let decl = locator::type_declaration(parsed)?;

    if decl.name.text == correct {
        return None;
    }

    Some(TextEdit::create(
        decl.name.range.start,
        decl.name.range.len(),
        correct,
    ))
}
