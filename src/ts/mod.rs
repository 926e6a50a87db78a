//! Tree-sitter surface for PHP source inspection.
//!
//! The parser is a narrow, replaceable collaborator: it turns raw text into
//! a byte-range-addressable tree, and the locator answers the two structural
//! questions the reconciler asks (namespace clause, first class-like
//! declaration). Nothing here mutates text.

pub mod errors;
pub mod locator;
pub mod parser;

pub use errors::TreeSitterError;
pub use locator::{Identifier, NamespaceClause, TypeDeclaration, TypeKind};
pub use parser::{ParsedSource, PhpParser};
