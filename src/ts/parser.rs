use crate::ts::errors::TreeSitterError;
use tree_sitter::{Parser, Tree};

/// Tree-sitter parser wrapper for PHP source code.
///
/// Parsing is a pure function of the text given: arbitrary and malformed
/// input still yields a best-effort tree. The parser is stateful at the
/// tree-sitter level, so callers construct one explicitly and decide its
/// lifetime and thread placement; there is no shared default instance.
pub struct PhpParser {
    parser: Parser,
}

impl PhpParser {
    /// Create a parser for the full PHP grammar (including inline HTML).
    pub fn new() -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a str,
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }
}

/// A parsed source file with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a str,
    pub tree: Tree,
}

impl ParsedSource<'_> {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &str {
        &self.source[node.byte_range()]
    }
}
