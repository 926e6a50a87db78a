use crate::document::ByteRange;
use crate::ts::parser::ParsedSource;
use tree_sitter::Node;

/// Node kinds that introduce a named type. The reconciler treats all four
/// flavors identically.
const TYPE_DECLARATION_KINDS: [&str; 4] = [
    "class_declaration",
    "interface_declaration",
    "trait_declaration",
    "enum_declaration",
];

/// An identifier token with its byte range and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub range: ByteRange,
    pub text: String,
}

/// A `namespace Foo;` clause. The name is absent for a bare `namespace;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceClause {
    /// Byte range of the whole clause, terminator included.
    pub range: ByteRange,
    pub name: Option<Identifier>,
}

/// Flavor tag for a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl TypeKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "trait_declaration" => Some(TypeKind::Trait),
            "enum_declaration" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

/// A class-like declaration with a uniform identifier accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    /// Byte range of the whole declaration, body included.
    pub range: ByteRange,
    /// The declaration's name token.
    pub name: Identifier,
}

/// Find the first descendant of `root` whose kind is in `kinds`, in
/// document order.
pub fn first_descendant<'t>(root: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        if kinds.contains(&node.kind()) {
            return Some(node);
        }

        if cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// Locate the first namespace clause, if any. Absence is a legitimate state
/// meaning the unit lives in the global namespace.
pub fn namespace_clause(parsed: &ParsedSource<'_>) -> Option<NamespaceClause> {
    let node = first_descendant(parsed.root_node(), &["namespace_definition"])?;
    let name = node.child_by_field_name("name").map(|n| Identifier {
        range: ByteRange::new(n.start_byte(), n.end_byte()),
        text: parsed.node_text(n).to_string(),
    });

    Some(NamespaceClause {
        range: ByteRange::new(node.start_byte(), node.end_byte()),
        name,
    })
}

/// Locate the first class-like declaration of any flavor, if any.
///
/// Declarations whose name token is missing (malformed source) are treated
/// as absent: there is no identifier to correct.
pub fn type_declaration(parsed: &ParsedSource<'_>) -> Option<TypeDeclaration> {
    let node = first_descendant(parsed.root_node(), &TYPE_DECLARATION_KINDS)?;
    let kind = TypeKind::from_node_kind(node.kind())?;
    let name_node = node.child_by_field_name("name")?;

    Some(TypeDeclaration {
        kind,
        range: ByteRange::new(node.start_byte(), node.end_byte()),
        name: Identifier {
            range: ByteRange::new(name_node.start_byte(), name_node.end_byte()),
            text: parsed.node_text(name_node).to_string(),
        },
    })
}

/// Byte offset at which PHP code mode begins, used as the insertion point
/// for a missing namespace clause.
///
/// Returns the end of the opening `<?php` tag when one exists; for a unit
/// that is pure markup, the end of the leading text span. `None` means the
/// unit has neither (empty or whitespace-only), and an inserted statement
/// must bring its own opening tag.
pub fn code_open_end(parsed: &ParsedSource<'_>) -> Option<usize> {
    if let Some(tag) = first_descendant(parsed.root_node(), &["php_tag"]) {
        return Some(tag.end_byte());
    }

    first_descendant(parsed.root_node(), &["text"]).map(|node| node.end_byte())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::parser::PhpParser;

    fn parse(source: &str) -> (PhpParser, String) {
        (PhpParser::new().unwrap(), source.to_string())
    }

    #[test]
    fn namespace_clause_with_name() {
        let (mut parser, source) = parse("<?php\nnamespace Acme\\Sub;\nclass A {}\n");
        let parsed = parser.parse_with_source(&source).unwrap();

        let clause = namespace_clause(&parsed).unwrap();
        let name = clause.name.unwrap();
        assert_eq!(name.text, "Acme\\Sub");
        assert_eq!(&source[clause.range.start..clause.range.end], "namespace Acme\\Sub;");
    }

    #[test]
    fn namespace_clause_absent() {
        let (mut parser, source) = parse("<?php\nclass A {}\n");
        let parsed = parser.parse_with_source(&source).unwrap();

        assert!(namespace_clause(&parsed).is_none());
    }

    #[test]
    fn first_type_declaration_wins() {
        let (mut parser, source) = parse("<?php\ninterface First {}\nclass Second {}\n");
        let parsed = parser.parse_with_source(&source).unwrap();

        let decl = type_declaration(&parsed).unwrap();
        assert_eq!(decl.kind, TypeKind::Interface);
        assert_eq!(decl.name.text, "First");
    }

    #[test]
    fn type_declaration_flavors() {
        for (source, kind, name) in [
            ("<?php\nclass C {}", TypeKind::Class, "C"),
            ("<?php\ninterface I {}", TypeKind::Interface, "I"),
            ("<?php\ntrait T {}", TypeKind::Trait, "T"),
            ("<?php\nenum E {}", TypeKind::Enum, "E"),
        ] {
            let mut parser = PhpParser::new().unwrap();
            let parsed = parser.parse_with_source(source).unwrap();
            let decl = type_declaration(&parsed).unwrap();
            assert_eq!(decl.kind, kind);
            assert_eq!(decl.name.text, name);
        }
    }

    #[test]
    fn name_range_covers_exactly_the_identifier() {
        let (mut parser, source) = parse("<?php\nclass Foo extends Bar {}\n");
        let parsed = parser.parse_with_source(&source).unwrap();

        let decl = type_declaration(&parsed).unwrap();
        assert_eq!(&source[decl.name.range.start..decl.name.range.end], "Foo");
    }

    #[test]
    fn code_open_end_after_php_tag() {
        let (mut parser, source) = parse("<?php\nclass A {}\n");
        let parsed = parser.parse_with_source(&source).unwrap();

        assert_eq!(code_open_end(&parsed), Some("<?php".len()));
    }

    #[test]
    fn code_open_end_after_leading_markup() {
        let source = "<html>\n<?php\nclass A {}\n";
        let mut parser = PhpParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();

        // The opening tag follows the markup; code mode begins after the tag.
        let end = code_open_end(&parsed).unwrap();
        assert_eq!(&source[..end], "<html>\n<?php");
    }

    #[test]
    fn code_open_end_pure_markup() {
        let source = "<html><body></body></html>";
        let mut parser = PhpParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();

        assert_eq!(code_open_end(&parsed), Some(source.len()));
    }

    #[test]
    fn code_open_end_empty_unit() {
        let (mut parser, source) = parse("");
        let parsed = parser.parse_with_source(&source).unwrap();

        assert_eq!(code_open_end(&parsed), None);
    }
}
