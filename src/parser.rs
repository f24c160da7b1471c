//! Tree-sitter binding: turns Swift source into a `SourceUnit` declaration tree.
//!
//! Only type-like declarations survive the walk. Each keeps its name, the raw
//! text of every inheritance-clause entry, and the type declarations nested in
//! its body. Nothing is resolved: this is pure syntax-level extraction.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;
use crate::types::{Declaration, DeclarationKind, SourceUnit};

/// Maximum source file size (16 MiB).
const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Collect every type-like declaration directly inside `container`, in document order.
fn collect_type_declarations(container: Node<'_>, source: &str) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut cursor = container.walk();

    for child in container.children(&mut cursor) {
        if let Some(decl) = type_declaration(child, source) {
            declarations.push(decl);
        }
    }

    return declarations;
}

/// Determine the declaration kind of a CST node, if it is type-like.
///
/// `class_declaration` covers struct, class, enum, actor and extension; the
/// keyword sits in the `declaration_kind` field.
fn declaration_kind(node: Node<'_>) -> Option<DeclarationKind> {
    return match node.kind() {
        "protocol_declaration" => Some(DeclarationKind::Protocol),
        "class_declaration" => {
            if let Some(keyword) = node.child_by_field_name("declaration_kind") {
                return DeclarationKind::from_keyword(keyword.kind());
            }
            let mut cursor = node.walk();
            return node
                .children(&mut cursor)
                .filter(|c| return !c.is_named())
                .find_map(|c| return DeclarationKind::from_keyword(c.kind()));
        },
        _ => None,
    };
}

/// Raw text of each `inheritance_specifier` written on the declaration itself.
fn inheritance_clause(node: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    return node
        .children(&mut cursor)
        .filter(|c| return c.kind() == "inheritance_specifier")
        .filter_map(|c| return c.utf8_text(source.as_bytes()).ok())
        .map(|text| return text.trim().to_string())
        .filter(|text| return !text.is_empty())
        .collect();
}

/// Parse one source file into its declaration tree.
///
/// Syntax errors are not fatal: tree-sitter recovers, and the recovered tree is
/// walked after a warning.
///
/// # Errors
///
/// Returns `Error::FileTooLarge` if the source exceeds the size limit,
/// or `Error::ParseFailed` if tree-sitter cannot parse the source.
pub fn parse_unit(file_path: &Path, source: &str, language: &Language) -> Result<SourceUnit, Error> {
    let source_len: u64 = source.len().try_into().unwrap_or(u64::MAX);
    if source_len > MAX_FILE_SIZE {
        return Err(Error::FileTooLarge {
            file: file_path.to_path_buf(),
            size_bytes: source_len,
            max_bytes: MAX_FILE_SIZE,
        });
    }

    let tree = parse_source(file_path, source, language)?;
    let root = tree.root_node();
    if root.has_error() {
        tracing::warn!(file = %file_path.display(), "syntax errors, scanning the recovered tree");
    }

    let declarations = collect_type_declarations(root, source);
    tracing::debug!(
        file = %file_path.display(),
        count = declarations.len(),
        "collected top-level declarations"
    );

    return Ok(SourceUnit {
        declarations,
        path: file_path.to_path_buf(),
    });
}

/// Parse source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str, language: &Language) -> Result<Tree, Error> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;

    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// Build a `Declaration` from a type-like CST node, recursing into its body.
fn type_declaration(node: Node<'_>, source: &str) -> Option<Declaration> {
    let kind = declaration_kind(node)?;
    let name_node = node.child_by_field_name("name")?;
    let name = name_node.utf8_text(source.as_bytes()).ok()?.trim().to_string();

    let members = node
        .child_by_field_name("body")
        .map(|body| return collect_type_declarations(body, source))
        .unwrap_or_default();

    return Some(Declaration {
        conformances: inheritance_clause(node, source),
        kind,
        members,
        name,
    });
}
