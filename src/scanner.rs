//! Conformance scanning over parsed declaration trees.
//!
//! A declaration matches when one entry of its own inheritance clause equals the
//! target protocol name exactly. Module-qualified names, typealiases and
//! conformances added elsewhere are out of reach by construction.

use std::collections::HashSet;
use std::path::Path;

use crate::types::{ConformanceMatch, Declaration, DeclarationKind, SourceUnit};

/// How far below the top level the scanner looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nesting {
    /// Descend into bodies of non-matching types, extensions and actors.
    Nested,
    /// Only declarations at file scope.
    #[default]
    TopLevel,
}

/// What to scan for.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Whether nested declarations are inspected.
    pub nesting: Nesting,
    /// Protocol name a declaration must list to match.
    pub protocol: String,
}

/// Accumulates matches across files with first-wins deduplication.
struct Collector<'a> {
    /// Matches in discovery order.
    matches: Vec<ConformanceMatch>,
    /// Scan settings.
    options: &'a ScanOptions,
    /// Type names already recorded.
    seen: HashSet<String>,
}

impl Collector<'_> {
    /// Record a match unless the type name was already seen.
    fn record(&mut self, type_name: &str, file: &Path) {
        if !self.seen.insert(type_name.to_string()) {
            tracing::debug!(type_name, file = %file.display(), "duplicate conformance ignored");
            return;
        }
        tracing::debug!(type_name, file = %file.display(), "conformance found");
        self.matches.push(ConformanceMatch {
            file: file.to_path_buf(),
            type_name: type_name.to_string(),
        });
    }

    /// Pre-order visit of one declaration.
    fn visit(&mut self, decl: &Declaration, file: &Path) {
        if decl.kind == DeclarationKind::Protocol {
            return;
        }

        if decl.kind.is_nominal_type()
            && !decl.name.is_empty()
            && decl.declares_conformance_to(&self.options.protocol)
        {
            self.record(&decl.name, file);
            return;
        }

        if self.options.nesting == Nesting::Nested {
            for member in &decl.members {
                self.visit(member, file);
            }
        }
    }
}

/// Find every declaration listing `options.protocol` in its own inheritance clause.
///
/// Units are visited in the order given, declarations in document pre-order.
/// A type name seen twice keeps its first occurrence.
pub fn scan(units: &[SourceUnit], options: &ScanOptions) -> Vec<ConformanceMatch> {
    let mut collector = Collector {
        matches: Vec::new(),
        options,
        seen: HashSet::new(),
    };

    for unit in units {
        for decl in &unit.declarations {
            collector.visit(decl, &unit.path);
        }
    }

    return collector.matches;
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const TARGET: &str = "DebuggableTestGroup";

    fn unit(path: &str, declarations: Vec<Declaration>) -> SourceUnit {
        return SourceUnit {
            declarations,
            path: PathBuf::from(path),
        };
    }

    fn names(matches: &[ConformanceMatch]) -> Vec<&str> {
        return matches.iter().map(|m| m.type_name.as_str()).collect();
    }

    fn top_level() -> ScanOptions {
        return ScanOptions {
            nesting: Nesting::TopLevel,
            protocol: TARGET.to_string(),
        };
    }

    fn nested() -> ScanOptions {
        return ScanOptions {
            nesting: Nesting::Nested,
            protocol: TARGET.to_string(),
        };
    }

    #[test]
    fn matches_struct_class_and_enum_in_order() {
        let units = vec![
            unit("Login.swift", vec![Declaration::new(DeclarationKind::Struct, "Login", &[TARGET])]),
            unit(
                "Signup.swift",
                vec![
                    Declaration::new(DeclarationKind::Class, "Signup", &[TARGET]),
                    Declaration::new(DeclarationKind::Enum, "Other", &["SomethingElse"]),
                    Declaration::new(DeclarationKind::Enum, "Screen", &["String", TARGET]),
                ],
            ),
        ];

        assert_eq!(names(&scan(&units, &top_level())), vec!["Login", "Signup", "Screen"]);
    }

    #[test]
    fn order_follows_file_sequence_then_document_order() {
        let units = vec![
            unit("B.swift", vec![
                Declaration::new(DeclarationKind::Struct, "Zeta", &[TARGET]),
                Declaration::new(DeclarationKind::Struct, "Alpha", &[TARGET]),
            ]),
            unit("A.swift", vec![Declaration::new(DeclarationKind::Struct, "Mid", &[TARGET])]),
        ];

        assert_eq!(names(&scan(&units, &top_level())), vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn duplicate_across_files_keeps_first() {
        let units = vec![
            unit("One.swift", vec![Declaration::new(DeclarationKind::Struct, "Alpha", &[TARGET])]),
            unit("Two.swift", vec![Declaration::new(DeclarationKind::Struct, "Alpha", &[TARGET])]),
        ];

        let matches = scan(&units, &top_level());
        assert_eq!(names(&matches), vec!["Alpha"]);
        assert_eq!(matches[0].file, PathBuf::from("One.swift"));
    }

    #[test]
    fn no_prefix_or_substring_matching() {
        let units = vec![unit("X.swift", vec![
            Declaration::new(DeclarationKind::Struct, "X", &["DebuggableTestGroupX"]),
            Declaration::new(DeclarationKind::Struct, "Y", &["Debuggable"]),
            Declaration::new(DeclarationKind::Struct, "Z", &["Module.DebuggableTestGroup"]),
        ])];

        assert!(scan(&units, &top_level()).is_empty());
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let units = vec![unit("X.swift", vec![Declaration::new(
            DeclarationKind::Struct,
            "Padded",
            &["  DebuggableTestGroup\n"],
        )])];

        assert_eq!(names(&scan(&units, &top_level())), vec!["Padded"]);
    }

    #[test]
    fn extensions_and_protocols_never_match() {
        let units = vec![unit("X.swift", vec![
            Declaration::new(DeclarationKind::Extension, "Login", &[TARGET]),
            Declaration::new(DeclarationKind::Protocol, "Refined", &[TARGET]),
            Declaration::new(DeclarationKind::Actor, "Worker", &[TARGET]),
        ])];

        assert!(scan(&units, &top_level()).is_empty());
    }

    #[test]
    fn nested_declarations_ignored_at_top_level() {
        let outer = Declaration::new(DeclarationKind::Struct, "Outer", &[])
            .with_members(vec![Declaration::new(DeclarationKind::Struct, "Inner", &[TARGET])]);
        let units = vec![unit("X.swift", vec![outer])];

        assert!(scan(&units, &top_level()).is_empty());
    }

    #[test]
    fn nested_mode_descends_into_non_matching_hosts() {
        let outer = Declaration::new(DeclarationKind::Struct, "Outer", &[]).with_members(vec![
            Declaration::new(DeclarationKind::Struct, "Inner", &[TARGET]),
        ]);
        let ext = Declaration::new(DeclarationKind::Extension, "Outer", &[]).with_members(vec![
            Declaration::new(DeclarationKind::Enum, "FromExtension", &[TARGET]),
        ]);
        let proto = Declaration::new(DeclarationKind::Protocol, "P", &[]).with_members(vec![
            Declaration::new(DeclarationKind::Struct, "Hidden", &[TARGET]),
        ]);
        let units = vec![unit("X.swift", vec![outer, ext, proto])];

        assert_eq!(names(&scan(&units, &nested())), vec!["Inner", "FromExtension"]);
    }

    #[test]
    fn matched_declaration_is_not_descended_into() {
        let host = Declaration::new(DeclarationKind::Class, "Host", &[TARGET]).with_members(vec![
            Declaration::new(DeclarationKind::Struct, "Child", &[TARGET]),
        ]);
        let units = vec![unit("X.swift", vec![host])];

        assert_eq!(names(&scan(&units, &nested())), vec!["Host"]);
    }

    #[test]
    fn empty_input_yields_no_matches() {
        assert!(scan(&[], &top_level()).is_empty());
        assert!(scan(&[unit("Empty.swift", vec![])], &top_level()).is_empty());
    }
}
