/// Core domain types: parsed declaration trees, conformance matches, and registry entries.
use std::path::PathBuf;

use serde::Serialize;

/// Syntactic kind of a type-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    /// `actor Name { ... }`. Never matched, only descended into.
    Actor,
    /// `class Name: ... { ... }`.
    Class,
    /// `enum Name: ... { ... }`.
    Enum,
    /// `extension Name: ... { ... }`. Never matched, only descended into.
    Extension,
    /// `protocol Name: ... { ... }`. Never matched nor descended into.
    Protocol,
    /// `struct Name: ... { ... }`.
    Struct,
}

impl DeclarationKind {
    /// Map a declaration keyword to its kind.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        return match keyword {
            "actor" => Some(Self::Actor),
            "class" => Some(Self::Class),
            "enum" => Some(Self::Enum),
            "extension" => Some(Self::Extension),
            "protocol" => Some(Self::Protocol),
            "struct" => Some(Self::Struct),
            _ => None,
        };
    }

    /// Struct-like, class-like or enum-like: the kinds that can declare a conformance
    /// the scanner records.
    pub const fn is_nominal_type(self) -> bool {
        return matches!(self, Self::Class | Self::Enum | Self::Struct);
    }
}

/// A type declaration as written in source: its name, the raw entries of its
/// inheritance clause, and any type declarations nested in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Raw inheritance-clause entries in source order, whitespace-trimmed.
    pub conformances: Vec<String>,
    /// Syntactic kind.
    pub kind: DeclarationKind,
    /// Type declarations nested inside this declaration's body.
    pub members: Vec<Declaration>,
    /// Declared name. For extensions this is the extended type as written.
    pub name: String,
}

#[cfg(test)]
impl Declaration {
    /// Build a declaration with no nested members.
    pub fn new(kind: DeclarationKind, name: &str, conformances: &[&str]) -> Self {
        return Self {
            conformances: conformances.iter().map(|c| return (*c).to_string()).collect(),
            kind,
            members: Vec::new(),
            name: name.to_string(),
        };
    }

    /// Attach nested declarations.
    #[must_use]
    pub fn with_members(mut self, members: Vec<Declaration>) -> Self {
        self.members = members;
        return self;
    }
}

impl Declaration {
    /// Whether any inheritance-clause entry is exactly `protocol` after trimming.
    pub fn declares_conformance_to(&self, protocol: &str) -> bool {
        return self.conformances.iter().any(|c| return c.trim() == protocol);
    }
}

/// One parsed input file. Read-only after parsing.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Top-level declarations in document order.
    pub declarations: Vec<Declaration>,
    /// Originating path, kept for diagnostics.
    pub path: PathBuf,
}

/// A type whose own declaration lists the target protocol in its inheritance clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceMatch {
    /// File where the type was first seen.
    pub file: PathBuf,
    /// Declared type name, verbatim.
    pub type_name: String,
}

/// One case of the generated registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    /// Lower-camel-case identifier derived from `type_name`.
    #[serde(rename = "case")]
    pub case_identifier: String,
    /// File where the type was first seen.
    pub file: PathBuf,
    /// Type name as declared.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Ordered case → type mapping handed to the emitter.
#[derive(Debug, Clone)]
pub struct Registry {
    /// Name of the generated enum.
    pub enum_name: String,
    /// Entries in discovery order.
    pub entries: Vec<RegistryEntry>,
    /// Protocol every registered type conforms to.
    pub protocol: String,
}

impl Registry {
    /// Case identifiers in registry order.
    pub fn cases(&self) -> impl Iterator<Item = &str> {
        return self.entries.iter().map(|e| return e.case_identifier.as_str());
    }

    /// Whether the registry holds no cases.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of cases.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }
}
