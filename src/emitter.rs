//! Swift rendering of the registry and atomic output writing.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Error;
use crate::types::Registry;

/// First line of every generated file.
const HEADER: &str = "// The file is generated automatically. Do not modify.";

/// Swift keywords that need backticks when used as a case name.
const SWIFT_KEYWORDS: &[&str] = &[
    "Any", "Self", "as", "associatedtype", "await", "break", "case", "catch", "class", "continue",
    "default", "defer", "deinit", "do", "else", "enum", "extension", "fallthrough", "false",
    "fileprivate", "for", "func", "guard", "if", "import", "in", "init", "inout", "internal", "is",
    "let", "nil", "open", "operator", "precedencegroup", "private", "protocol", "public", "repeat",
    "rethrows", "return", "self", "static", "struct", "subscript", "super", "switch", "throw",
    "throws", "true", "try", "typealias", "var", "where", "while",
];

/// What `write_atomic` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The target already held the same text; nothing was touched.
    Unchanged,
    /// The target was created or replaced.
    Written,
}

/// Case name as it must appear in Swift source.
fn escape_case(case_identifier: &str) -> String {
    if SWIFT_KEYWORDS.contains(&case_identifier) {
        return format!("`{case_identifier}`");
    }
    return case_identifier.to_string();
}

/// Render the registry as a Swift enum with one case per entry and an
/// exhaustive accessor returning each case's type.
pub fn render(registry: &Registry, accessor: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADER}");
    out.push('\n');
    let _ = writeln!(out, "enum {}: CaseIterable {{", registry.enum_name);

    for case in registry.cases() {
        let _ = writeln!(out, "    case {}", escape_case(case));
    }
    if !registry.is_empty() {
        out.push('\n');
    }

    let _ = writeln!(out, "    var {accessor}: any {}.Type {{", registry.protocol);
    out.push_str("        switch self {\n");
    for entry in &registry.entries {
        let _ = writeln!(
            out,
            "        case .{}: {}.self",
            escape_case(&entry.case_identifier),
            entry.type_name
        );
    }
    out.push_str("        }\n");
    out.push_str("    }\n");
    out.push_str("}\n");
    return out;
}

/// Create a temp file next to `path` so the final rename stays on one filesystem.
///
/// # Errors
///
/// Returns the underlying I/O error.
fn temp_file_beside(path: &Path) -> std::io::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".conformgen").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt as _;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    return builder.tempfile_in(dir);
}

/// Write `contents` to `path` atomically: a temp file in the same directory is
/// renamed over the target. Identical existing contents are left alone so the
/// file's timestamp does not change.
///
/// # Errors
///
/// Returns `Error::WriteFailure` if the temp file cannot be created, written or renamed.
pub fn write_atomic(path: &Path, contents: &str) -> Result<WriteOutcome, Error> {
    if let Ok(existing) = std::fs::read_to_string(path)
        && existing == contents
    {
        tracing::info!(path = %path.display(), "generated file unchanged");
        return Ok(WriteOutcome::Unchanged);
    }

    let failure = |reason: String| {
        return Error::WriteFailure {
            path: path.to_path_buf(),
            reason,
        };
    };

    let mut tmp = temp_file_beside(path).map_err(|e| return failure(e.to_string()))?;
    tmp.write_all(contents.as_bytes()).map_err(|e| return failure(e.to_string()))?;
    tmp.as_file().sync_all().map_err(|e| return failure(e.to_string()))?;
    tmp.persist(path).map_err(|e| return failure(e.error.to_string()))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "generated file written");
    return Ok(WriteOutcome::Written);
}
