use std::io::IsTerminal as _;
use std::path::Path;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown and print to stderr, with bold headings on a terminal.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    let styled = std::io::stderr().is_terminal();
    for line in md.lines() {
        if styled && line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened, and
/// how to fix it where there is a known fix.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DuplicateCaseIdentifier { case_identifier, first, second } => {
            render_duplicate_case(case_identifier, first, second)
        },
        Error::InputUnavailable { path, reason } => render_input_unavailable(path.as_deref(), reason),
        Error::NoCandidateFiles { directory, extension } => render_no_candidates(directory, extension),
        Error::OutputTargetUnresolved { reason } => render_output_unresolved(reason),
        Error::ReservedCaseIdentifier { case_identifier, type_name } => {
            render_reserved_case(case_identifier, type_name)
        },
        Error::UnsupportedLanguage { ext } => render_unsupported_language(ext),
        _ => render_generic(e),
    };
}

fn render_duplicate_case(case_identifier: &str, first: &str, second: &str) -> String {
    return format!("\
# Error: Duplicate Case Identifier

`{first}` and `{second}` both become case `{case_identifier}`.

## Fix

Rename one of the two types so their names differ after the first letter is lower-cased.
");
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Check the `--config` path.
", path.display()),

        Error::DecodeFailure { file, reason } => format!("\
# Error: Decode Failure

`{}` is not valid UTF-8: {reason}

## Fix

Re-save the file with UTF-8 encoding.
", file.display()),

        Error::FileTooLarge { file, size_bytes, max_bytes } => format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes (max {max_bytes}).
", file.display()),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid Config

{e}
"),

        Error::WriteFailure { path, reason } => format!("\
# Error: Write Failed

Could not write `{}`: {reason}

## Fix

Check that the directory exists and is writable.
", path.display()),

        _ => format!("\
# Error

{e}
"),
    };
}

fn render_input_unavailable(path: Option<&Path>, reason: &str) -> String {
    let location = path.map_or_else(String::new, |p| return format!("`{}`: ", p.display()));
    return format!("\
# Error: Input Unavailable

{location}{reason}

## Fix

Point `TEST_GROUPS_DIR` (or `--input-dir`) at the directory holding the source files:

    TEST_GROUPS_DIR=path/to/groups conformgen --output-url Generated.swift
");
}

fn render_no_candidates(directory: &Path, extension: &str) -> String {
    return format!("\
# Error: No Candidate Files

`{}` contains no `.{extension}` files.

## Fix

Check the input directory, or pass `--recursive` if the sources live in subdirectories.
", directory.display());
}

fn render_output_unresolved(reason: &str) -> String {
    return format!("\
# Error: Output Target Unresolved

{reason}

## Fix

Pass the destination as a path or `file://` URL:

    conformgen --output-url file:///path/to/DebugTestGroup.swift
");
}

fn render_reserved_case(case_identifier: &str, type_name: &str) -> String {
    return format!("\
# Error: Reserved Case Identifier

`{type_name}` becomes case `{case_identifier}`, which the generated enum already declares as a member.

## Fix

Rename the type, or set a different `accessor` in `.conformgen.toml`.
");
}

fn render_unsupported_language(ext: &str) -> String {
    return format!("\
# Error: Unsupported Language

No tree-sitter grammar for `.{ext}` files.

## Supported extensions

- `.swift`: Swift
");
}
