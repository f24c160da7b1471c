/// Crate-level error types for conformgen diagnostics.
use std::path::PathBuf;

/// Every failure aborts the whole invocation. Each variant names the file, type,
/// or setting involved so the rendered diagnostic is actionable on its own.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested config file does not exist.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path given with `--config`.
        path: PathBuf,
    },

    /// A candidate file is not valid UTF-8.
    #[error("cannot decode {} as UTF-8: {reason}", file.display())]
    DecodeFailure {
        /// File whose bytes could not be decoded.
        file: PathBuf,
        /// Decoder message, including the offending byte offset.
        reason: String,
    },

    /// Two distinct type names derive the same case identifier.
    #[error("duplicate case identifier `{case_identifier}`: `{first}` and `{second}`")]
    DuplicateCaseIdentifier {
        /// The colliding case identifier.
        case_identifier: String,
        /// Type name that claimed the identifier first.
        first: String,
        /// Type name that collided with it.
        second: String,
    },

    /// Source file exceeds the size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// The input directory is not configured or cannot be read.
    #[error("input unavailable: {reason}")]
    InputUnavailable {
        /// Offending path, when one was configured.
        path: Option<PathBuf>,
        /// What went wrong.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped serde_json error.
        #[from]
        serde_json::Error,
    ),

    /// The input directory holds no files with the source extension.
    #[error("no .{extension} files found in {}", directory.display())]
    NoCandidateFiles {
        /// Directory that was listed.
        directory: PathBuf,
        /// Extension that was searched for, without the leading dot.
        extension: String,
    },

    /// The generated file's destination cannot be determined.
    #[error("output target unresolved: {reason}")]
    OutputTargetUnresolved {
        /// Why no usable destination was found.
        reason: String,
    },

    /// Tree-sitter failed to produce a tree for a source file.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A case identifier equals a member the generated enum already declares.
    #[error("case identifier `{case_identifier}` derived from `{type_name}` clashes with the generated `{case_identifier}` member")]
    ReservedCaseIdentifier {
        /// The clashing case identifier.
        case_identifier: String,
        /// Type name the identifier was derived from.
        type_name: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No tree-sitter grammar registered for this file extension.
    #[error("no grammar for extension: .{ext}")]
    UnsupportedLanguage {
        /// File extension without the leading dot.
        ext: String,
    },

    /// Writing the generated file failed.
    #[error("failed to write {}: {reason}", path.display())]
    WriteFailure {
        /// Destination that could not be written.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },
}
