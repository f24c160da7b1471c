/// Tree-sitter grammar resolution by file extension.
use std::path::Path;

use tree_sitter::Language;

use crate::error::Error;

/// Map a file path to its tree-sitter language by extension.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage` for unknown extensions.
pub fn language_for_path(path: &Path) -> Result<Language, Error> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");
    return language_for_extension(ext);
}

/// Map a bare extension (no leading dot) to its tree-sitter language.
///
/// # Errors
///
/// Returns `Error::UnsupportedLanguage` for anything but `swift`.
pub fn language_for_extension(ext: &str) -> Result<Language, Error> {
    return match ext {
        "swift" => Ok(tree_sitter_swift::LANGUAGE.into()),
        _ => Err(Error::UnsupportedLanguage {
            ext: ext.to_string(),
        }),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swift_extension_resolves() {
        assert!(language_for_path(Path::new("Groups/Login.swift")).is_ok());
    }

    #[test]
    fn other_extensions_are_rejected() {
        let err = language_for_path(Path::new("notes.md")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage { ext } if ext == "md"));
    }

    #[test]
    fn bare_extension_lookup() {
        assert!(language_for_extension("swift").is_ok());
        assert!(matches!(language_for_extension("kt"), Err(Error::UnsupportedLanguage { .. })));
        assert!(matches!(language_for_extension(""), Err(Error::UnsupportedLanguage { .. })));
    }
}
