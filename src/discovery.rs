//! Candidate file listing, decoding and parsing.
//!
//! Files are parsed in parallel but always handed back in listing order, so the
//! scan that follows sees the same sequence on every run.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::grammar;
use crate::parser;
use crate::types::SourceUnit;

/// List source files under the configured input directory, sorted by file name.
/// Applies the config's include/exclude filters to paths relative to the directory.
///
/// # Errors
///
/// Returns `Error::InputUnavailable` if the directory is missing or unreadable,
/// or `Error::NoCandidateFiles` if nothing with the source extension is found.
pub fn list_candidate_files(config: &Config) -> Result<Vec<PathBuf>, Error> {
    let root = config.input_dir()?;
    let metadata = std::fs::metadata(root).map_err(|e| {
        return Error::InputUnavailable {
            path: Some(root.to_path_buf()),
            reason: e.to_string(),
        };
    })?;
    if !metadata.is_dir() {
        return Err(Error::InputUnavailable {
            path: Some(root.to_path_buf()),
            reason: "not a directory".to_string(),
        });
    }

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            return Error::InputUnavailable {
                path: e.path().map(Path::to_path_buf).or_else(|| return Some(root.to_path_buf())),
                reason: e.to_string(),
            };
        })?;

        if !entry.file_type().is_file() || !has_extension(entry.path(), &config.extension) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or_else(|_| return entry.path());
        if !config.should_scan(&relative.to_string_lossy()) {
            tracing::debug!(file = %relative.display(), "excluded by config");
            continue;
        }

        files.push(entry.into_path());
    }

    if files.is_empty() {
        return Err(Error::NoCandidateFiles {
            directory: root.to_path_buf(),
            extension: config.extension.clone(),
        });
    }

    tracing::info!(count = files.len(), directory = %root.display(), "found source files");
    return Ok(files);
}

/// Whether `path` ends in `.extension`.
fn has_extension(path: &Path, extension: &str) -> bool {
    return path.extension().is_some_and(|ext| return ext == extension);
}

/// Read, decode and parse one file.
///
/// # Errors
///
/// Propagates read, decode, grammar and parse errors.
fn load_unit(path: &Path) -> Result<SourceUnit, Error> {
    let source = read_source(path)?;
    let language = grammar::language_for_path(path)?;
    return parser::parse_unit(path, &source, &language);
}

/// Parse every file in parallel, returning units in the order of `paths`.
/// When several files fail, the error of the earliest one in `paths` is returned.
///
/// # Errors
///
/// Returns the first failure in listing order.
pub fn parse_all(paths: &[PathBuf]) -> Result<Vec<SourceUnit>, Error> {
    let results: Vec<Result<SourceUnit, Error>> =
        paths.par_iter().map(|path| return load_unit(path)).collect();

    let mut units = Vec::with_capacity(results.len());
    for result in results {
        units.push(result?);
    }
    return Ok(units);
}

/// Read a source file as UTF-8, dropping a leading byte-order mark.
///
/// # Errors
///
/// Returns `Error::InputUnavailable` if the file cannot be read,
/// or `Error::DecodeFailure` if it is not valid UTF-8.
pub fn read_source(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path).map_err(|e| {
        return Error::InputUnavailable {
            path: Some(path.to_path_buf()),
            reason: e.to_string(),
        };
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        return Error::DecodeFailure {
            file: path.to_path_buf(),
            reason: e.utf8_error().to_string(),
        };
    })?;

    return Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    });
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::Overrides;

    fn config_for(dir: &Path, recursive: bool) -> Config {
        return Config::defaults().apply(Overrides {
            input_dir: Some(dir.to_path_buf()),
            recursive,
            ..Overrides::default()
        });
    }

    fn file_names(files: &[PathBuf], root: &Path) -> Vec<String> {
        return files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Signup.swift"), "final class Signup: DebuggableTestGroup {}\n").unwrap();
        fs::write(dir.path().join("Login.swift"), "struct Login: DebuggableTestGroup {}\n").unwrap();
        fs::write(dir.path().join("README.md"), "# not swift\n").unwrap();
        fs::create_dir(dir.path().join("Nested")).unwrap();
        fs::write(dir.path().join("Nested/Deep.swift"), "struct Deep: DebuggableTestGroup {}\n").unwrap();
        return dir;
    }

    #[test]
    fn lists_sorted_top_level_sources() {
        let dir = fixture();
        let files = list_candidate_files(&config_for(dir.path(), false)).unwrap();
        assert_eq!(file_names(&files, dir.path()), vec!["Login.swift", "Signup.swift"]);
    }

    #[test]
    fn recursive_listing_includes_subdirectories() {
        let dir = fixture();
        let files = list_candidate_files(&config_for(dir.path(), true)).unwrap();
        assert_eq!(
            file_names(&files, dir.path()),
            vec!["Login.swift", "Nested/Deep.swift", "Signup.swift"]
        );
    }

    #[test]
    fn directory_without_sources_has_no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();
        let err = list_candidate_files(&config_for(dir.path(), false)).unwrap_err();
        assert!(matches!(err, Error::NoCandidateFiles { extension, .. } if extension == "swift"));
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = list_candidate_files(&config_for(&missing, false)).unwrap_err();
        assert!(matches!(err, Error::InputUnavailable { path: Some(p), .. } if p == missing));
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.swift");
        fs::write(&path, [0x73, 0x74, 0xff, 0xfe]).unwrap();
        let err = read_source(&path).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure { file, .. } if file == path));
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bom.swift");
        fs::write(&path, "\u{feff}struct Bom {}").unwrap();
        assert_eq!(read_source(&path).unwrap(), "struct Bom {}");
    }

    #[test]
    fn parse_all_keeps_listing_order() {
        let dir = fixture();
        let files = list_candidate_files(&config_for(dir.path(), true)).unwrap();
        let units = parse_all(&files).unwrap();

        let paths: Vec<&Path> = units.iter().map(|u| u.path.as_path()).collect();
        let expected: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
        assert_eq!(paths, expected);
        assert_eq!(units[0].declarations[0].name, "Login");
    }

    #[test]
    fn parse_all_reports_earliest_failure() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("A.swift");
        let second = dir.path().join("B.swift");
        fs::write(&first, [0xff]).unwrap();
        fs::write(&second, [0xfe]).unwrap();

        let err = parse_all(&[first.clone(), second]).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure { file, .. } if file == first));
    }
}
