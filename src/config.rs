use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::grammar;
use crate::scanner::{Nesting, ScanOptions};

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = ".conformgen.toml";

/// Accessor property generated on the registry enum by default.
const DEFAULT_ACCESSOR: &str = "rawValue";

/// Name of the generated enum by default.
const DEFAULT_ENUM_NAME: &str = "DebugTestGroup";

/// Source file extension scanned by default.
const DEFAULT_EXTENSION: &str = "swift";

/// Protocol scanned for by default.
const DEFAULT_PROTOCOL: &str = "DebuggableTestGroup";

/// Environment variable naming the build action; `indexbuild` means an indexing pass.
const ENV_ACTION: &str = "ACTION";

/// Environment variable set to `YES` during preview builds.
const ENV_ENABLE_PREVIEWS: &str = "ENABLE_PREVIEWS";

/// Effective settings for one invocation: defaults, then the config file, then
/// environment and command-line overrides.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the generated accessor property.
    pub accessor: String,
    /// Name of the generated enum.
    pub enum_name: String,
    /// Path prefixes (relative to the input directory) never scanned.
    exclude: Vec<String>,
    /// Source file extension without the dot.
    pub extension: String,
    /// Path prefixes (relative to the input directory) scanned; empty means all.
    include: Vec<String>,
    /// Directory holding the source files.
    input_dir: Option<PathBuf>,
    /// Whether nested type declarations are scanned.
    pub nesting: Nesting,
    /// Raw output target: a path or a `file://` URL.
    output: Option<String>,
    /// Protocol a type must list to be registered.
    pub protocol: String,
    /// Whether subdirectories of the input directory are listed.
    pub recursive: bool,
}

/// Raw TOML structure for `.conformgen.toml`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConformgenTomlConfig {
    /// Accessor property name.
    accessor: Option<String>,
    /// Generated enum name.
    enum_name: Option<String>,
    /// Excluded path prefixes.
    #[serde(default)]
    exclude: Vec<String>,
    /// Source extension.
    extension: Option<String>,
    /// Included path prefixes.
    #[serde(default)]
    include: Vec<String>,
    /// Scan nested declarations.
    include_nested: Option<bool>,
    /// Input directory.
    input_dir: Option<PathBuf>,
    /// Output path or URL.
    output: Option<String>,
    /// Target protocol.
    protocol: Option<String>,
    /// List subdirectories.
    recursive: Option<bool>,
}

/// Settings supplied on the command line or through the environment.
/// `None` and `false` leave the config file's value in place.
#[derive(Debug, Default)]
pub struct Overrides {
    /// `--enum-name`.
    pub enum_name: Option<String>,
    /// `--include-nested`.
    pub include_nested: bool,
    /// `--input-dir` or `TEST_GROUPS_DIR`.
    pub input_dir: Option<PathBuf>,
    /// `--output-url`.
    pub output: Option<String>,
    /// `--protocol`.
    pub protocol: Option<String>,
    /// `--recursive`.
    pub recursive: bool,
}

/// Build passes during which generation is suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The IDE is only indexing.
    IndexBuild,
    /// The build renders previews.
    PreviewBuild,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Self::IndexBuild => f.write_str("not running during indexing"),
            Self::PreviewBuild => f.write_str("not running during preview builds"),
        };
    }
}

impl Config {
    /// Apply command-line and environment overrides on top of loaded settings.
    #[must_use]
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(enum_name) = overrides.enum_name {
            self.enum_name = enum_name;
        }
        if overrides.include_nested {
            self.nesting = Nesting::Nested;
        }
        if overrides.input_dir.is_some() {
            self.input_dir = overrides.input_dir;
        }
        if overrides.output.is_some() {
            self.output = overrides.output;
        }
        if let Some(protocol) = overrides.protocol {
            self.protocol = protocol;
        }
        self.recursive |= overrides.recursive;
        return self;
    }

    /// Built-in settings used when no config file exists.
    pub fn defaults() -> Self {
        return Self::from_toml(ConformgenTomlConfig::default());
    }

    /// Merge a parsed TOML file over the built-in defaults.
    fn from_toml(raw: ConformgenTomlConfig) -> Self {
        let nesting = if raw.include_nested.unwrap_or(false) {
            Nesting::Nested
        } else {
            Nesting::TopLevel
        };

        return Self {
            accessor: raw.accessor.unwrap_or_else(|| return DEFAULT_ACCESSOR.to_string()),
            enum_name: raw.enum_name.unwrap_or_else(|| return DEFAULT_ENUM_NAME.to_string()),
            exclude: raw.exclude,
            extension: raw
                .extension
                .map(|e| return e.trim_start_matches('.').to_string())
                .unwrap_or_else(|| return DEFAULT_EXTENSION.to_string()),
            include: raw.include,
            input_dir: raw.input_dir,
            nesting,
            output: raw.output,
            protocol: raw.protocol.unwrap_or_else(|| return DEFAULT_PROTOCOL.to_string()),
            recursive: raw.recursive.unwrap_or(false),
        };
    }

    /// The configured input directory.
    ///
    /// # Errors
    ///
    /// Returns `Error::InputUnavailable` if no directory was configured.
    pub fn input_dir(&self) -> Result<&Path, Error> {
        return self.input_dir.as_deref().ok_or_else(|| {
            return Error::InputUnavailable {
                path: None,
                reason: "no input directory: set TEST_GROUPS_DIR or pass --input-dir".to_string(),
            };
        });
    }

    /// Load config from `explicit`, or from `.conformgen.toml` in `root`.
    /// Returns the defaults if the implicit file doesn't exist.
    /// A file that exists but is malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if `explicit` doesn't exist,
    /// `Error::Io` if reading fails, `Error::TomlDe` if the TOML is malformed,
    /// or `Error::UnsupportedLanguage` if `extension` names no known grammar.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, Error> {
        let path = explicit.map_or_else(|| return root.join(CONFIG_FILE), Path::to_path_buf);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if explicit.is_some() {
                    return Err(Error::ConfigNotFound { path });
                }
                return Ok(Self::defaults());
            },
            Err(e) => return Err(Error::Io(e)),
        };

        tracing::debug!(path = %path.display(), "loading config");
        let raw: ConformgenTomlConfig = toml::from_str(&content)?;
        let config = Self::from_toml(raw);
        grammar::language_for_extension(&config.extension)?;
        return Ok(config);
    }

    /// Resolve where the generated file goes.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutputTargetUnresolved` if no target was configured or it is unusable.
    pub fn output_target(&self) -> Result<PathBuf, Error> {
        let Some(raw) = self.output.as_deref() else {
            return Err(Error::OutputTargetUnresolved {
                reason: "no output target: pass --output-url".to_string(),
            });
        };
        return resolve_output_target(raw);
    }

    /// Scanner settings derived from this config.
    pub fn scan_options(&self) -> ScanOptions {
        return ScanOptions {
            nesting: self.nesting,
            protocol: self.protocol.clone(),
        };
    }

    /// Check whether a file path, relative to the input directory, should be scanned.
    ///
    /// A path is included if no include patterns are set, or if it starts with at
    /// least one include pattern. An included path is then excluded if it starts
    /// with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| return relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Value of one hexadecimal digit.
fn hex_value(byte: u8) -> Option<u8> {
    return char::from(byte).to_digit(16).and_then(|d| return u8::try_from(d).ok());
}

/// Decode `%XX` escapes. `None` on a malformed escape or non-UTF-8 result.
fn percent_decode(raw: &str) -> Option<String> {
    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.bytes();

    while let Some(byte) = bytes.next() {
        if byte != b'%' {
            out.push(byte);
            continue;
        }
        let high = bytes.next().and_then(hex_value)?;
        let low = bytes.next().and_then(hex_value)?;
        out.push(high.checked_mul(16)?.checked_add(low)?);
    }

    return String::from_utf8(out).ok();
}

/// Turn a raw `--output-url` value into a filesystem path.
///
/// Accepts a plain path or a `file://` URL with an empty or `localhost` host.
///
/// # Errors
///
/// Returns `Error::OutputTargetUnresolved` for empty values, other URL schemes,
/// remote hosts, or malformed percent-escapes.
pub fn resolve_output_target(raw: &str) -> Result<PathBuf, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::OutputTargetUnresolved {
            reason: "output target is empty".to_string(),
        });
    }

    let Some((scheme, rest)) = raw.split_once("://") else {
        return Ok(PathBuf::from(raw));
    };

    if !scheme.eq_ignore_ascii_case("file") {
        return Err(Error::OutputTargetUnresolved {
            reason: format!("unsupported URL scheme `{scheme}` in `{raw}`"),
        });
    }

    let (host, path) = match rest.find('/') {
        Some(0) => ("", rest),
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    if !host.is_empty() && host != "localhost" {
        return Err(Error::OutputTargetUnresolved {
            reason: format!("file URL with remote host `{host}`"),
        });
    }

    let decoded = percent_decode(path).ok_or_else(|| {
        return Error::OutputTargetUnresolved {
            reason: format!("malformed percent-escape in `{raw}`"),
        };
    })?;
    if decoded.is_empty() {
        return Err(Error::OutputTargetUnresolved {
            reason: format!("file URL `{raw}` has no path"),
        });
    }

    return Ok(PathBuf::from(decoded));
}

/// Decide whether this build pass must skip generation, reading variables through `lookup`.
pub fn skip_reason<F>(lookup: F) -> Option<SkipReason>
where
    F: Fn(&str) -> Option<String>,
{
    if lookup(ENV_ACTION).as_deref() == Some("indexbuild") {
        return Some(SkipReason::IndexBuild);
    }
    if lookup(ENV_ENABLE_PREVIEWS).as_deref() == Some("YES") {
        return Some(SkipReason::PreviewBuild);
    }
    return None;
}
