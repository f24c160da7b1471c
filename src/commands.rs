//! Core CLI commands for conformgen: generate, list.

use crate::config::Config;
use crate::discovery;
use crate::emitter::{self, WriteOutcome};
use crate::error;
use crate::registry;
use crate::scanner;
use crate::types::Registry;

/// List, parse and scan the input directory, then build the registry.
///
/// # Errors
///
/// Returns errors from discovery, decoding, parsing, or case-identifier clashes.
fn build_registry(config: &Config) -> Result<Registry, error::Error> {
    let files = discovery::list_candidate_files(config)?;
    let units = discovery::parse_all(&files)?;

    let matches = scanner::scan(&units, &config.scan_options());
    tracing::info!(
        count = matches.len(),
        protocol = %config.protocol,
        "conforming types found"
    );

    let registry = registry::build(&matches, &config.enum_name, &config.protocol, &config.accessor)?;
    if registry.is_empty() {
        tracing::warn!(protocol = %config.protocol, "no type conforms, generating an empty registry");
    }
    return Ok(registry);
}

/// Scan the input directory and write the generated registry to the output target.
///
/// # Errors
///
/// Returns errors from output resolution, scanning, registry building, or writing.
pub fn generate(config: &Config) -> Result<(), error::Error> {
    let output = config.output_target()?;
    let registry = build_registry(config)?;
    let swift = emitter::render(&registry, &config.accessor);

    let count = registry.len();
    match emitter::write_atomic(&output, &swift)? {
        WriteOutcome::Unchanged => eprintln!("{} is up to date ({count} cases)", output.display()),
        WriteOutcome::Written => eprintln!("Generated {count} cases into {}", output.display()),
    }

    return Ok(());
}

/// Print the registry that `generate` would write, without writing anything.
///
/// # Errors
///
/// Returns errors from scanning or registry building, or `Error::Json` if
/// serialization fails.
pub fn list(config: &Config, json: bool) -> Result<(), error::Error> {
    let registry = build_registry(config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&registry.entries)?);
        return Ok(());
    }

    for entry in &registry.entries {
        println!(
            "{} -> {}  ({})",
            entry.case_identifier,
            entry.type_name,
            entry.file.display()
        );
    }
    return Ok(());
}
