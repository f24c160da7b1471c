mod commands;
mod config;
mod diagnostics;
mod discovery;
mod emitter;
mod error;
mod grammar;
mod parser;
mod registry;
mod scanner;
mod types;

use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, Overrides};

#[derive(Parser)]
#[command(
    name = "conformgen",
    version,
    about = "Generate an enumerable registry of Swift types that conform to a protocol"
)]
struct Cli {
    /// Subcommand; `generate` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Settings shared by every subcommand.
    #[command(flatten)]
    settings: SettingsArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the input directory and write the registry source file
    Generate,
    /// Print the registry without writing it
    List {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Flags accepted before or after the subcommand.
#[derive(Args)]
struct SettingsArgs {
    /// Config file (default: .conformgen.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Name of the generated enum
    #[arg(long, global = true)]
    enum_name: Option<String>,
    /// Also register conforming types declared inside other types
    #[arg(long, global = true)]
    include_nested: bool,
    /// Directory holding the source files
    #[arg(long, env = "TEST_GROUPS_DIR", global = true)]
    input_dir: Option<PathBuf>,
    /// Destination of the generated file, as a path or file:// URL
    #[arg(long = "output-url", visible_alias = "output", global = true)]
    output: Option<String>,
    /// Protocol the registered types conform to
    #[arg(long, global = true)]
    protocol: Option<String>,
    /// List subdirectories of the input directory too
    #[arg(long, global = true)]
    recursive: bool,
    /// Log every file and match
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl SettingsArgs {
    /// Split into the config-file path and the overrides applied on top of it.
    fn into_overrides(self) -> (Option<PathBuf>, Overrides) {
        let overrides = Overrides {
            enum_name: self.enum_name,
            include_nested: self.include_nested,
            input_dir: self.input_dir,
            output: self.output,
            protocol: self.protocol,
            recursive: self.recursive,
        };
        return (self.config, overrides);
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "conformgen=debug" } else { "conformgen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.settings.verbose);

    return match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Load settings and dispatch the subcommand.
///
/// # Errors
///
/// Returns the first error from config loading or the command itself.
fn run(cli: Cli) -> Result<(), error::Error> {
    let command = cli.command.unwrap_or(Commands::Generate);

    // Skipped passes must not touch the config file or the input directory.
    if matches!(command, Commands::Generate)
        && let Some(reason) = config::skip_reason(|key| return std::env::var(key).ok())
    {
        tracing::info!("skipping generation: {reason}");
        return Ok(());
    }

    let (config_path, overrides) = cli.settings.into_overrides();
    let config = Config::load(Path::new("."), config_path.as_deref())?.apply(overrides);

    return match command {
        Commands::Generate => commands::generate(&config),
        Commands::List { json } => commands::list(&config, json),
    };
}
