//! Configuration CLI
//!
//! Reads and edits one validated configuration file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use typed_config::cli::{execute, ConfigCommand};
use typed_config::parser::Format;
use typed_config::types::{any, object};
use typed_config::{AnsiHighlighter, Config, Settings};

#[derive(Parser)]
#[command(name = "typed-config")]
#[command(about = "Inspect and edit a validated configuration file")]
struct Cli {
    /// Configuration file (overrides the settings)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Serialization format (overrides the settings)
    #[arg(long)]
    format: Option<Format>,

    /// Tool settings file
    #[arg(short, long)]
    settings: Option<String>,

    #[command(subcommand)]
    command: ConfigCommand,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load_from(cli.settings.as_deref()).context("loading settings")?;

    let path = cli.file.unwrap_or_else(|| settings.store_path());
    let format = cli.format.unwrap_or(settings.store.format);
    tracing::debug!(path = %path.display(), %format, "opening configuration");

    let mut config = Config::new(&path, object(any()).with_default(serde_json::json!({})))
        .with_boxed_parser(format.parser())
        .with_highlighter(AnsiHighlighter);
    config.load()?;

    let output = execute(
        &mut config,
        &cli.command,
        &settings.print_options(),
        settings.store.keep_empty_file,
    )?;

    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
