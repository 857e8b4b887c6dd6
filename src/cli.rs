//! Command line adapter over [`Config`]
//!
//! Exposes a config as `path`, `get`, `set`, `unset` and `check`
//! subcommands. Only the public surface of [`Config`] is used.

use clap::Subcommand;
use serde_json::Value;

use crate::config::{Config, Mode};
use crate::error::{ConfigError, Result};
use crate::parser::JsonParser;
use crate::print::PrintOptions;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Print the configuration file path
    Path,

    /// Print one key, or every key
    Get {
        key: Option<String>,

        /// real (stored or default), current (stored) or default
        #[arg(long, default_value = "real")]
        mode: Mode,

        /// Show each key's type
        #[arg(long)]
        types: bool,

        /// Space separated output for scripts
        #[arg(long)]
        parsable: bool,

        #[arg(long)]
        no_color: bool,
    },

    /// Store a value (JSON text, or a plain string)
    Set { key: String, value: String },

    /// Remove one key, or every key
    Unset { key: Option<String> },

    /// Validate the stored configuration
    Check,
}

/// Run one command against a loaded config and return the text to print
///
/// `defaults` seeds the print options; command flags can only switch
/// features on (or colour off). Mutating commands save immediately.
pub fn execute(
    config: &mut Config,
    command: &ConfigCommand,
    defaults: &PrintOptions,
    keep_empty_file: bool,
) -> Result<String> {
    match command {
        ConfigCommand::Path => Ok(config.path().display().to_string()),

        ConfigCommand::Get {
            key,
            mode,
            types,
            parsable,
            no_color,
        } => {
            let options = PrintOptions {
                mode: *mode,
                types: *types || defaults.types,
                parsable: *parsable,
                color: defaults.color && !*no_color,
            };
            let keys = key.as_ref().map(|k| vec![k.clone()]);
            config.get_printable(keys.as_deref(), &options)
        }

        ConfigCommand::Set { key, value } => {
            let value = decode_argument(config, key, value)?;
            config.set(key, value)?;
            config.save(keep_empty_file)?;
            Ok(String::new())
        }

        ConfigCommand::Unset { key } => {
            config.unset(key.as_deref())?;
            config.save(keep_empty_file)?;
            Ok(String::new())
        }

        ConfigCommand::Check => {
            let stored = config.get_data();
            match config.validator().fail_opt(stored.as_ref()) {
                Some(message) => Err(ConfigError::Invalid(message)),
                None => Ok(format!("{} is valid", config.path().display())),
            }
        }
    }
}

/// Decode `text` with the key's validator, falling back to a plain string
fn decode_argument(config: &Config, key: &str, text: &str) -> Result<Value> {
    let validator = config.validator_for(key)?;
    match validator.parse_with(&JsonParser, text) {
        Ok(value) => Ok(value),
        Err(ConfigError::Decode(_)) | Err(ConfigError::Invalid(_)) => Ok(Value::String(text.to_string())),
        Err(other) => Err(other),
    }
}
