//! Typed Config
//!
//! Runtime type validators for JSON-like values, and a configuration store
//! that persists one validated value to disk.
//!
//! ## Features
//!
//! - **Composable Validators**: arrays, maps, structs with dynamic properties,
//!   literals and bounded numbers, each reporting every violation at once
//! - **Validated Store**: loads, edits and saves are checked before they apply
//! - **Pluggable Codecs**: JSON by default, TOML available
//! - **Printing**: aligned or script-friendly output with optional highlighting
//!
//! ## Architecture
//!
//! ```text
//! types/     validators (Validator, factories, struct shapes)
//! parser     text codecs (JsonParser, TomlParser)
//! storage    filesystem access behind a trait
//! config     the store (Config, Mode)
//! print      get_printable rendering and highlighting
//! settings   settings of the command line tool
//! cli        subcommands over a Config
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod print;
pub mod settings;
pub mod storage;
pub mod types;

pub use config::{Config, Mode};
pub use error::{CodecError, ConfigError, Result};
pub use parser::{Format, JsonParser, Parser, TomlParser};
pub use print::{AnsiHighlighter, Highlighter, PrintOptions};
pub use settings::Settings;
pub use storage::{FsStorage, Storage};
pub use types::{Precomputed, Validator};
