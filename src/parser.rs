//! Text codecs used to persist and decode values
//!
//! A [`Parser`] turns text into a [`serde_json::Value`] and back. JSON is the
//! default; TOML is available for configuration files that prefer it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodecError, ConfigError};

/// Text to value codec
pub trait Parser: fmt::Debug + Send + Sync {
    /// Decode text into a value
    fn parse(&self, text: &str) -> Result<Value, CodecError>;

    /// Encode a value as text
    fn stringify(&self, value: &Value) -> Result<String, CodecError>;
}

/// JSON codec, pretty-printed with a trailing newline
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        Ok(serde_json::from_str(text)?)
    }

    fn stringify(&self, value: &Value) -> Result<String, CodecError> {
        let mut text = serde_json::to_string_pretty(value)?;
        text.push('\n');
        Ok(text)
    }
}

/// TOML codec
///
/// TOML documents are always tables and cannot express `null`, so only
/// object values without nulls can be stringified.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

impl Parser for TomlParser {
    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let table: toml::Table = toml::from_str(text)?;
        Ok(serde_json::to_value(table)?)
    }

    fn stringify(&self, value: &Value) -> Result<String, CodecError> {
        if !value.is_object() {
            return Err(CodecError::Unsupported(format!(
                "TOML documents must be tables, got {}",
                crate::types::format_value(Some(value))
            )));
        }
        if contains_null(value) {
            return Err(CodecError::Unsupported(
                "TOML cannot represent null values".to_string(),
            ));
        }
        Ok(toml::to_string_pretty(value)?)
    }
}

fn contains_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.iter().any(contains_null),
        Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

/// Serialization format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Toml,
}

impl Format {
    /// Build the codec for this format
    pub fn parser(&self) -> Box<dyn Parser> {
        match self {
            Format::Json => Box::new(JsonParser),
            Format::Toml => Box::new(TomlParser),
        }
    }

    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(ConfigError::Invalid(format!(
                "Unknown format '{other}', expected json or toml"
            ))),
        }
    }
}
