//! Error types for validators and the configuration store

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Failures raised by a [`Parser`](crate::parser::Parser) implementation
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("{0}")]
    Unsupported(String),
}

/// Configuration store errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value does not satisfy its validator
    #[error("{0}")]
    Invalid(String),

    #[error("Unable to parse value: {0}")]
    Decode(#[source] CodecError),

    #[error("Unable to stringify value: {0}")]
    Encode(#[source] CodecError),

    #[error("Unable to parse: {}.", path.display())]
    Unparsable {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("Unable to read: {}.", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write: {}.", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to remove: {}.", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to {operation}{}: the configuration is not object-like. {reason}", describe_key(key.as_deref()))]
    NotObjectLike {
        operation: &'static str,
        key: Option<String>,
        reason: String,
    },

    #[error("Unable to set the key '{key}' to {value}: {reason}")]
    BadValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unexpected key '{key}'.{}", info.as_deref().map(|i| format!(" {i}")).unwrap_or_default())]
    UnexpectedKey { key: String, info: Option<String> },

    #[error("Unable to unset {}:\n\n{}", describe_keys(keys), reasons.join("\n\n"))]
    Unset {
        keys: Vec<String>,
        reasons: Vec<String>,
    },

    #[error("Invalid default value for {type_name}: {reason}")]
    InvalidDefault { type_name: String, reason: String },

    #[error("Unknown mode '{0}', expected one of: real, current, default")]
    UnknownMode(String),
}

fn describe_key(key: Option<&str>) -> String {
    key.map(|k| format!(" the key '{k}'")).unwrap_or_default()
}

fn describe_keys(keys: &[String]) -> String {
    let quoted: Vec<String> = keys.iter().map(|k| format!("'{k}'")).collect();
    if keys.len() == 1 {
        format!("the key {}", quoted[0])
    } else {
        format!("the keys {}", quoted.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_object_like_names_key() {
        let err = ConfigError::NotObjectLike {
            operation: "get",
            key: Some("port".to_string()),
            reason: "Expected object<any>, got 5.".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to get the key 'port': the configuration is not object-like. Expected object<any>, got 5."
        );
    }

    #[test]
    fn test_unset_lists_every_key() {
        let err = ConfigError::Unset {
            keys: vec!["a".to_string(), "b".to_string()],
            reasons: vec!["first".to_string(), "second".to_string()],
        };
        let text = err.to_string();
        assert!(text.starts_with("Unable to unset the keys 'a', 'b':"));
        assert!(text.ends_with("first\n\nsecond"));
    }

    #[test]
    fn test_unparsable_message() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ConfigError::Unparsable {
            path: PathBuf::from("/tmp/app.json"),
            source: CodecError::Json(source),
        };
        assert_eq!(err.to_string(), "Unable to parse: /tmp/app.json.");
    }
}
