//! Validated configuration store
//!
//! A [`Config`] owns one value persisted at a path. The value always
//! satisfies the config's [`Validator`] (or is its declared default): every
//! load, replacement and key update is checked first, and a rejected change
//! leaves the held value untouched.
//!
//! Each fallible operation comes in two forms: one returning [`Result`] and a
//! `fail_*` twin returning the error text, or `None` on success.
//!
//! ```no_run
//! use serde_json::json;
//! use typed_config::types::{number, structure, NumberOptions, StructOptions};
//! use typed_config::{Config, Mode};
//!
//! let validator = structure(
//!     StructOptions::new().property("port", number(NumberOptions::new()).with_default(8080)),
//! );
//! let mut config = Config::new("app.json", validator);
//! config.load()?;
//! assert_eq!(config.get("port", Mode::Real)?, Some(json!(8080)));
//! config.set("port", json!(9090))?;
//! config.save(false)?;
//! # Ok::<(), typed_config::ConfigError>(())
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::parser::{JsonParser, Parser};
use crate::print::{self, Highlighter, PrintOptions, Row};
use crate::storage::{FsStorage, Storage};
use crate::types::{format_value, Resolved, Validator};

/// How a value is resolved for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Stored value, falling back to the declared default
    Real,
    /// Stored value only
    Current,
    /// Declared default only
    Default,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Real => "real",
            Mode::Current => "current",
            Mode::Default => "default",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "real" => Ok(Mode::Real),
            "current" => Ok(Mode::Current),
            "default" => Ok(Mode::Default),
            other => Err(ConfigError::UnknownMode(other.to_string())),
        }
    }
}

/// A single persisted value guarded by a validator
#[derive(Debug)]
pub struct Config {
    path: PathBuf,
    validator: Validator,
    parser: Box<dyn Parser>,
    storage: Box<dyn Storage>,
    highlighter: Option<Box<dyn Highlighter>>,
    data: Option<Value>,
}

impl Config {
    /// Create a store holding the validator's default, backed by a JSON file
    pub fn new(path: impl Into<PathBuf>, validator: Validator) -> Self {
        let data = validator.default_value().cloned();
        Self {
            path: path.into(),
            validator,
            parser: Box::new(JsonParser),
            storage: Box::new(FsStorage),
            highlighter: None,
            data,
        }
    }

    pub fn with_parser(self, parser: impl Parser + 'static) -> Self {
        self.with_boxed_parser(Box::new(parser))
    }

    pub fn with_boxed_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_storage(mut self, storage: impl Storage + 'static) -> Self {
        self.storage = Box::new(storage);
        self
    }

    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Some(Box::new(highlighter));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Copy of the held value
    pub fn get_data(&self) -> Option<Value> {
        self.data.clone()
    }

    /// Replace the held value wholesale
    pub fn set_data(&mut self, data: Option<Value>) -> Result<()> {
        if let Some(message) = self.validator.fail_opt(data.as_ref()) {
            return Err(ConfigError::Invalid(message));
        }
        self.data = data;
        Ok(())
    }

    pub fn fail_set_data(&mut self, data: Option<Value>) -> Option<String> {
        self.set_data(data).err().map(|e| e.to_string())
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Read the backing file, adopting its value only if it validates
    ///
    /// A missing file stands for the declared default.
    pub fn load(&mut self) -> Result<()> {
        tracing::debug!(path = %self.path.display(), "loading configuration");

        let decoded = if self.storage.exists(&self.path) {
            let text = self
                .storage
                .read_text(&self.path)
                .map_err(|source| ConfigError::Read {
                    path: self.path.clone(),
                    source,
                })?;
            match self.validator.parse_with(self.parser.as_ref(), &text) {
                Ok(value) => Some(value),
                Err(ConfigError::Decode(source)) => {
                    tracing::warn!(path = %self.path.display(), error = %source, "configuration is not decodable");
                    return Err(ConfigError::Unparsable {
                        path: self.path.clone(),
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), "stored configuration is invalid, keeping the held value");
                    return Err(err);
                }
            }
        } else {
            tracing::debug!(path = %self.path.display(), "no stored configuration, using the declared default");
            self.validator.default_value().cloned()
        };

        if let Some(message) = self.validator.fail_opt(decoded.as_ref()) {
            return Err(ConfigError::Invalid(message));
        }
        self.data = decoded;
        Ok(())
    }

    pub fn fail_load(&mut self) -> Option<String> {
        self.load().err().map(|e| e.to_string())
    }

    /// Write the held value, or remove the file when there is nothing to keep
    pub fn save(&self, keep_empty_file: bool) -> Result<()> {
        let empty = match &self.data {
            None => true,
            Some(Value::Object(map)) => map.is_empty() && self.is_object_like(),
            Some(_) => false,
        };

        if empty && !keep_empty_file {
            if self.storage.exists(&self.path) {
                self.storage
                    .delete_file(&self.path)
                    .map_err(|source| ConfigError::Remove {
                        path: self.path.clone(),
                        source,
                    })?;
                tracing::info!(path = %self.path.display(), "removed empty configuration");
            }
            return Ok(());
        }

        let value = match &self.data {
            Some(value) => value.clone(),
            None if self.validator.is_object_shaped() => Value::Object(Map::new()),
            None => return Ok(()),
        };
        let text = self.validator.stringify_with(self.parser.as_ref(), &value)?;
        self.storage
            .write_text(&self.path, &text)
            .map_err(|source| ConfigError::Write {
                path: self.path.clone(),
                source,
            })?;
        tracing::info!(path = %self.path.display(), "saved configuration");
        Ok(())
    }

    pub fn fail_save(&self, keep_empty_file: bool) -> Option<String> {
        self.save(keep_empty_file).err().map(|e| e.to_string())
    }

    // =========================================================================
    // Key access
    // =========================================================================

    /// Struct- or map-shaped type whose held value satisfies it
    pub fn is_object_like(&self) -> bool {
        self.validator.is_object_shaped() && self.validator.fail_opt(self.data.as_ref()).is_none()
    }

    fn require_object_like(&self, operation: &'static str, key: Option<&str>) -> Result<()> {
        let reason = if !self.validator.is_object_shaped() {
            format!(
                "Type {} is neither a struct nor an object.",
                self.validator.type_name()
            )
        } else if let Some(message) = self.validator.fail_opt(self.data.as_ref()) {
            message
        } else {
            return Ok(());
        };
        Err(ConfigError::NotObjectLike {
            operation,
            key: key.map(str::to_string),
            reason,
        })
    }

    fn object(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().and_then(Value::as_object)
    }

    fn resolve(&self, key: &str) -> Resolved {
        if let Some(shape) = self.validator.as_struct() {
            let empty = Map::new();
            return shape.resolve(self.object().unwrap_or(&empty), key);
        }
        Resolved {
            validator: self.validator.value_type().cloned(),
            info: None,
        }
    }

    fn lookup(&self, key: &str, mode: Mode) -> Option<Value> {
        let stored = || self.object().and_then(|map| map.get(key)).cloned();
        let default = || {
            self.resolve(key)
                .validator
                .and_then(|v| v.default_value().cloned())
        };
        match mode {
            Mode::Current => stored(),
            Mode::Default => default(),
            Mode::Real => stored().or_else(default),
        }
    }

    /// Validator governing `key`
    pub fn validator_for(&self, key: &str) -> Result<Validator> {
        self.require_object_like("resolve", Some(key))?;
        let resolved = self.resolve(key);
        resolved.validator.ok_or_else(|| ConfigError::UnexpectedKey {
            key: key.to_string(),
            info: resolved.info,
        })
    }

    pub fn get(&self, key: &str, mode: Mode) -> Result<Option<Value>> {
        self.require_object_like("get", Some(key))?;
        Ok(self.lookup(key, mode))
    }

    /// Why [`get`](Self::get) would fail, if it would
    pub fn fail_get(&self, key: &str, mode: Mode) -> Option<String> {
        self.get(key, mode).err().map(|e| e.to_string())
    }

    /// Store `value` under `key`
    ///
    /// The value must satisfy the key's validator and the resulting record
    /// must still satisfy the config's validator.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let validator = self.validator_for(key).map_err(|err| match err {
            ConfigError::NotObjectLike { key, reason, .. } => ConfigError::NotObjectLike {
                operation: "set",
                key,
                reason,
            },
            other => other,
        })?;
        if let Some(reason) = validator.fail(&value) {
            tracing::debug!(key, "rejected value");
            return Err(ConfigError::BadValue {
                key: key.to_string(),
                value: format_value(Some(&value)),
                reason,
            });
        }

        let mut object = self.object().cloned().unwrap_or_default();
        object.insert(key.to_string(), value.clone());
        let candidate = Value::Object(object);
        // Sibling rules (required keys, dynamic properties) see the whole record.
        if let Some(reason) = self.validator.fail(&candidate) {
            tracing::debug!(key, "rejected record");
            return Err(ConfigError::BadValue {
                key: key.to_string(),
                value: format_value(Some(&value)),
                reason,
            });
        }
        self.data = Some(candidate);
        tracing::debug!(key, "set configuration key");
        Ok(())
    }

    pub fn fail_set(&mut self, key: &str, value: Value) -> Option<String> {
        self.set(key, value).err().map(|e| e.to_string())
    }

    /// Remove `key`, or every stored key when `None`
    ///
    /// Nothing is removed unless every requested removal keeps the value
    /// valid; all offending keys are reported together.
    pub fn unset(&mut self, key: Option<&str>) -> Result<()> {
        self.require_object_like("unset", key)?;
        let Some(object) = self.object() else {
            return Ok(());
        };

        let keys: Vec<String> = match key {
            Some(key) if object.contains_key(key) => vec![key.to_string()],
            Some(_) => return Ok(()),
            None => object.keys().cloned().collect(),
        };

        let mut failed = Vec::new();
        let mut reasons = Vec::new();
        for key in &keys {
            let mut candidate = object.clone();
            candidate.remove(key);
            if let Some(reason) = self.validator.fail(&Value::Object(candidate)) {
                failed.push(key.clone());
                reasons.push(reason);
            }
        }
        if !failed.is_empty() {
            tracing::debug!(keys = ?failed, "refused to unset keys");
            return Err(ConfigError::Unset {
                keys: failed,
                reasons,
            });
        }

        let mut remaining = object.clone();
        for key in &keys {
            remaining.remove(key);
        }
        let remaining = Value::Object(remaining);
        if let Some(reason) = self.validator.fail(&remaining) {
            return Err(ConfigError::Unset {
                keys,
                reasons: vec![reason],
            });
        }
        self.data = Some(remaining);
        tracing::debug!(keys = ?keys, "unset configuration keys");
        Ok(())
    }

    pub fn fail_unset(&mut self, key: Option<&str>) -> Option<String> {
        self.unset(key).err().map(|e| e.to_string())
    }

    /// Keys visible in `mode`
    ///
    /// `current` lists stored keys. `real` and `default` list the struct
    /// properties that have a value in that mode; map-shaped types have no
    /// property list and use `current` instead.
    pub fn key_list(&self, mode: Mode) -> Result<Vec<String>> {
        self.require_object_like("list keys", None)?;
        let current = || -> Vec<String> {
            self.object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default()
        };
        let Some(shape) = self.validator.as_struct() else {
            return Ok(current());
        };
        Ok(match mode {
            Mode::Current => current(),
            Mode::Real | Mode::Default => shape
                .properties()
                .filter(|(key, _)| self.lookup(key, mode).is_some())
                .map(|(key, _)| key.to_string())
                .collect(),
        })
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Render `keys`, or every key visible in `options.mode` when `None`
    ///
    /// In `real` mode the listing also includes stored keys held under
    /// dynamic properties, which [`key_list`](Self::key_list) leaves out.
    pub fn get_printable(&self, keys: Option<&[String]>, options: &PrintOptions) -> Result<String> {
        let highlighter = self.highlighter.as_deref();
        if keys.is_none() && !self.is_object_like() {
            return Ok(print::render_value(
                &self.validator.type_name(),
                self.data.as_ref(),
                options,
                highlighter,
            ));
        }

        let keys = match keys {
            Some(keys) => keys.to_vec(),
            None => {
                let mut listed = self.key_list(options.mode)?;
                if options.mode == Mode::Real {
                    for key in self.key_list(Mode::Current)? {
                        if !listed.contains(&key) {
                            listed.push(key);
                        }
                    }
                }
                listed
            }
        };
        let rows = keys
            .into_iter()
            .map(|key| {
                let value = self.get(&key, options.mode)?;
                let type_name = self
                    .resolve(&key)
                    .validator
                    .map(|v| v.type_name())
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(Row {
                    key,
                    type_name,
                    value,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(print::render_rows(&rows, options, highlighter))
    }
}
