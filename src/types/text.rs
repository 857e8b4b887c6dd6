//! String and date leaf rules

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde_json::Value;

use super::{format_value, mismatch};

/// Extra constraint on a string
#[derive(Clone)]
pub enum StringPattern {
    Regex(Regex),
    /// Returns an extra error fragment when the string is rejected
    Check(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>),
}

impl StringPattern {
    pub fn check(f: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Check(Arc::new(f))
    }
}

/// Options for [`string`](super::string)
#[derive(Clone, Default)]
pub struct StringOptions {
    pub pattern: Option<StringPattern>,
}

impl StringOptions {
    pub fn regex(re: Regex) -> Self {
        Self {
            pattern: Some(StringPattern::Regex(re)),
        }
    }

    pub fn check(f: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            pattern: Some(StringPattern::check(f)),
        }
    }
}

#[derive(Clone)]
pub(crate) struct StringRule {
    pattern: Option<StringPattern>,
}

impl StringRule {
    pub(crate) fn new(options: StringOptions) -> Self {
        Self {
            pattern: options.pattern,
        }
    }

    pub(crate) fn fail(&self, type_name: &str, value: &Value) -> Option<String> {
        let Value::String(text) = value else {
            return Some(mismatch(type_name, Some(value)));
        };
        match &self.pattern {
            Some(StringPattern::Regex(re)) if !re.is_match(text) => Some(format!(
                "Expected {type_name} matching /{re}/, got {}.",
                format_value(Some(value))
            )),
            Some(StringPattern::Check(check)) => check(text).map(|fragment| {
                format!("{} {fragment}", mismatch(type_name, Some(value)))
            }),
            _ => None,
        }
    }
}

/// Parse the date forms accepted by the `date` validator
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn fail_date(type_name: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(text) if parse_date(text).is_some() => None,
        _ => Some(mismatch(type_name, Some(value))),
    }
}

/// Canonical RFC 3339 UTC form, e.g. `2024-01-02T03:04:05.000Z`
pub(crate) fn normalize_date(value: Value) -> Value {
    let normalized = value
        .as_str()
        .and_then(parse_date)
        .map(|date| Value::String(date.to_rfc3339_opts(SecondsFormat::Millis, true)));
    normalized.unwrap_or(value)
}
