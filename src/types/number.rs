//! Numeric leaf rules shared by `number` and `integer`

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use super::mismatch;

/// Largest integer an IEEE-754 double represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Extra constraint on a number
#[derive(Clone)]
pub enum NumberPattern {
    /// Must match the number's text form
    Regex(Regex),
    /// Receives the number and its text form; returns an extra error fragment
    Check(Arc<dyn Fn(f64, &str) -> Option<String> + Send + Sync>),
}

impl NumberPattern {
    pub fn check(f: impl Fn(f64, &str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self::Check(Arc::new(f))
    }
}

/// Options for [`number`](super::number) and [`integer`](super::integer)
#[derive(Clone, Default)]
pub struct NumberOptions {
    /// Inclusive lower bound, unbounded when unset
    pub min: Option<f64>,
    /// Inclusive upper bound, unbounded when unset
    pub max: Option<f64>,
    pub pattern: Option<NumberPattern>,
}

impl NumberOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.min(min).max(max)
    }

    pub fn pattern(mut self, pattern: NumberPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

#[derive(Clone)]
pub(crate) struct NumberRule {
    min: f64,
    max: f64,
    min_set: bool,
    max_set: bool,
    integer: bool,
    pattern: Option<NumberPattern>,
}

impl NumberRule {
    pub(crate) fn new(options: NumberOptions, integer: bool) -> Self {
        Self {
            min: options.min.unwrap_or(f64::MIN),
            max: options.max.unwrap_or(f64::MAX),
            min_set: options.min.is_some(),
            max_set: options.max.is_some(),
            integer,
            pattern: options.pattern,
        }
    }

    /// Range and whole-value test against the caller's raw bounds.
    ///
    /// Infinities pass only on a side whose bound was left unset.
    pub(crate) fn admits(&self, n: f64) -> bool {
        let above = n >= self.min || (n == f64::NEG_INFINITY && !self.min_set);
        let below = n <= self.max || (n == f64::INFINITY && !self.max_set);
        let whole = !self.integer || (n.is_finite() && n.fract() == 0.0);
        above && below && whole
    }

    /// Bounds as shown in messages, always clamped to the safe-integer range
    pub(crate) fn displayed_bounds(&self) -> (String, String) {
        (
            format_number(self.min.max(-MAX_SAFE_INTEGER)),
            format_number(self.max.min(MAX_SAFE_INTEGER)),
        )
    }

    pub(crate) fn fail(&self, type_name: &str, value: &Value) -> Option<String> {
        let Some(n) = value.as_f64() else {
            return Some(mismatch(type_name, Some(value)));
        };
        self.fail_number(type_name, n)
    }

    pub(crate) fn fail_number(&self, type_name: &str, n: f64) -> Option<String> {
        let text = format_number(n);
        let (lo, hi) = self.displayed_bounds();
        let mut expected = format!("{type_name} between {lo} and {hi}");
        let mut failed = !self.admits(n);
        let mut fragment = None;

        match &self.pattern {
            Some(NumberPattern::Regex(re)) => {
                expected.push_str(&format!(" matching /{re}/"));
                failed |= !re.is_match(&text);
            }
            Some(NumberPattern::Check(check)) => {
                fragment = check(n, &text);
                failed |= fragment.is_some();
            }
            None => {}
        }

        if !failed {
            return None;
        }
        let mut message = format!("Expected {expected}, got {text}.");
        if let Some(fragment) = fragment {
            message.push(' ');
            message.push_str(&fragment);
        }
        Some(message)
    }
}

/// Render a number the way a JSON reader expects (`1` rather than `1.0`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() > MAX_SAFE_INTEGER || n.abs() < 1e-6 {
        format!("{n:e}")
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
