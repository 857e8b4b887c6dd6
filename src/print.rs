//! Presentation of configuration values
//!
//! Purely cosmetic: the output is meant for people (aligned columns) or for
//! shell scripts (`parsable`), never for decoding back into a value.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Mode;
use crate::types::format_value;

/// Text to text decorator applied to printed values
pub trait Highlighter: fmt::Debug + Send + Sync {
    fn highlight(&self, text: &str) -> String;
}

/// Colours JSON strings, numbers and keywords with ANSI escapes
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiHighlighter;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";

impl Highlighter for AnsiHighlighter {
    fn highlight(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() * 2);
        let mut chars = text.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            match c {
                '"' => {
                    let mut end = text.len();
                    let mut escaped = false;
                    for (i, c) in chars.by_ref() {
                        if escaped {
                            escaped = false;
                        } else if c == '\\' {
                            escaped = true;
                        } else if c == '"' {
                            end = i + 1;
                            break;
                        }
                    }
                    paint(&mut out, GREEN, &text[start..end]);
                }
                '-' | '0'..='9' => {
                    let mut end = start + 1;
                    while let Some(&(i, c)) = chars.peek() {
                        if !(c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-')) {
                            break;
                        }
                        end = i + 1;
                        chars.next();
                    }
                    paint(&mut out, YELLOW, &text[start..end]);
                }
                c if c.is_ascii_alphabetic() => {
                    let mut end = start + 1;
                    while let Some(&(i, c)) = chars.peek() {
                        if !c.is_ascii_alphabetic() {
                            break;
                        }
                        end = i + 1;
                        chars.next();
                    }
                    let word = &text[start..end];
                    if matches!(word, "true" | "false" | "null" | "undefined") {
                        paint(&mut out, MAGENTA, word);
                    } else {
                        out.push_str(word);
                    }
                }
                c => out.push(c),
            }
        }
        out
    }
}

fn paint(out: &mut String, color: &str, text: &str) {
    out.push_str(color);
    out.push_str(text);
    out.push_str(RESET);
}

/// How [`Config::get_printable`](crate::Config::get_printable) renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintOptions {
    /// Which value to show for each key
    pub mode: Mode,
    /// Include each key's type name
    pub types: bool,
    /// Space separated lines without padding or colour
    pub parsable: bool,
    /// Decorate values with the configured highlighter
    pub color: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Real,
            types: false,
            parsable: false,
            color: true,
        }
    }
}

/// One printed key
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub key: String,
    pub type_name: String,
    pub value: Option<Value>,
}

pub(crate) fn render_rows(
    rows: &[Row],
    options: &PrintOptions,
    highlighter: Option<&dyn Highlighter>,
) -> String {
    if options.parsable {
        return render_parsable(rows, options);
    }

    let key_width = rows.iter().map(|r| r.key.chars().count()).max().unwrap_or(0);
    let type_width = rows
        .iter()
        .map(|r| r.type_name.chars().count())
        .max()
        .unwrap_or(0);

    rows.iter()
        .map(|row| {
            let value = decorate(&format_value(row.value.as_ref()), options, highlighter);
            if options.types {
                format!(
                    "{:<key_width$}  {:<type_width$}  {value}",
                    row.key, row.type_name
                )
            } else {
                format!("{:<key_width$}  {value}", row.key)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_parsable(rows: &[Row], options: &PrintOptions) -> String {
    let single = rows.len() == 1;
    rows.iter()
        .map(|row| {
            let mut fields = Vec::with_capacity(3);
            if !single {
                fields.push(row.key.clone());
            }
            if options.types {
                fields.push(row.type_name.clone());
            }
            fields.push(format_value(row.value.as_ref()));
            fields.join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Whole value of a configuration that has no key structure
pub(crate) fn render_value(
    type_name: &str,
    value: Option<&Value>,
    options: &PrintOptions,
    highlighter: Option<&dyn Highlighter>,
) -> String {
    let text = if options.parsable {
        format_value(value)
    } else {
        match value {
            Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            None => format_value(None),
        }
    };
    let text = if options.parsable {
        text
    } else {
        decorate(&text, options, highlighter)
    };
    if options.types {
        format!("{type_name} {text}")
    } else {
        text
    }
}

fn decorate(text: &str, options: &PrintOptions, highlighter: Option<&dyn Highlighter>) -> String {
    match highlighter {
        Some(highlighter) if options.color => highlighter.highlight(text),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Row> {
        vec![
            Row {
                key: "host".to_string(),
                type_name: "string".to_string(),
                value: Some(json!("localhost")),
            },
            Row {
                key: "port".to_string(),
                type_name: "?integer".to_string(),
                value: None,
            },
        ]
    }

    #[test]
    fn test_aligned_rows() {
        let options = PrintOptions {
            types: true,
            color: false,
            ..PrintOptions::default()
        };
        assert_eq!(
            render_rows(&rows(), &options, None),
            "host  string    \"localhost\"\nport  ?integer  undefined"
        );
    }

    #[test]
    fn test_parsable_rows() {
        let options = PrintOptions {
            parsable: true,
            ..PrintOptions::default()
        };
        assert_eq!(
            render_rows(&rows(), &options, Some(&AnsiHighlighter)),
            "host \"localhost\"\nport undefined"
        );
        assert_eq!(render_rows(&rows()[..1], &options, None), "\"localhost\"");
    }

    #[test]
    fn test_highlighter_applies_only_with_color() {
        let options = PrintOptions::default();
        let text = render_rows(&rows()[..1], &options, Some(&AnsiHighlighter));
        assert_eq!(text, format!("host  {GREEN}\"localhost\"{RESET}"));

        let plain = PrintOptions {
            color: false,
            ..options
        };
        assert_eq!(render_rows(&rows()[..1], &plain, Some(&AnsiHighlighter)), "host  \"localhost\"");
    }

    #[test]
    fn test_ansi_highlighter_tokens() {
        let text = AnsiHighlighter.highlight(r#"{"a":[1,-2.5e3,true,null,"q\"x"]}"#);
        assert!(text.contains(&format!("{GREEN}\"a\"{RESET}")));
        assert!(text.contains(&format!("{YELLOW}-2.5e3{RESET}")));
        assert!(text.contains(&format!("{MAGENTA}true{RESET}")));
        assert!(text.contains(&format!("{GREEN}\"q\\\"x\"{RESET}")));
    }
}
