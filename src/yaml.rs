//! Block-style YAML emitter over `Value`.
//!
//! Why this exists:
//! - Mapping keys may be any value, including sequences and mappings.
//! - Insertion order must survive.
//! - The indent width is configurable, and sequences nested under a key are indented.
//!
//! Design:
//! - Collections are written in block style, one entry per line. Empty collections and
//!   compound mapping keys use flow style (`[]`, `{}`, `[a, b]: ..`).
//! - Strings stay plain when they cannot be misread as another type or as syntax. Anything
//!   else is written double-quoted with YAML escapes.
//! - Keys too long for the implicit `key: value` form use the explicit `? key` form.
//! - Bytes are written as `!!binary` base64.
//! - Every document ends with a newline.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::value::{Map, Value};

const DEFAULT_INDENT_WIDTH: usize = 2;

/// Separator written between documents of a multi-document stream.
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Encode `value` as YAML, treating a top-level sequence as a stream of documents.
///
/// Each element of a top-level sequence becomes its own document; documents are separated
/// by `---`. An empty top-level sequence yields no output.
pub fn encode_documents(value: &Value, indent_width: usize) -> Result<String> {
    match value {
        Value::List(items) => {
            let mut out = String::new();
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(DOCUMENT_SEPARATOR);
                }
                out.push_str(&encode_document(item, indent_width)?);
            }
            Ok(out)
        }
        other => encode_document(other, indent_width),
    }
}

/// Encode `value` as a single YAML document.
///
/// A width of 0 uses the default of 2. A width of 1 cannot express nested sequences and is
/// rejected.
pub fn encode_document(value: &Value, indent_width: usize) -> Result<String> {
    let width = match indent_width {
        0 => DEFAULT_INDENT_WIDTH,
        1 => {
            return Err(Error::encode(
                Format::Yaml,
                "an indent width of 1 is not supported",
            ));
        }
        n => n,
    };

    let mut emitter = Emitter {
        out: String::new(),
        width,
    };
    match value {
        Value::Map(map) if !map.is_empty() => emitter.map(map, 0, false),
        Value::List(items) if !items.is_empty() => emitter.list(items, 0, false),
        scalar => {
            emitter.out.push_str(&flow(scalar));
            emitter.out.push('\n');
        }
    }
    Ok(emitter.out)
}

// Longest key a parser accepts in the implicit `key: value` form.
const MAX_IMPLICIT_KEY: usize = 1024;

struct Emitter {
    out: String,
    width: usize,
}

impl Emitter {
    // `inline_first` means the cursor already sits where the first entry belongs, right
    // after a sequence marker.
    fn map(&mut self, map: &Map, indent: usize, inline_first: bool) {
        for (idx, (key, value)) in map.iter().enumerate() {
            if idx > 0 || !inline_first {
                self.pad(indent);
            }
            let key = key_text(key);
            if key.len() > MAX_IMPLICIT_KEY || key.contains('\n') {
                self.out.push_str("? ");
                self.out.push_str(&key);
                self.out.push('\n');
                self.pad(indent);
            } else {
                self.out.push_str(&key);
            }
            self.out.push(':');
            match value {
                Value::Map(inner) if !inner.is_empty() => {
                    self.out.push('\n');
                    self.map(inner, indent + self.width, false);
                }
                Value::List(items) if !items.is_empty() => {
                    self.out.push('\n');
                    self.list(items, indent + self.width, false);
                }
                scalar => {
                    self.out.push(' ');
                    self.out.push_str(&flow(scalar));
                    self.out.push('\n');
                }
            }
        }
    }

    fn list(&mut self, items: &[Value], indent: usize, inline_first: bool) {
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 || !inline_first {
                self.pad(indent);
            }
            self.out.push('-');
            self.pad(self.width - 1);
            let inner = indent + self.width;
            match item {
                Value::Map(map) if !map.is_empty() => self.map(map, inner, true),
                Value::List(nested) if !nested.is_empty() => self.list(nested, inner, true),
                scalar => {
                    self.out.push_str(&flow(scalar));
                    self.out.push('\n');
                }
            }
        }
    }

    fn pad(&mut self, n: usize) {
        self.out.extend(std::iter::repeat_n(' ', n));
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::Float(f) if f.is_nan() => ".nan".to_string(),
        other => flow(other),
    }
}

// Render a value on a single line. Scalars use their block-context form; collections use
// flow style.
fn flow(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Unsigned(u) => u.to_string(),
        Value::Float(f) => float_text(*f),
        Value::String(s) => string_text(s, false),
        Value::Bytes(b) => format!("!!binary {}", BASE64.encode(b)),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(flow_item).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("{}: {}", flow_item(key), flow_item(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

// Inside `[..]` and `{..}` strings must also avoid flow indicators.
fn flow_item(value: &Value) -> String {
    match value {
        Value::String(s) => string_text(s, true),
        other => flow(other),
    }
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        ".nan".to_string()
    } else if f == f64::INFINITY {
        ".inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else if f.fract() == 0.0 {
        if f.abs() < 1e16 {
            format!("{f:.1}")
        } else {
            format!("{f:e}")
        }
    } else {
        f.to_string()
    }
}

fn string_text(s: &str, in_flow: bool) -> String {
    if is_plain_safe(s, in_flow) {
        s.to_string()
    } else {
        double_quoted(s)
    }
}

// YAML treats NEL, LS and PS as line breaks, so they are escaped along with the C0 and C1
// controls.
fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{85}' => out.push_str("\\N"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if needs_escape(c) => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn needs_escape(c: char) -> bool {
    c.is_control() || matches!(c, '\u{feff}' | '\u{fffe}' | '\u{ffff}')
}

const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

const FLOW_INDICATORS: &[char] = &[',', '[', ']', '{', '}'];

const RESERVED: &[&str] = &[
    "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", "<<", "=", ".inf",
    "-.inf", "+.inf", ".nan",
];

fn is_plain_safe(s: &str, in_flow: bool) -> bool {
    let Some(first) = s.chars().next() else {
        return false;
    };
    if INDICATORS.contains(&first) || first.is_ascii_digit() || first == '+' || first == '.' {
        return false;
    }
    if s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace) {
        return false;
    }
    if s.ends_with(':') || s.contains(": ") || s.contains(" #") {
        return false;
    }
    if in_flow && s.contains(FLOW_INDICATORS) {
        return false;
    }
    if s.chars().any(|c| needs_escape(c) || matches!(c, '\u{2028}' | '\u{2029}')) {
        return false;
    }
    !RESERVED.iter().any(|r| s.eq_ignore_ascii_case(r))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        let mut nested = Map::new();
        nested.insert("k", Value::Null);
        let mut map = Map::new();
        map.insert("name", "demo");
        map.insert(
            "items",
            vec![Value::from(1), Value::from("two"), Value::from(true)],
        );
        map.insert("nested", nested);
        Value::Map(map)
    }

    #[test]
    fn block_style_indents_sequences_under_keys() -> anyhow::Result<()> {
        assert_eq!(
            encode_document(&sample(), 2)?,
            "name: demo\nitems:\n  - 1\n  - two\n  - true\nnested:\n  k: null\n"
        );
        Ok(())
    }

    #[test]
    fn wider_indent_pads_sequence_markers() -> anyhow::Result<()> {
        let mut item = Map::new();
        item.insert("a", 1);
        item.insert("b", 2);
        let mut map = Map::new();
        map.insert("items", vec![Value::Map(item)]);
        assert_eq!(
            encode_document(&Value::Map(map), 4)?,
            "items:\n    -   a: 1\n        b: 2\n"
        );
        Ok(())
    }

    #[test]
    fn top_level_sequences_become_documents() -> anyhow::Result<()> {
        let mut map = Map::new();
        map.insert("k", "v");
        let docs = Value::List(vec![Value::from(1), Value::from("a"), Value::Map(map)]);
        assert_eq!(encode_documents(&docs, 2)?, "1\n---\na\n---\nk: v\n");
        assert_eq!(encode_documents(&Value::List(vec![]), 2)?, "");
        Ok(())
    }

    #[test]
    fn nested_sequences_stay_inline_after_markers() -> anyhow::Result<()> {
        let value = Value::List(vec![Value::List(vec![Value::from(1), Value::from(2)])]);
        assert_eq!(encode_document(&value, 2)?, "- - 1\n  - 2\n");
        Ok(())
    }

    #[test]
    fn ambiguous_strings_are_quoted() -> anyhow::Result<()> {
        let value = Value::List(
            ["true", "123", "a: b", "", " pad", "-x", "line\nbreak", "plain text"]
                .into_iter()
                .map(Value::from)
                .collect(),
        );
        assert_eq!(
            encode_document(&value, 2)?,
            "- \"true\"\n- \"123\"\n- \"a: b\"\n- \"\"\n- \" pad\"\n- \"-x\"\n\
             - \"line\\nbreak\"\n- plain text\n"
        );
        Ok(())
    }

    #[test]
    fn output_parses_back_to_the_same_value() -> anyhow::Result<()> {
        let mut map = match sample() {
            Value::Map(map) => map,
            _ => unreachable!(),
        };
        map.insert(7, 1.0);
        map.insert("empty", Value::List(vec![]));
        map.insert("quoted", "yes");
        let value = Value::Map(map);

        let text = encode_document(&value, 2)?;
        let parsed: Value = serde_yaml_ng::from_str(&text)?;
        assert_eq!(parsed, value);
        Ok(())
    }

    #[test]
    fn unicode_line_breaks_are_escaped() -> anyhow::Result<()> {
        let strings = [
            "a\u{2028}b",
            "c\u{2029}",
            "\u{85}d",
            "tab\there",
            "bom\u{feff}",
            "back\\slash \"quote\"",
        ];
        let mut map = Map::new();
        map.insert("key\u{2028}with break", "v");
        let mut items: Vec<Value> = strings.into_iter().map(Value::from).collect();
        items.push(Value::Map(map));
        let value = Value::List(items);

        let text = encode_document(&value, 2)?;
        assert!(!text.contains(['\u{85}', '\u{2028}', '\u{2029}']));
        assert!(text.starts_with("- \"a\\Lb\"\n- \"c\\P\"\n- \"\\Nd\"\n"));
        let parsed: Value = serde_yaml_ng::from_str(&text)?;
        assert_eq!(parsed, value);
        Ok(())
    }

    #[test]
    fn long_keys_use_the_explicit_form() -> anyhow::Result<()> {
        let long = "k".repeat(2000);
        let mut inner = Map::new();
        inner.insert("x", 1);
        let mut map = Map::new();
        map.insert(long.as_str(), "v");
        map.insert("short", "w");
        map.insert("k".repeat(1500), Value::Map(inner));
        let value = Value::Map(map);

        let text = encode_document(&value, 2)?;
        assert!(text.starts_with(&format!("? {long}\n: v\nshort: w\n? ")));
        let parsed: Value = serde_yaml_ng::from_str(&text)?;
        assert_eq!(parsed, value);

        let nested = Value::List(vec![Value::Map(
            [(long.as_str(), "v")].into_iter().collect(),
        )]);
        assert_eq!(encode_document(&nested, 2)?, format!("- ? {long}\n  : v\n"));
        Ok(())
    }

    #[test]
    fn compound_keys_use_flow_style() -> anyhow::Result<()> {
        let mut inner = Map::new();
        inner.insert("a, b", 1);
        let mut map = Map::new();
        map.insert(Value::List(vec![1.into(), "x".into()]), "seq");
        map.insert(Value::Map(inner), "map");
        assert_eq!(
            encode_document(&Value::Map(map), 2)?,
            "[1, x]: seq\n{\"a, b\": 1}: map\n"
        );
        Ok(())
    }

    #[test]
    fn special_scalars() -> anyhow::Result<()> {
        let value = Value::List(vec![
            Value::Float(f64::NAN),
            Value::Float(f64::NEG_INFINITY),
            Value::Float(2.0),
            Value::bytes(*b"hi"),
            Value::Map(Map::new()),
        ]);
        assert_eq!(
            encode_document(&value, 2)?,
            "- .nan\n- -.inf\n- 2.0\n- !!binary aGk=\n- {}\n"
        );
        Ok(())
    }

    #[test]
    fn indent_width_one_is_an_encode_error() {
        let err = encode_document(&sample(), 1).unwrap_err();
        assert!(matches!(err, Error::Encode { format: Format::Yaml, .. }));
    }

    #[test]
    fn indent_width_zero_uses_default() -> anyhow::Result<()> {
        assert_eq!(encode_document(&sample(), 0)?, encode_document(&sample(), 2)?);
        Ok(())
    }
}
