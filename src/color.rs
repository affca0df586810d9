//! ANSI colorization for terminal output.
//!
//! Both colorizers are pure: they take a value or already-serialized text and return styled
//! text. The dispatcher applies them exactly once, after plain serialization.
//!
//! Palette: map keys green, strings blue, numbers magenta, booleans cyan, JSON null cyan,
//! YAML anchors red, YAML aliases yellow. Punctuation is left unstyled.

use colored::Color;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::value::{Map, Value};

const COLOR_KEY: Color = Color::Green;
const COLOR_STRING: Color = Color::Blue;
const COLOR_NUMBER: Color = Color::Magenta;
const COLOR_BOOL: Color = Color::Cyan;
const COLOR_NULL: Color = Color::Cyan;
const COLOR_ANCHOR: Color = Color::Red;
const COLOR_ALIAS: Color = Color::Yellow;

/// Render `value` as pretty JSON with ANSI colors, indenting by `indent_spaces` per level.
///
/// Without the escapes the text equals the plain pretty encoding with the same indent.
/// No trailing newline is added.
pub fn colorize_json(value: &Value, indent_spaces: usize) -> Result<String> {
    let mut out = String::new();
    let mut printer = JsonPrinter {
        indent: " ".repeat(indent_spaces),
        out: &mut out,
    };
    printer.value(value, 0)?;
    Ok(out)
}

struct JsonPrinter<'a> {
    indent: String,
    out: &'a mut String,
}

impl JsonPrinter<'_> {
    fn value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => push_colored("null", COLOR_NULL, self.out),
            Value::Bool(b) => push_colored(if *b { "true" } else { "false" }, COLOR_BOOL, self.out),
            Value::Integer(i) => push_colored(&i.to_string(), COLOR_NUMBER, self.out),
            Value::Unsigned(u) => push_colored(&u.to_string(), COLOR_NUMBER, self.out),
            Value::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => push_colored(&n.to_string(), COLOR_NUMBER, self.out),
                // Same substitution the plain encoder makes.
                None => push_colored("null", COLOR_NULL, self.out),
            },
            Value::String(s) => push_colored(&serde_json::to_string(s)?, COLOR_STRING, self.out),
            Value::Bytes(bytes) => {
                let items: Vec<Value> = bytes.iter().map(|b| Value::from(*b)).collect();
                self.list(&items, depth)?;
            }
            Value::List(items) => self.list(items, depth)?,
            Value::Map(map) => self.map(map, depth)?,
        }
        Ok(())
    }

    fn list(&mut self, items: &[Value], depth: usize) -> Result<()> {
        if items.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }
        self.out.push('[');
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            self.value(item, depth + 1)?;
        }
        self.newline(depth);
        self.out.push(']');
        Ok(())
    }

    fn map(&mut self, map: &Map, depth: usize) -> Result<()> {
        if map.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push('{');
        for (idx, (key, value)) in map.iter().enumerate() {
            if idx > 0 {
                self.out.push(',');
            }
            self.newline(depth + 1);
            push_colored(&json_key(key)?, COLOR_KEY, self.out);
            self.out.push_str(": ");
            self.value(value, depth + 1)?;
        }
        self.newline(depth);
        self.out.push('}');
        Ok(())
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        for _ in 0..depth {
            self.out.push_str(&self.indent);
        }
    }
}

// JSON keys must be strings; numeric and boolean keys are quoted the way the plain encoder
// quotes them.
fn json_key(key: &Value) -> Result<String> {
    let text = match key {
        Value::String(s) => s.clone(),
        Value::Integer(_) | Value::Unsigned(_) | Value::Float(_) | Value::Bool(_) => {
            key.key_text()?
        }
        other => {
            return Err(Error::encode(
                Format::Json,
                format!("key must be a string, got {}", other.kind()),
            ));
        }
    };
    Ok(serde_json::to_string(&text)?)
}

/// Re-emit YAML text with ANSI colors per token class.
///
/// Works line by line on block-style YAML: sequence markers and punctuation are kept, map
/// keys, scalars, anchors and aliases are styled. Block scalar bodies are styled as strings.
/// The result ends with exactly one newline.
pub fn colorize_yaml(code: &str) -> String {
    let mut out = String::with_capacity(code.len() * 2);
    let mut block_parent: Option<usize> = None;

    for line in code.trim_end_matches('\n').split('\n') {
        let body = line.trim_start_matches(' ');
        let indent = line.len() - body.len();

        if let Some(parent) = block_parent {
            if body.is_empty() || indent > parent {
                out.push_str(&line[..indent]);
                if !body.is_empty() {
                    push_colored(body, COLOR_STRING, &mut out);
                }
                out.push('\n');
                continue;
            }
            block_parent = None;
        }

        out.push_str(&line[..indent]);
        if colorize_yaml_line(body, &mut out) {
            block_parent = Some(indent);
        }
        out.push('\n');
    }
    out
}

// Returns true when the line opens a block scalar (`|` or `>`).
fn colorize_yaml_line(body: &str, out: &mut String) -> bool {
    if body.is_empty()
        || body.starts_with('#')
        || body == "..."
        || body == "---"
        || body.starts_with("--- ")
    {
        out.push_str(body);
        return false;
    }

    let mut rest = body;
    loop {
        if rest == "-" || rest == "?" || rest == ":" {
            out.push_str(rest);
            return false;
        }
        let Some(after) = rest
            .strip_prefix("- ")
            .or_else(|| rest.strip_prefix("? "))
            .or_else(|| rest.strip_prefix(": "))
        else {
            break;
        };
        out.push_str(&rest[..2]);
        let trimmed = after.trim_start_matches(' ');
        out.push_str(&after[..after.len() - trimmed.len()]);
        rest = trimmed;
    }

    let value = match split_key(rest) {
        Some((key, value)) => {
            push_colored(key, COLOR_KEY, out);
            out.push(':');
            let trimmed = value.trim_start_matches(' ');
            out.push_str(&value[..value.len() - trimmed.len()]);
            trimmed
        }
        None => rest,
    };
    colorize_scalar(value, out)
}

// Find the `key: value` split outside quotes and flow collections.
fn split_key(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut idx = 0;
    while idx < bytes.len() {
        let b = bytes[idx];
        match quote {
            Some(b'"') if b == b'\\' => idx += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'[' | b'{' => depth += 1,
                b']' | b'}' => depth = depth.saturating_sub(1),
                b'#' if idx > 0 && bytes[idx - 1] == b' ' => return None,
                b':' if depth == 0 && (idx + 1 == bytes.len() || bytes[idx + 1] == b' ') => {
                    return Some((&text[..idx], &text[idx + 1..]));
                }
                _ => {}
            },
        }
        idx += 1;
    }
    None
}

fn colorize_scalar(text: &str, out: &mut String) -> bool {
    let mut rest = text;

    // Node properties (anchors, tags) may precede the content.
    while rest.starts_with('&') || rest.starts_with('!') {
        let end = rest.find(' ').unwrap_or(rest.len());
        if rest.starts_with('&') {
            push_colored(&rest[..end], COLOR_ANCHOR, out);
        } else {
            out.push_str(&rest[..end]);
        }
        let after = &rest[end..];
        let trimmed = after.trim_start_matches(' ');
        out.push_str(&after[..after.len() - trimmed.len()]);
        rest = trimmed;
    }

    if rest.is_empty() {
        return false;
    }
    if rest.starts_with('*') {
        push_colored(rest, COLOR_ALIAS, out);
        return false;
    }
    if rest.starts_with('|') || rest.starts_with('>') {
        out.push_str(rest);
        return true;
    }

    match classify_scalar(rest) {
        Some(color) => push_colored(rest, color, out),
        None => out.push_str(rest),
    }
    false
}

fn classify_scalar(text: &str) -> Option<Color> {
    if text.starts_with('"') || text.starts_with('\'') {
        return Some(COLOR_STRING);
    }
    match text {
        "true" | "false" | "True" | "False" | "TRUE" | "FALSE" => return Some(COLOR_BOOL),
        "null" | "Null" | "NULL" | "~" => return None,
        ".inf" | "+.inf" | "-.inf" | ".Inf" | "-.Inf" | ".nan" | ".NaN" => {
            return Some(COLOR_NUMBER);
        }
        _ => {}
    }
    if text.starts_with('[') || text.starts_with('{') {
        return None;
    }
    if looks_numeric(text) {
        return Some(COLOR_NUMBER);
    }
    Some(COLOR_STRING)
}

fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);
    if let Some(hex) = unsigned.strip_prefix("0x") {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    if let Some(oct) = unsigned.strip_prefix("0o") {
        return !oct.is_empty() && oct.chars().all(|c| ('0'..='7').contains(&c));
    }
    unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && unsigned.chars().any(|c| c.is_ascii_digit())
        && text.parse::<f64>().is_ok()
}

fn push_colored(text: &str, color: Color, out: &mut String) {
    out.push_str("\u{1b}[");
    out.push_str(&color.to_fg_str());
    out.push('m');
    out.push_str(text);
    out.push_str("\u{1b}[0m");
}
