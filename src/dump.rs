//! Debug dump of a value as Go-style typed literals.
//!
//! Mapping entries are sorted so the output is deterministic: numeric keys by value, then
//! every other key by its rendered text. Every non-empty collection is annotated with its
//! length.

use std::cmp::Ordering;

use crate::reflector::float_text;
use crate::value::Value;

/// Render `value` as a dump indented by `indent` per level, ending with a newline.
pub fn dump(value: &Value, indent: &str) -> String {
    let mut out = String::new();
    write_value(&mut out, value, indent, 0);
    out.push('\n');
    out
}

fn write_value(out: &mut String, value: &Value, indent: &str, depth: usize) {
    match value {
        Value::Null => out.push_str("nil"),
        Value::Bool(b) => out.push_str(&format!("bool({b})")),
        Value::Integer(i) => out.push_str(&format!("int64({i})")),
        Value::Unsigned(u) => out.push_str(&format!("uint64({u})")),
        Value::Float(f) => out.push_str(&format!("float64({})", float_text(*f))),
        Value::String(s) => out.push_str(&format!("string({s:?})")),
        Value::Bytes(bytes) => {
            out.push_str("[]byte{");
            for (idx, b) in bytes.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                out.push_str(&format!("{b:#04x}"));
            }
            out.push('}');
        }
        Value::List(items) => {
            if items.is_empty() {
                out.push_str("[]any{}");
                return;
            }
            out.push_str(&format!("[]any{{ // len={}", items.len()));
            for item in items {
                newline(out, indent, depth + 1);
                write_value(out, item, indent, depth + 1);
                out.push(',');
            }
            newline(out, indent, depth);
            out.push('}');
        }
        Value::Map(map) => {
            if map.is_empty() {
                out.push_str("map[any]any{}");
                return;
            }
            let mut entries: Vec<(&Value, String, &Value)> = map
                .iter()
                .map(|(key, value)| {
                    let mut rendered = String::new();
                    write_value(&mut rendered, key, indent, depth + 1);
                    (key, rendered, value)
                })
                .collect();
            entries.sort_by(|a, b| compare_keys(a.0, &a.1, b.0, &b.1));

            out.push_str(&format!("map[any]any{{ // len={}", entries.len()));
            for (_, key, value) in entries {
                newline(out, indent, depth + 1);
                out.push_str(&key);
                out.push_str(": ");
                write_value(out, value, indent, depth + 1);
                out.push(',');
            }
            newline(out, indent, depth);
            out.push('}');
        }
    }
}

// Numeric keys come first, ordered by value. Everything else follows, ordered by its
// rendered text.
fn compare_keys(a: &Value, a_text: &str, b: &Value, b_text: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| a_text.cmp(b_text)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a_text.cmp(b_text),
    }
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(*i as f64),
        Value::Unsigned(u) => Some(*u as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    }
}

fn newline(out: &mut String, indent: &str, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str(indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    #[test]
    fn keys_are_sorted_and_collections_annotated() {
        let mut map = Map::new();
        map.insert("b", vec![Value::from(2), Value::Null]);
        map.insert("a", Value::bytes(vec![0x0f, 0xff]));
        assert_eq!(
            dump(&Value::Map(map), "  "),
            "map[any]any{ // len=2\n\
             \x20 string(\"a\"): []byte{0x0f, 0xff},\n\
             \x20 string(\"b\"): []any{ // len=2\n\
             \x20   int64(2),\n\
             \x20   nil,\n\
             \x20 },\n\
             }\n"
        );
    }

    #[test]
    fn scalars_carry_their_type() {
        assert_eq!(dump(&Value::Unsigned(u64::MAX), ""), "uint64(18446744073709551615)\n");
        assert_eq!(dump(&Value::Float(f64::NAN), ""), "float64(NaN)\n");
        assert_eq!(dump(&Value::Bool(false), ""), "bool(false)\n");
        assert_eq!(dump(&Value::List(vec![]), ""), "[]any{}\n");
    }

    #[test]
    fn numeric_keys_sort_by_value() {
        let map: Map = [
            (Value::from("a"), "letter"),
            (Value::from(10), "ten"),
            (Value::Float(9.5), "nine and a half"),
            (Value::from(9), "nine"),
            (Value::from(-1), "minus one"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            dump(&Value::Map(map), ""),
            "map[any]any{ // len=5\n\
             int64(-1): string(\"minus one\"),\n\
             int64(9): string(\"nine\"),\n\
             float64(9.5): string(\"nine and a half\"),\n\
             int64(10): string(\"ten\"),\n\
             string(\"a\"): string(\"letter\"),\n\
             }\n"
        );
    }

    #[test]
    fn output_is_independent_of_insertion_order() {
        let forward: Map = [("x", 1), ("y", 2)].into_iter().collect();
        let backward: Map = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(
            dump(&Value::Map(forward), "\t"),
            dump(&Value::Map(backward), "\t")
        );
    }
}
