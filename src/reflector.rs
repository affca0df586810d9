//! Value preparation for formats that cannot represent the data model directly.
//!
//! XML has no native scalars or mappings, JSON has no bytes, non-finite floats or non-string
//! keys, and a strict YAML document rejects keys that a loose encode would quietly accept.
//! A `Reflector` bridges each gap before any byte is written. Callers can supply their own;
//! every method has a default built on the conventions below.
//!
//! XML:
//! - mapping: `<map>` of `<entry><key>..</key><value>..</value></entry>`
//! - sequence: `<list>` of items
//! - scalars: `<string>`, `<int>`, `<uint>`, `<float>`, `<bool>`, `<null/>`, `<bytes>`
//!
//! XJSON:
//! - bytes: `{"$bytes": "<base64>"}`
//! - non-finite float: `{"$float": "NaN" | "+Inf" | "-Inf"}`
//! - mapping with any non-string key: `{"$map": [{"$key": k, "$value": v}, ..]}`

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::value::{Map, Value};
use crate::xml::{self, XmlElement};

/// Hook used by XML and XJSON preparation and by strict YAML.
pub trait Reflector: Send + Sync {
    /// Map a value onto an XML element tree.
    fn prepare_for_xml(&self, value: Value) -> Result<XmlElement> {
        xml_element(value, "$")
    }

    /// Rewrite non-JSON-native parts of `value` into JSON substitutes.
    fn prepare_for_xjson(&self, value: &mut Value) -> Result<()> {
        xjson_rewrite(value);
        Ok(())
    }

    /// Check `value` against the rules of an explicit YAML document and return the document
    /// to encode.
    fn to_strict_yaml_document(&self, value: &Value) -> Result<Value> {
        check_strict_yaml(value, "$")?;
        Ok(value.clone())
    }
}

/// The reflector used when a transcriber has none configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReflector;

impl Reflector for DefaultReflector {}

fn xml_element(value: Value, path: &str) -> Result<XmlElement> {
    Ok(match value {
        Value::Null => XmlElement::new("null"),
        Value::Bool(b) => XmlElement::new("bool").with_text(b.to_string()),
        Value::Integer(i) => XmlElement::new("int").with_text(i.to_string()),
        Value::Unsigned(u) => XmlElement::new("uint").with_text(u.to_string()),
        Value::Float(f) => XmlElement::new("float").with_text(float_text(f)),
        Value::String(s) => {
            if !xml::is_valid_text(&s) {
                return Err(Error::prepare(
                    Format::Xml,
                    format!("string at {path} contains characters XML cannot carry"),
                ));
            }
            XmlElement::new("string").with_text(s)
        }
        Value::Bytes(b) => XmlElement::new("bytes").with_text(BASE64.encode(b)),
        Value::List(items) => {
            let mut list = XmlElement::new("list");
            for (idx, item) in items.into_iter().enumerate() {
                list.push_child(xml_element(item, &format!("{path}[{idx}]"))?);
            }
            list
        }
        Value::Map(map) => {
            let mut out = XmlElement::new("map");
            for (key, value) in map {
                let child_path = child_path(path, &key);
                let entry = XmlElement::new("entry")
                    .with_child(XmlElement::new("key").with_child(xml_element(key, &child_path)?))
                    .with_child(
                        XmlElement::new("value").with_child(xml_element(value, &child_path)?),
                    );
                out.push_child(entry);
            }
            out
        }
    })
}

fn xjson_rewrite(value: &mut Value) {
    match value {
        Value::Bytes(bytes) => {
            let encoded = BASE64.encode(bytes);
            *value = tagged("$bytes", encoded);
        }
        Value::Float(f) if !f.is_finite() => {
            let text = float_text(*f);
            *value = tagged("$float", text);
        }
        Value::List(items) => items.iter_mut().for_each(xjson_rewrite),
        Value::Map(map) if map.has_string_keys() => map.values_mut().for_each(xjson_rewrite),
        Value::Map(map) => {
            let entries: Vec<Value> = std::mem::take(map)
                .into_iter()
                .map(|(mut key, mut value)| {
                    xjson_rewrite(&mut key);
                    xjson_rewrite(&mut value);
                    let mut entry = Map::with_capacity(2);
                    entry.insert("$key", key);
                    entry.insert("$value", value);
                    Value::Map(entry)
                })
                .collect();
            *value = tagged("$map", entries);
        }
        _ => {}
    }
}

fn tagged(tag: &str, inner: impl Into<Value>) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(tag, inner);
    Value::Map(map)
}

fn check_strict_yaml(value: &Value, path: &str) -> Result<()> {
    match value {
        Value::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                check_strict_yaml(item, &format!("{path}[{idx}]"))?;
            }
        }
        Value::Map(map) => {
            for key in map.keys() {
                if !key.is_scalar() {
                    return Err(Error::prepare(
                        Format::Yaml,
                        format!("mapping key at {path} is a {}", key.kind()),
                    ));
                }
                if matches!(key, Value::Float(f) if f.is_nan()) {
                    return Err(Error::prepare(
                        Format::Yaml,
                        format!("mapping key at {path} is NaN"),
                    ));
                }
            }
            for (key, value) in map {
                check_strict_yaml(value, &child_path(path, key))?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn child_path(path: &str, key: &Value) -> String {
    match key {
        Value::String(s) => format!("{path}.{s}"),
        Value::Integer(i) => format!("{path}[{i}]"),
        other => format!("{path}[{}]", other.kind()),
    }
}

/// Text for a float in reflected output: shortest round-trip digits for finite values,
/// `NaN`, `+Inf` or `-Inf` otherwise.
pub(crate) fn float_text(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "+Inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        f.to_string()
    }
}
