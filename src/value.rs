//! The data model every codec consumes.
//!
//! A `Value` is a tree of scalars, sequences and mappings. Mapping keys may be any value, and
//! entries keep their insertion order. `Value` implements `Serialize` and `Deserialize`, so it
//! can be produced from, and fed to, any serde data format.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::{Equivalent, IndexMap};
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::error::{Error, Result};

/// A value to be transcribed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    /// Only used for values above `i64::MAX`; smaller unsigned inputs become `Integer`.
    Unsigned(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Map),
}

impl Value {
    /// Build a byte-string value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Convert any serializable type into a `Value`.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Value::from)
            .map_err(|err| Error::Convert(format!("cannot convert value: {err}")))
    }

    /// A short name for the kind of value, used in diagnostics and XML element names.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "int",
            Value::Unsigned(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Whether this value is neither a list nor a map.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Copy the value with every mapping key, at any depth, replaced by its string form.
    ///
    /// Scalars use their display text, bytes their base64 text, and compound keys their
    /// compact JSON text.
    pub fn with_string_keys(&self) -> Result<Value> {
        Ok(match self {
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(Value::with_string_keys)
                    .collect::<Result<_>>()?,
            ),
            Value::Map(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.key_text()?, value.with_string_keys()?);
                }
                Value::Map(out)
            }
            other => other.clone(),
        })
    }

    pub(crate) fn key_text(&self) -> Result<String> {
        Ok(match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Unsigned(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => BASE64.encode(b),
            compound => serde_json::to_string(&compound.with_string_keys()?).map_err(|err| {
                Error::Convert(format!("cannot use {} as a string key: {err}", compound.kind()))
            })?,
        })
    }
}

/// An insertion-ordered mapping with arbitrary keys.
///
/// Entries are hashed, so inserts and lookups stay constant-time on large inputs. Keys
/// compare structurally; floats compare by value with every NaN equal to every other NaN and
/// `-0.0` equal to `0.0`. Equality between two maps is order-sensitive.
#[derive(Clone, Default)]
pub struct Map {
    entries: IndexMap<Key, Value>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert an entry, returning the previous value when the key was already present.
    /// A replaced entry keeps its original position.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(Key(key.into()), value.into())
    }

    /// Look an entry up by a `Value` or a `str` key.
    pub fn get<Q: MapIndex + ?Sized>(&self, key: &Q) -> Option<&Value> {
        key.find(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter(self.entries.iter())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.keys().map(|key| &key.0)
    }

    /// Keys stay fixed once inserted; only values can be rewritten in place.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    /// Whether every key is a `Value::String`.
    pub fn has_string_keys(&self) -> bool {
        self.keys().all(|k| matches!(k, Value::String(_)))
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

/// Key types accepted by [`Map::get`].
pub trait MapIndex: private::Sealed {
    #[doc(hidden)]
    fn find<'m>(&self, map: &'m Map) -> Option<&'m Value>;
}

impl MapIndex for Value {
    fn find<'m>(&self, map: &'m Map) -> Option<&'m Value> {
        map.entries.get(&ValueLookup(self))
    }
}

impl MapIndex for str {
    fn find<'m>(&self, map: &'m Map) -> Option<&'m Value> {
        map.entries.get(&StrLookup(self))
    }
}

impl MapIndex for String {
    fn find<'m>(&self, map: &'m Map) -> Option<&'m Value> {
        MapIndex::find(self.as_str(), map)
    }
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Value {}
    impl Sealed for str {}
    impl Sealed for String {}
}

// A stored key. Hashing and equality must agree with the lookup types below.
#[derive(Clone)]
struct Key(Value);

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(&self.0, state);
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        key_eq(&self.0, &other.0)
    }
}

impl Eq for Key {}

struct ValueLookup<'a>(&'a Value);

impl Hash for ValueLookup<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_key(self.0, state);
    }
}

impl Equivalent<Key> for ValueLookup<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        key_eq(self.0, &key.0)
    }
}

struct StrLookup<'a>(&'a str);

impl Hash for StrLookup<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(&Value::String(String::new())).hash(state);
        self.0.hash(state);
    }
}

impl Equivalent<Key> for StrLookup<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        key.0.as_str() == Some(self.0)
    }
}

fn float_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

fn hash_key<H: Hasher>(value: &Value, state: &mut H) {
    mem::discriminant(value).hash(state);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(state),
        Value::Integer(i) => i.hash(state),
        Value::Unsigned(u) => u.hash(state),
        Value::Float(f) => float_bits(*f).hash(state),
        Value::String(s) => s.hash(state),
        Value::Bytes(b) => b.hash(state),
        Value::List(items) => {
            items.len().hash(state);
            for item in items {
                hash_key(item, state);
            }
        }
        Value::Map(map) => {
            map.len().hash(state);
            for (key, value) in map {
                hash_key(key, state);
                hash_key(value, state);
            }
        }
    }
}

fn key_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Float(x), Value::Float(y)) => float_bits(*x) == float_bits(*y),
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| key_eq(x, y))
        }
        (Value::Map(x), Value::Map(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .zip(y.iter())
                    .all(|((xk, xv), (yk, yv))| key_eq(xk, yk) && key_eq(xv, yv))
        }
        (a, b) => a == b,
    }
}

/// Borrowing iterator over the entries of a [`Map`], in insertion order.
pub struct Iter<'a>(indexmap::map::Iter<'a, Key, Value>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, value)| (&key.0, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over the entries of a [`Map`], in insertion order.
pub struct IntoIter(indexmap::map::IntoIter<Key, Value>);

impl Iterator for IntoIter {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, value)| (key.0, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for IntoIter {}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a Value, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Map {
    type Item = (Value, Value);
    type IntoIter = IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter(self.entries.into_iter())
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Map::with_capacity(iter.size_hint().0);
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

macro_rules! from_small_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Integer(v.into())
            }
        })*
    };
}

from_small_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::Unsigned(v),
        }
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Unsigned(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Map(map.into_iter().collect()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Unsigned(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(b) => serializer.serialize_bytes(b),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any self-describing value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Value, E> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Value, E> {
        Ok(Value::Bytes(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Value, A::Error> {
        let mut map = Map::with_capacity(access.size_hint().unwrap_or(0).min(4096));
        while let Some((key, value)) = access.next_entry::<Value, Value>()? {
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_unsigned_values_become_integers() {
        assert_eq!(Value::from(7u64), Value::Integer(7));
        assert_eq!(Value::from(u64::MAX), Value::Unsigned(u64::MAX));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map = Map::new();
        map.insert("a", 1);
        map.insert("b", 2);
        assert_eq!(map.insert("a", 3), Some(Value::Integer(1)));

        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn large_maps_keep_order_and_replace_in_place() -> anyhow::Result<()> {
        let text = format!(
            "{{{}}}",
            (0..50_000)
                .map(|i| format!("\"k{i}\": {i}"))
                .collect::<Vec<_>>()
                .join(",")
        );
        let Value::Map(mut map) = serde_json::from_str::<Value>(&text)? else {
            panic!("expected map");
        };
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.keys().next(), Some(&Value::from("k0")));
        assert_eq!(map.get("k49999"), Some(&Value::Integer(49_999)));

        assert_eq!(map.insert("k0", "first"), Some(Value::Integer(0)));
        assert_eq!(map.len(), 50_000);
        assert_eq!(map.iter().next(), Some((&Value::from("k0"), &Value::from("first"))));
        Ok(())
    }

    #[test]
    fn float_keys_compare_by_value() {
        let mut map = Map::new();
        map.insert(0.0, "zero");
        map.insert(-0.0, "negative zero");
        map.insert(f64::NAN, "nan");
        map.insert(-f64::NAN, "other nan");
        map.insert(1, "int");
        assert_eq!(map.len(), 3);
        assert_eq!(map.get(&Value::Float(0.0)), Some(&Value::from("negative zero")));
        assert_eq!(map.get(&Value::Float(f64::NAN)), Some(&Value::from("other nan")));
        assert_eq!(map.get(&Value::Float(1.0)), None);
    }

    #[test]
    fn compound_keys_are_found_by_structure() {
        let mut map = Map::new();
        map.insert(Value::List(vec![1.into(), "x".into()]), "pair");
        assert_eq!(
            map.get(&Value::List(vec![1.into(), "x".into()])),
            Some(&Value::from("pair"))
        );
        assert_eq!(map.get(&Value::List(vec!["x".into(), 1.into()])), None);
        assert_eq!(map.get(&String::from("pair")), None);
    }

    #[test]
    fn map_equality_is_order_sensitive() {
        let forward: Map = [("a", 1), ("b", 2)].into_iter().collect();
        let backward: Map = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(forward, backward);
        assert_eq!(forward, forward.clone());
    }

    #[test]
    fn string_keys_are_normalized_at_every_depth() -> anyhow::Result<()> {
        let inner: Map = [(Value::Bool(true), Value::from("yes"))].into_iter().collect();
        let mut outer = Map::new();
        outer.insert(1, Value::Map(inner));
        outer.insert(Value::List(vec![1.into(), 2.into()]), "pair");

        let normalized = Value::Map(outer).with_string_keys()?;
        let Value::Map(map) = normalized else {
            panic!("expected map");
        };
        assert!(map.has_string_keys());
        assert!(map.get("[1,2]").is_some());
        let Some(Value::Map(inner)) = map.get("1") else {
            panic!("expected nested map");
        };
        assert_eq!(inner.get("true"), Some(&Value::from("yes")));
        Ok(())
    }

    #[test]
    fn from_serialize_preserves_field_order() -> anyhow::Result<()> {
        #[derive(serde::Serialize)]
        struct Point {
            x: i32,
            y: f64,
            label: Option<String>,
        }

        let value = Value::from_serialize(&Point {
            x: 1,
            y: 2.5,
            label: None,
        })?;
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        let keys: Vec<_> = map.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, ["x", "y", "label"]);
        assert_eq!(map.get("x"), Some(&Value::Integer(1)));
        assert_eq!(map.get("y"), Some(&Value::Float(2.5)));
        assert_eq!(map.get("label"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn deserializes_non_string_keys_from_yaml() -> anyhow::Result<()> {
        let value: Value = serde_yaml_ng::from_str("1: one\ntrue: yes\n")?;
        let Value::Map(map) = value else {
            panic!("expected map");
        };
        assert_eq!(map.get(&Value::Integer(1)), Some(&Value::from("one")));
        assert_eq!(map.get(&Value::Bool(true)), Some(&Value::from("yes")));
        Ok(())
    }

    #[test]
    fn json_numbers_come_back_as_integers() -> anyhow::Result<()> {
        let value: Value = serde_json::from_str("[1, -2, 3.5]")?;
        assert_eq!(
            value,
            Value::List(vec![
                Value::Integer(1),
                Value::Integer(-2),
                Value::Float(3.5)
            ])
        );
        Ok(())
    }
}
