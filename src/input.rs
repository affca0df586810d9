use std::borrow::Cow;

use crate::value::Value;
use crate::xml::XmlDocument;

/// What a transcriber is asked to emit.
///
/// Resolved once at the API boundary through the `From` conversions below, so callers can
/// pass a `Value`, a string, or an `XmlDocument` directly.
///
/// A `&mut Value` lets preparation for XML and XJSON work directly on the caller's value
/// when the transcriber is configured `in_place`. Otherwise the value is copied first.
///
/// Rust strings (`&str`, `String`) become `Text`, which is written verbatim whatever the
/// format. A `Value::String` is a value like any other and is encoded as a scalar.
#[derive(Debug)]
pub enum Input<'a> {
    Value(Cow<'a, Value>),
    ValueMut(&'a mut Value),
    Text(Cow<'a, str>),
    Document(&'a XmlDocument),
}

impl From<Value> for Input<'_> {
    fn from(value: Value) -> Self {
        Input::Value(Cow::Owned(value))
    }
}

impl<'a> From<&'a Value> for Input<'a> {
    fn from(value: &'a Value) -> Self {
        Input::Value(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a mut Value> for Input<'a> {
    fn from(value: &'a mut Value) -> Self {
        Input::ValueMut(value)
    }
}

impl<'a> From<&'a str> for Input<'a> {
    fn from(text: &'a str) -> Self {
        Input::Text(Cow::Borrowed(text))
    }
}

impl<'a> From<&'a String> for Input<'a> {
    fn from(text: &'a String) -> Self {
        Input::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Input<'_> {
    fn from(text: String) -> Self {
        Input::Text(Cow::Owned(text))
    }
}

impl<'a> From<&'a XmlDocument> for Input<'a> {
    fn from(document: &'a XmlDocument) -> Self {
        Input::Document(document)
    }
}
