//! The single dispatch table behind `write`, `print` and `stringify`.
//!
//! Rendering happens fully in memory before the destination is opened, so a bad format tag
//! or a failed preparation never creates or truncates a file.
//!
//! Order of rules:
//! 1. `Text` is written verbatim, with a newline appended in terminal mode.
//! 2. `Document` is written by its own routine.
//! 3. Values dispatch on the format tag.

use std::borrow::Cow;

use crate::binary;
use crate::color;
use crate::dump;
use crate::error::{Error, Result};
use crate::format::Format;
use crate::input::Input;
use crate::json;
use crate::transcriber::Transcriber;
use crate::value::Value;
use crate::xml::{self, XML_HEADER, XmlElement};
use crate::yaml;

/// Where the rendered bytes are headed.
///
/// Only two rules differ between the targets: binary formats are always base64 text in a
/// buffer, and JSON without an indent drops its trailing newline in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Stream,
    Buffer,
}

pub(crate) fn render(
    transcriber: &Transcriber,
    input: Input<'_>,
    format: &str,
    target: Target,
) -> Result<Vec<u8>> {
    let subject = match input {
        Input::Text(text) => {
            let mut out = text.into_owned().into_bytes();
            if transcriber.pretty() && !out.ends_with(b"\n") {
                out.push(b'\n');
            }
            return Ok(out);
        }
        Input::Document(document) => {
            let mut out = Vec::new();
            document.write_to(&mut out, transcriber.effective_indent_width())?;
            return Ok(out);
        }
        Input::Value(value) => Subject::Shared(value),
        Input::ValueMut(value) => Subject::Exclusive(value),
    };

    let format = Format::parse(format)?;
    tracing::debug!(
        %format,
        ?target,
        pretty = transcriber.pretty(),
        colorize = transcriber.colorizes(),
        "rendering value"
    );

    let out = match format {
        Format::Yaml => render_yaml(transcriber, subject.get())?,
        Format::Json => render_json(transcriber, subject.get(), target)?,
        Format::Xjson => {
            let prepared = subject.prepare_xjson(transcriber)?;
            render_json(transcriber, &prepared, target)?
        }
        Format::Xml => {
            let element = transcriber
                .reflector()
                .prepare_for_xml(subject.into_value(transcriber.in_place()))?;
            render_xml(transcriber, &element)?
        }
        Format::Cbor => render_binary(transcriber, binary::encode_cbor(subject.get())?, target),
        Format::MessagePack => render_binary(
            transcriber,
            binary::encode_messagepack(subject.get())?,
            target,
        ),
        Format::Go => dump::dump(subject.get(), &transcriber.effective_indent()).into_bytes(),
    };

    tracing::trace!(%format, bytes = out.len(), "rendered value");
    Ok(out)
}

/// Render for an in-memory string.
pub(crate) fn render_string(
    transcriber: &Transcriber,
    input: Input<'_>,
    format: &str,
) -> Result<String> {
    let bytes = render(transcriber, input, format, Target::Buffer)?;
    String::from_utf8(bytes)
        .map_err(|err| Error::Convert(format!("rendered {format:?} output is not UTF-8: {err}")))
}

enum Subject<'a> {
    Shared(Cow<'a, Value>),
    Exclusive(&'a mut Value),
}

impl<'a> Subject<'a> {
    fn get(&self) -> &Value {
        match self {
            Subject::Shared(value) => value,
            Subject::Exclusive(value) => value,
        }
    }

    // An exclusive borrow is only consumed when the caller opted in; otherwise a copy is
    // prepared. Owned input is always consumed.
    fn into_value(self, in_place: bool) -> Value {
        match self {
            Subject::Shared(value) => value.into_owned(),
            Subject::Exclusive(value) if in_place => std::mem::take(value),
            Subject::Exclusive(value) => value.clone(),
        }
    }

    fn prepare_xjson(self, transcriber: &Transcriber) -> Result<Cow<'a, Value>> {
        let reflector = transcriber.reflector();
        match self {
            Subject::Exclusive(value) if transcriber.in_place() => {
                reflector.prepare_for_xjson(value)?;
                let value: &'a Value = value;
                Ok(Cow::Borrowed(value))
            }
            other => {
                let mut value = other.into_value(false);
                reflector.prepare_for_xjson(&mut value)?;
                Ok(Cow::Owned(value))
            }
        }
    }
}

fn render_yaml(transcriber: &Transcriber, value: &Value) -> Result<Vec<u8>> {
    let strict;
    let value = if transcriber.strict() {
        strict = transcriber.reflector().to_strict_yaml_document(value)?;
        &strict
    } else {
        value
    };

    let text = yaml::encode_documents(value, transcriber.effective_indent_width())?;
    if transcriber.colorizes() {
        // Colorize the plain rendering exactly once.
        return Ok(color::colorize_yaml(&text).into_bytes());
    }
    Ok(text.into_bytes())
}

fn render_json(transcriber: &Transcriber, value: &Value, target: Target) -> Result<Vec<u8>> {
    let indent = transcriber.effective_indent();
    let mut out = if transcriber.colorizes() {
        let mut text = color::colorize_json(value, transcriber.terminal().indent_spaces())?;
        text.push('\n');
        text.into_bytes()
    } else {
        let mut out = Vec::new();
        json::encode(&mut out, value, &indent)?;
        out
    };

    if target == Target::Buffer && indent.is_empty() {
        while out.last() == Some(&b'\n') {
            out.pop();
        }
    }
    Ok(out)
}

fn render_xml(transcriber: &Transcriber, element: &XmlElement) -> Result<Vec<u8>> {
    let indent = transcriber.effective_indent();
    let mut out = Vec::from(XML_HEADER.as_bytes());
    if !indent.is_empty() || transcriber.pretty() {
        out.push(b'\n');
    }
    xml::encode_element(&mut out, element, &indent)?;
    if indent.is_empty() || transcriber.pretty() {
        out.push(b'\n');
    }
    Ok(out)
}

fn render_binary(transcriber: &Transcriber, bytes: Vec<u8>, target: Target) -> Vec<u8> {
    match target {
        Target::Buffer => binary::to_base64(&bytes).into_bytes(),
        Target::Stream if transcriber.base64() => {
            let mut out = binary::to_base64(&bytes).into_bytes();
            if transcriber.pretty() {
                out.push(b'\n');
            }
            out
        }
        Target::Stream => bytes,
    }
}
