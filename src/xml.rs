//! XML element trees and the quick-xml adapter that writes them.
//!
//! Two shapes reach this module:
//! - an `XmlElement` produced by the reflector from a generic `Value`
//! - a caller-built `XmlDocument`, which is written by its own routine and ignores the
//!   format tag entirely

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;

/// The declaration written before an XML body generated from a value.
pub const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A single XML element with attributes, optional text and child elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    fn write_events<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_events(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// A pre-built XML document.
///
/// Passing one of these to a transcriber bypasses value encoding: the document is written
/// with its own indentation, whatever format tag was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub declaration: bool,
    pub root: XmlElement,
}

impl XmlDocument {
    /// A document with the standard declaration.
    pub fn new(root: XmlElement) -> Self {
        Self {
            declaration: true,
            root,
        }
    }

    pub fn without_declaration(mut self) -> Self {
        self.declaration = false;
        self
    }

    /// Write the document with one element per line, indenting each level by `indent_width`
    /// spaces. Text-only elements stay on one line. The output always ends with a newline.
    pub fn write_to<W: Write>(&self, mut w: W, indent_width: usize) -> Result<()> {
        let mut writer = Writer::new_with_indent(&mut w, b' ', indent_width);
        if self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        self.root.write_events(&mut writer)?;
        w.write_all(b"\n")?;
        Ok(())
    }
}

/// Write an element body (no declaration) using `indent` per nesting level.
///
/// An empty indent writes the whole tree on one line with no trailing newline; otherwise
/// each element starts on its own line, still without a trailing newline.
pub fn encode_element<W: Write>(w: W, element: &XmlElement, indent: &str) -> Result<()> {
    match indent.as_bytes().first() {
        None => element.write_events(&mut Writer::new(w)),
        Some(&ch) => element.write_events(&mut Writer::new_with_indent(w, ch, indent.len())),
    }
}

/// Whether `text` only contains characters allowed in an XML 1.0 document.
pub fn is_valid_text(text: &str) -> bool {
    text.chars().all(|c| {
        matches!(c,
            '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    })
}
