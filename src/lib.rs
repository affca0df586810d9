//! `transcribe`: format-agnostic value transcription.
//!
//! This crate provides:
//! - An immutable `Transcriber` configuration with `with_*` builders
//! - Encoders for YAML, JSON, XJSON, XML, CBOR, MessagePack and a debug dump
//! - Terminal mode: terminal indent, trailing newlines and ANSI colors
//! - Validation of text against a format's grammar
//!
//! Strings and pre-built XML documents pass through untouched whatever the format; every
//! other value is encoded through a single dispatch table shared by `write`, `print` and
//! `stringify`.

// High-level API (most consumers should start here).
pub mod input;
pub mod transcriber;
pub mod validate;

// Data model and format tags.
pub mod format;
pub mod value;

// Preparation hooks for formats that cannot carry the data model directly.
pub mod reflector;

// Codec adapters.
pub mod binary;
pub mod dump;
pub mod json;
pub mod xml;
pub mod yaml;

// Terminal environment and colorization.
pub mod color;
pub mod terminal;

// Destinations.
pub mod sink;

pub mod error;

// Logging configuration and control.
#[cfg(feature = "logging")]
pub mod logging;

mod dispatch;

pub use error::{Error, Result};
pub use format::Format;
pub use input::Input;
pub use reflector::{DefaultReflector, Reflector};
pub use sink::Destination;
pub use terminal::Terminal;
pub use transcriber::Transcriber;
pub use validate::validate;
pub use value::{Map, Value};
pub use xml::{XmlDocument, XmlElement};
