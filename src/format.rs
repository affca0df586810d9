use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The output formats a [`Transcriber`](crate::Transcriber) can emit.
///
/// Why this exists:
/// - Callers hand us plain string tags (CLI flags, config files, query strings), but the
///   dispatcher works on a closed set of formats.
/// - Parsing the tag once gives every format-specific branch an exhaustive `match`.
///
/// Tags are matched exactly and case-sensitively. The empty tag is an alias for YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    /// YAML; a top-level sequence becomes a stream of documents.
    Yaml,

    /// Plain JSON.
    Json,

    /// JSON with substitutes for values JSON cannot represent natively.
    Xjson,

    /// XML with the standard declaration header.
    Xml,

    /// CBOR, raw or base64.
    Cbor,

    /// MessagePack, raw or base64.
    #[cfg_attr(feature = "cli", value(name = "messagepack"))]
    MessagePack,

    /// Deterministic debug dump.
    Go,
}

impl Format {
    pub const ALL: [Format; 7] = [
        Format::Yaml,
        Format::Json,
        Format::Xjson,
        Format::Xml,
        Format::Cbor,
        Format::MessagePack,
        Format::Go,
    ];

    /// Parse a format tag. `""` means YAML; anything unrecognized is an error carrying the tag.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "yaml" | "" => Ok(Format::Yaml),
            "json" => Ok(Format::Json),
            "xjson" => Ok(Format::Xjson),
            "xml" => Ok(Format::Xml),
            "cbor" => Ok(Format::Cbor),
            "messagepack" => Ok(Format::MessagePack),
            "go" => Ok(Format::Go),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    /// The canonical tag for this format.
    pub fn tag(self) -> &'static str {
        match self {
            Format::Yaml => "yaml",
            Format::Json => "json",
            Format::Xjson => "xjson",
            Format::Xml => "xml",
            Format::Cbor => "cbor",
            Format::MessagePack => "messagepack",
            Format::Go => "go",
        }
    }

    /// Binary formats are base64-encoded whenever the result must be text.
    pub fn is_binary(self) -> bool {
        matches!(self, Format::Cbor | Format::MessagePack)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        Format::parse(tag)
    }
}
