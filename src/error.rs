use std::error::Error as StdError;

use thiserror::Error;

use crate::format::Format;

/// Transcribe's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by encode/decode failures.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Transcribe's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// Nothing is retried and no variant triggers a fallback format. When `write` fails with
/// `Encode` or `Io`, the destination may be empty, partially written, or absent.
#[derive(Debug, Error)]
pub enum Error {
    /// The format tag is not one of the recognized tags.
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// The reflector could not turn the value into something the format can represent.
    ///
    /// Raised before any byte reaches the destination.
    #[error("cannot prepare value for {format}: {message}")]
    Prepare { format: Format, message: String },

    /// The codec rejected the value.
    #[error("{format} encode failed: {source}")]
    Encode {
        format: Format,
        #[source]
        source: BoxError,
    },

    /// The text is not well-formed for the format.
    #[error("invalid {format}: {source}")]
    Decode {
        format: Format,
        #[source]
        source: BoxError,
    },

    /// A value could not be converted into the transcription data model.
    #[error("{0}")]
    Convert(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn prepare(format: Format, message: impl Into<String>) -> Self {
        Self::Prepare {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn encode(format: Format, source: impl Into<BoxError>) -> Self {
        Self::Encode {
            format,
            source: source.into(),
        }
    }

    pub(crate) fn decode(format: Format, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            format,
            source: source.into(),
        }
    }

    /// Whether this error means nothing was written to the destination.
    pub fn is_before_write(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::Prepare { .. } | Self::Convert(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Self::Io(err.into())
        } else {
            Self::encode(Format::Json, err)
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::encode(Format::Xml, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_echoes_the_tag() {
        let err = Error::UnsupportedFormat("protobuf".to_string());
        assert_eq!(err.to_string(), r#"unsupported format: "protobuf""#);
        assert!(err.is_before_write());
    }

    #[test]
    fn encode_errors_name_the_format() {
        let err = Error::encode(Format::Cbor, "boom");
        assert_eq!(err.to_string(), "cbor encode failed: boom");
        assert!(!err.is_before_write());
    }
}
