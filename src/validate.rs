use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::binary;
use crate::error::{Error, Result};
use crate::format::Format;

/// Fully decode `text` under `format` and report the first structural error.
///
/// - `yaml` (or empty): every document in the stream
/// - `json`, `xjson`: every top-level value in the stream
/// - `xml`: every token until EOF, with end tags matched against start tags
/// - `cbor`, `messagepack`: base64 text holding exactly one item
///
/// The debug dump has no grammar, so `go` is unsupported here.
pub fn validate(text: &str, format: &str) -> Result<()> {
    let format = Format::parse(format)?;
    tracing::debug!(%format, len = text.len(), "validating");
    match format {
        Format::Yaml => validate_yaml(text),
        Format::Json | Format::Xjson => validate_json(text, format),
        Format::Xml => validate_xml(text),
        Format::Cbor => binary::decode_cbor(&binary::from_base64(format, text)?).map(drop),
        Format::MessagePack => {
            binary::decode_messagepack(&binary::from_base64(format, text)?).map(drop)
        }
        Format::Go => Err(Error::UnsupportedFormat(format.tag().to_string())),
    }
}

fn validate_yaml(text: &str) -> Result<()> {
    for document in serde_yaml_ng::Deserializer::from_str(text) {
        serde_yaml_ng::Value::deserialize(document).map_err(|err| Error::decode(Format::Yaml, err))?;
    }
    Ok(())
}

fn validate_json(text: &str, format: Format) -> Result<()> {
    for item in serde_json::Deserializer::from_str(text).into_iter::<IgnoredAny>() {
        item.map_err(|err| Error::decode(format, err))?;
    }
    Ok(())
}

fn validate_xml(text: &str) -> Result<()> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = true;

    let mut open = 0usize;
    loop {
        let event = reader
            .read_event()
            .map_err(|err| Error::decode(Format::Xml, err))?;
        match event {
            Event::Start(_) => open += 1,
            Event::End(_) => open = open.saturating_sub(1),
            Event::Eof if open > 0 => {
                return Err(Error::decode(
                    Format::Xml,
                    format!("unexpected end of input with {open} unclosed element(s)"),
                ));
            }
            Event::Eof => return Ok(()),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_checks_every_document() {
        assert!(validate("a: 1\n---\nb: [1, 2]\n", "yaml").is_ok());
        assert!(validate("a: 1\n---\nb: [1, 2\n", "").is_err());
        assert!(validate("", "yaml").is_ok());
    }

    #[test]
    fn json_checks_every_value() {
        assert!(validate("{\"a\": 1} [2]", "json").is_ok());
        assert!(validate("{\"a\": 1} [2", "xjson").is_err());
    }

    #[test]
    fn xml_matches_end_tags() {
        assert!(validate("<?xml version=\"1.0\"?><a><b/></a>", "xml").is_ok());
        assert!(validate("<a><b></a>", "xml").is_err());
        assert!(validate("<a>", "xml").is_err());
    }

    #[test]
    fn binary_formats_expect_base64() -> anyhow::Result<()> {
        let cbor = binary::to_base64(&binary::encode_cbor(&1.into())?);
        assert!(validate(&cbor, "cbor").is_ok());
        assert!(validate("%%%", "cbor").is_err());

        let msgpack = binary::to_base64(&binary::encode_messagepack(&"x".into())?);
        assert!(validate(&msgpack, "messagepack").is_ok());
        assert!(validate(&binary::to_base64(&[0xc1]), "messagepack").is_err());
        Ok(())
    }

    #[test]
    fn dump_and_unknown_formats_are_unsupported() {
        assert!(matches!(validate("x", "go"), Err(Error::UnsupportedFormat(tag)) if tag == "go"));
        assert!(matches!(
            validate("x", "protobuf"),
            Err(Error::UnsupportedFormat(tag)) if tag == "protobuf"
        ));
    }
}
