//! CBOR and MessagePack codecs, plus the base64 text form both fall back to.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{Error, Result};
use crate::format::Format;
use crate::value::Value;

pub fn encode_cbor(value: &Value) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ciborium::into_writer(value, &mut out)
        .map_err(|err| Error::encode(Format::Cbor, err.to_string()))?;
    Ok(out)
}

/// Encode `value` as MessagePack.
///
/// MessagePack consumers commonly expect string-keyed maps, so every mapping key is
/// converted to its string form first.
pub fn encode_messagepack(value: &Value) -> Result<Vec<u8>> {
    let value = value.with_string_keys()?;
    rmp_serde::to_vec(&value).map_err(|err| Error::encode(Format::MessagePack, err))
}

/// Decode exactly one CBOR item. Trailing bytes are an error.
pub fn decode_cbor(bytes: &[u8]) -> Result<Value> {
    let mut rest = bytes;
    let value = ciborium::from_reader(&mut rest)
        .map_err(|err| Error::decode(Format::Cbor, err.to_string()))?;
    ensure_consumed(Format::Cbor, rest.len())?;
    Ok(value)
}

/// Decode exactly one MessagePack item. Trailing bytes are an error.
pub fn decode_messagepack(bytes: &[u8]) -> Result<Value> {
    let mut cursor = std::io::Cursor::new(bytes);
    let value = rmp_serde::from_read(&mut cursor)
        .map_err(|err| Error::decode(Format::MessagePack, err))?;
    let consumed = usize::try_from(cursor.position()).unwrap_or(bytes.len());
    ensure_consumed(Format::MessagePack, bytes.len().saturating_sub(consumed))?;
    Ok(value)
}

fn ensure_consumed(format: Format, remaining: usize) -> Result<()> {
    if remaining == 0 {
        Ok(())
    } else {
        Err(Error::decode(
            format,
            format!("{remaining} trailing bytes after the first item"),
        ))
    }
}

pub fn to_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode base64 text produced by [`to_base64`]. Surrounding whitespace is ignored.
pub fn from_base64(format: Format, text: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(text.trim())
        .map_err(|err| Error::decode(format, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;

    fn sample() -> Value {
        let mut map = Map::new();
        map.insert("name", "demo");
        map.insert("blob", Value::bytes(vec![0u8, 1, 2]));
        map.insert("list", vec![Value::from(-1), Value::from(2.5), Value::Null]);
        Value::Map(map)
    }

    #[test]
    fn cbor_decodes_to_the_same_value() -> anyhow::Result<()> {
        let value = sample();
        assert_eq!(decode_cbor(&encode_cbor(&value)?)?, value);
        Ok(())
    }

    #[test]
    fn messagepack_normalizes_keys() -> anyhow::Result<()> {
        let mut map = Map::new();
        map.insert(1, "one");
        let decoded = decode_messagepack(&encode_messagepack(&Value::Map(map))?)?;
        let Value::Map(decoded) = decoded else {
            panic!("expected map");
        };
        assert_eq!(decoded.get("1"), Some(&Value::from("one")));
        Ok(())
    }

    #[test]
    fn trailing_bytes_are_rejected() -> anyhow::Result<()> {
        let mut bytes = encode_cbor(&Value::from(1))?;
        bytes.push(0);
        assert!(decode_cbor(&bytes).is_err());

        let mut bytes = encode_messagepack(&Value::from(1))?;
        bytes.push(0);
        assert!(decode_messagepack(&bytes).is_err());
        Ok(())
    }

    #[test]
    fn base64_ignores_surrounding_whitespace() -> anyhow::Result<()> {
        let text = format!("{}\n", to_base64(b"hello"));
        assert_eq!(from_base64(Format::Cbor, &text)?, b"hello");
        assert!(from_base64(Format::Cbor, "not base64!").is_err());
        Ok(())
    }
}
