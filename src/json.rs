use std::io::Write;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::value::Value;

/// Encode `value` as JSON followed by a newline.
///
/// An empty `indent` writes compact JSON. Otherwise each nesting level is indented by the
/// literal `indent` string, which may contain tabs.
///
/// Integer and boolean mapping keys are written as strings; compound keys are an encode
/// error. Non-finite floats become `null`.
pub fn encode<W: Write>(mut w: W, value: &Value, indent: &str) -> Result<()> {
    if indent.is_empty() {
        serde_json::to_writer(&mut w, value)?;
    } else {
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = Serializer::with_formatter(&mut w, formatter);
        value.serialize(&mut serializer)?;
    }
    w.write_all(b"\n")?;
    Ok(())
}
