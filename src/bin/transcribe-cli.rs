use anyhow::{Context, Result, bail};
use clap::Parser;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use transcribe::binary::{decode_cbor, decode_messagepack, from_base64};
use transcribe::logging::{self, LogOutput};
use transcribe::{Format, Terminal, Transcriber, Value};

fn main() -> Result<()> {
    let params = get_params()?;
    logging::init(LogOutput::away_from(
        params.output.is_none() || params.validate,
    ));
    let raw = read_input(params.input.as_deref())?;

    if params.validate {
        let text = String::from_utf8(raw).context("input is not valid UTF-8")?;
        transcribe::validate(&text, params.input_format.tag())
            .with_context(|| format!("validating {} input", params.input_format))?;
        println!("valid {}", params.input_format);
        return Ok(());
    }

    if params.input_base64 && !params.input_format.is_binary() {
        bail!("--input-base64 only applies to cbor and messagepack input");
    }
    let value = decode_input(&raw, params.input_format, params.input_base64)?;

    let transcriber = Transcriber::new()
        .with_terminal(Terminal::detect())
        .with_indent_spaces(params.indent)
        .with_strict(params.strict)
        .with_base64(params.base64)
        .with_pretty(params.pretty);

    transcriber
        .write_or_print(value, params.format.tag(), params.output.as_deref())
        .with_context(|| format!("transcribing to {}", params.format))?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "transcribe")]
#[command(about = "Transcribe a value between YAML, JSON, XML, CBOR and MessagePack")]
struct Params {
    /// Input file. Reads stdin when omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    #[arg(long = "input-format", value_enum, default_value_t = Format::Yaml)]
    pub input_format: Format,

    /// Binary input is base64 text rather than raw bytes.
    #[arg(long = "input-base64", default_value_t = false)]
    pub input_base64: bool,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = Format::Yaml)]
    pub format: Format,

    /// Output file. Prints to stdout when omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(long = "indent", default_value_t = 2)]
    pub indent: usize,

    #[arg(long = "strict", default_value_t = false)]
    pub strict: bool,

    /// Write CBOR and MessagePack as base64 text.
    #[arg(short = 'b', long = "base64", default_value_t = false)]
    pub base64: bool,

    /// Terminal mode: terminal indent, trailing newline and colors when supported.
    #[arg(short = 'p', long = "pretty", default_value_t = false)]
    pub pretty: bool,

    /// Only check that the input is well-formed for --input-format.
    #[arg(long = "validate", default_value_t = false)]
    pub validate: bool,
}

fn get_params() -> Result<Params> {
    Ok(Params::parse())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn decode_input(raw: &[u8], format: Format, base64: bool) -> Result<Value> {
    let value = match format {
        Format::Yaml => serde_yaml_ng::from_slice(raw).context("decoding yaml input")?,
        Format::Json | Format::Xjson => {
            serde_json::from_slice(raw).context("decoding json input")?
        }
        Format::Cbor | Format::MessagePack => {
            let bytes = if base64 {
                let text = std::str::from_utf8(raw).context("base64 input is not UTF-8")?;
                from_base64(format, text)?
            } else {
                raw.to_vec()
            };
            if format == Format::Cbor {
                decode_cbor(&bytes)?
            } else {
                decode_messagepack(&bytes)?
            }
        }
        Format::Xml | Format::Go => bail!("{format} is not supported as an input format"),
    };
    Ok(value)
}
