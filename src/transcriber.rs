use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::dispatch::{self, Target};
use crate::error::Result;
use crate::input::Input;
use crate::reflector::{DefaultReflector, Reflector};
use crate::sink::Destination;
use crate::terminal::Terminal;

/// Immutable transcription settings.
///
/// Every `with_*` method returns a new `Transcriber` and leaves the receiver untouched, so a
/// configured value can be shared as a template (it is `Send + Sync` and cheap to clone).
///
/// The zero value has an empty indent, every flag off, no reflector and a plain terminal.
///
/// Terminal mode (`pretty`) replaces the configured indent with the terminal's, forces a
/// trailing newline on text output, and colorizes YAML and JSON when the terminal supports
/// it.
#[derive(Clone, Default)]
pub struct Transcriber {
    indent: String,
    strict: bool,
    pretty: bool,
    base64: bool,
    in_place: bool,
    reflector: Option<Arc<dyn Reflector>>,
    terminal: Terminal,
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("indent", &self.indent)
            .field("strict", &self.strict)
            .field("pretty", &self.pretty)
            .field("base64", &self.base64)
            .field("in_place", &self.in_place)
            .field("custom_reflector", &self.reflector.is_some())
            .field("terminal", &self.terminal)
            .finish()
    }
}

impl Transcriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent used by YAML, JSON, XML and the debug dump outside terminal mode.
    ///
    /// YAML and XML documents only use the length of the string.
    pub fn with_indent(&self, indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
            ..self.clone()
        }
    }

    pub fn with_indent_spaces(&self, spaces: usize) -> Self {
        self.with_indent(" ".repeat(spaces))
    }

    /// Check YAML output against the reflector's strict document rules before encoding.
    pub fn with_strict(&self, strict: bool) -> Self {
        Self {
            strict,
            ..self.clone()
        }
    }

    /// Terminal mode.
    pub fn with_pretty(&self, pretty: bool) -> Self {
        Self {
            pretty,
            ..self.clone()
        }
    }

    /// Write CBOR and MessagePack as base64 text instead of raw bytes.
    pub fn with_base64(&self, base64: bool) -> Self {
        Self {
            base64,
            ..self.clone()
        }
    }

    /// Let XML and XJSON preparation consume a `&mut Value` input instead of a copy.
    pub fn with_in_place(&self, in_place: bool) -> Self {
        Self {
            in_place,
            ..self.clone()
        }
    }

    pub fn with_reflector(&self, reflector: impl Reflector + 'static) -> Self {
        Self {
            reflector: Some(Arc::new(reflector)),
            ..self.clone()
        }
    }

    /// The terminal environment consulted in terminal mode.
    pub fn with_terminal(&self, terminal: Terminal) -> Self {
        Self {
            terminal,
            ..self.clone()
        }
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn pretty(&self) -> bool {
        self.pretty
    }

    pub fn base64(&self) -> bool {
        self.base64
    }

    pub fn in_place(&self) -> bool {
        self.in_place
    }

    /// The configured reflector, or the default one.
    pub fn reflector(&self) -> &dyn Reflector {
        match &self.reflector {
            Some(reflector) => reflector.as_ref(),
            None => &DefaultReflector,
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    /// The indent actually used: the terminal's in terminal mode, the configured one
    /// otherwise.
    pub fn effective_indent(&self) -> String {
        if self.pretty {
            self.terminal.indent()
        } else {
            self.indent.clone()
        }
    }

    pub(crate) fn effective_indent_width(&self) -> usize {
        if self.pretty {
            self.terminal.indent_spaces()
        } else {
            self.indent.len()
        }
    }

    pub(crate) fn colorizes(&self) -> bool {
        self.pretty && self.terminal.colorize()
    }

    /// Transcribe `input` to `destination` in `format`.
    ///
    /// Strings and XML documents ignore `format`. For values, the format tag and any
    /// preparation are resolved before the destination is opened, so an unsupported format
    /// never creates a file. An I/O error part way through may leave partial output.
    pub fn write<'a>(
        &self,
        input: impl Into<Input<'a>>,
        destination: Destination<'_>,
        format: &str,
    ) -> Result<()> {
        let bytes = dispatch::render(self, input.into(), format, Target::Stream)?;
        let mut sink = destination.open()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        tracing::trace!(bytes = bytes.len(), "wrote output");
        Ok(())
    }

    /// Transcribe into a caller-provided stream.
    pub fn write_to<'a>(
        &self,
        input: impl Into<Input<'a>>,
        stream: &mut dyn Write,
        format: &str,
    ) -> Result<()> {
        self.write(input, Destination::Stream(stream), format)
    }

    /// Transcribe into a file, creating parent directories and truncating any existing file.
    pub fn write_to_file<'a>(
        &self,
        input: impl Into<Input<'a>>,
        path: impl AsRef<Path>,
        format: &str,
    ) -> Result<()> {
        self.write(input, Destination::File(path.as_ref()), format)
    }

    /// Transcribe to stdout.
    pub fn print<'a>(&self, input: impl Into<Input<'a>>, format: &str) -> Result<()> {
        self.write(input, Destination::Stdout, format)
    }

    /// Write to `output` when given, otherwise print.
    ///
    /// File output turns terminal mode off but keeps the terminal's indent.
    pub fn write_or_print<'a>(
        &self,
        input: impl Into<Input<'a>>,
        format: &str,
        output: Option<&Path>,
    ) -> Result<()> {
        match output {
            Some(path) => {
                tracing::debug!(path = %path.display(), format, "writing to file");
                self.with_pretty(false)
                    .with_indent(self.terminal.indent())
                    .write_to_file(input, path, format)
            }
            None => self.print(input, format),
        }
    }

    /// Transcribe into a string.
    ///
    /// CBOR and MessagePack are always base64 text here, without a trailing newline. JSON
    /// without an indent has its trailing newline trimmed.
    pub fn stringify<'a>(&self, input: impl Into<Input<'a>>, format: &str) -> Result<String> {
        dispatch::render_string(self, input.into(), format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Map, Value};
    use crate::xml::XmlElement;

    struct UppercaseStrings;

    impl Reflector for UppercaseStrings {
        fn prepare_for_xml(&self, value: Value) -> Result<XmlElement> {
            Ok(XmlElement::new("custom").with_text(value.as_str().unwrap_or("").to_uppercase()))
        }
    }

    #[test]
    fn setters_leave_the_receiver_untouched() {
        let base = Transcriber::new();
        let indented = base.with_indent("  ");
        let strict = indented.with_strict(true);

        assert_eq!(base.indent(), "");
        assert!(!indented.strict());
        assert!(strict.strict());
        assert_eq!(strict.indent(), "  ");
    }

    #[test]
    fn zero_value_has_everything_off() {
        let t = Transcriber::new();
        assert_eq!(t.indent(), "");
        assert!(!t.strict() && !t.pretty() && !t.base64() && !t.in_place());
        assert_eq!(t.terminal(), &Terminal::default());
    }

    #[test]
    fn pretty_uses_the_terminal_indent() {
        let t = Transcriber::new()
            .with_indent("\t")
            .with_terminal(Terminal::plain(4));
        assert_eq!(t.effective_indent(), "\t");
        assert_eq!(t.with_pretty(true).effective_indent(), "    ");
        assert!(!t.with_pretty(true).colorizes());
        assert!(
            t.with_terminal(Terminal::colored(2))
                .with_pretty(true)
                .colorizes()
        );
    }

    #[test]
    fn transcriber_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transcriber>();
    }

    #[test]
    fn custom_reflector_is_used_for_xml() -> anyhow::Result<()> {
        let t = Transcriber::new().with_reflector(UppercaseStrings);
        let mut map = Map::new();
        map.insert("k", "v");
        let out = t.stringify(Value::Map(map), "xml")?;
        assert!(out.ends_with("<custom></custom>\n"), "{out}");
        Ok(())
    }

    #[test]
    fn write_to_stream() -> anyhow::Result<()> {
        let mut buf = Vec::new();
        Transcriber::new().write_to(&Value::List(vec![1.into()]), &mut buf, "json")?;
        assert_eq!(buf, b"[1]\n");
        Ok(())
    }
}
