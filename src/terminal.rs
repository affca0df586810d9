use std::io::IsTerminal;

use colored::control::ShouldColorize;

/// Environment variable that overrides the terminal's preferred indent width.
pub const INDENT_SPACES_ENV: &str = "TRANSCRIBE_INDENT_SPACES";

const DEFAULT_INDENT_SPACES: usize = 2;

/// What we know about the terminal that terminal-mode output is meant for.
///
/// This is an explicit value rather than process-wide state: a `Transcriber` carries one and
/// consults it at call time, so output only depends on what the caller handed us.
///
/// The default is a plain terminal (no color, two-space indent). Binaries that print to a
/// real console should use [`Terminal::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    colorize: bool,
    indent_spaces: usize,
}

impl Default for Terminal {
    fn default() -> Self {
        Self::plain(DEFAULT_INDENT_SPACES)
    }
}

impl Terminal {
    pub fn new(colorize: bool, indent_spaces: usize) -> Self {
        Self {
            colorize,
            indent_spaces,
        }
    }

    /// A terminal that does not support ANSI colors.
    pub fn plain(indent_spaces: usize) -> Self {
        Self::new(false, indent_spaces)
    }

    /// A terminal that supports ANSI colors.
    pub fn colored(indent_spaces: usize) -> Self {
        Self::new(true, indent_spaces)
    }

    /// Inspect stdout and the environment.
    ///
    /// Colors are enabled when stdout is a terminal and the `NO_COLOR` / `CLICOLOR` /
    /// `CLICOLOR_FORCE` conventions allow it. The indent comes from
    /// `TRANSCRIBE_INDENT_SPACES` when set to a number.
    pub fn detect() -> Self {
        let env = ShouldColorize::from_env();
        let colorize = std::io::stdout().is_terminal() && env.should_colorize();

        let indent_spaces = std::env::var(INDENT_SPACES_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_INDENT_SPACES);

        tracing::debug!(colorize, indent_spaces, "detected terminal");
        Self::new(colorize, indent_spaces)
    }

    /// Whether ANSI colorization is supported.
    pub fn colorize(&self) -> bool {
        self.colorize
    }

    /// Preferred indent width.
    pub fn indent_spaces(&self) -> usize {
        self.indent_spaces
    }

    /// Preferred indent as a whitespace string.
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_spaces)
    }
}
