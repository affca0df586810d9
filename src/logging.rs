use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "TRANSCRIBE_LOG";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// Use when stdout carries transcribed output.
    #[default]
    Stderr,
    Stdout,
}

impl LogOutput {
    /// Keep logs off the stream that carries the output: stderr while printing, stdout
    /// once the output goes to a file.
    pub fn away_from(output_is_stdout: bool) -> Self {
        if output_is_stdout {
            LogOutput::Stderr
        } else {
            LogOutput::Stdout
        }
    }

    fn writer(self) -> BoxMakeWriter {
        match self {
            LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
            LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        }
    }
}

/// Initialize structured JSON logging on `output`.
///
/// Defaults to `error` level unless overridden by `TRANSCRIBE_LOG`. Only the first call
/// installs a subscriber.
pub fn init(output: LogOutput) {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV)
        .with_default_directive(tracing::level_filters::LevelFilter::ERROR.into())
        .from_env_lossy();

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(output.writer())
        .with_current_span(true)
        .with_span_list(true);

    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        tracing::debug!(?output, "logging already initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(LogOutput::Stderr);
        init(LogOutput::Stdout);
    }

    #[test]
    fn logs_avoid_the_output_stream() {
        assert_eq!(LogOutput::away_from(true), LogOutput::Stderr);
        assert_eq!(LogOutput::away_from(false), LogOutput::Stdout);
        assert_eq!(LogOutput::default(), LogOutput::Stderr);
    }
}
