use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use std::io::{self, Write};
use std::ops::Range;

use crate::token::Span;

/// A syntax diagnostic collected by the parser. Parsing keeps going after
/// one of these is recorded; `Display` renders only the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(span: Span, message: String) -> Self {
        Self { message, span }
    }

    /// Writes an ariadne report pointing at the offending token.
    pub fn write_report<W: Write>(
        &self,
        source: &str,
        filename: Option<&str>,
        color: bool,
        out: W,
    ) -> io::Result<()> {
        let filename = filename.unwrap_or("<repl>");
        let range = self.label_range(source);

        Report::build(ReportKind::Error, filename, range.start)
            .with_config(Config::default().with_color(color))
            .with_message(format!("Parse Error: {}", self.message))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), out)
    }

    /// The span as a char range for ariadne, which indexes its `Source` by
    /// char. Widened to one char so EOF diagnostics still get a label.
    pub fn label_range(&self, source: &str) -> Range<usize> {
        let char_len = source.chars().count();
        if char_len == 0 {
            return 0..0;
        }
        let start = char_offset(source, self.span.start).min(char_len - 1);
        let end = char_offset(source, self.span.end).clamp(start + 1, char_len);
        start..end
    }

    pub fn report(&self, source: &str, filename: Option<&str>, color: bool) {
        if let Err(error) = self.write_report(source, filename, color, io::stderr()) {
            tracing::warn!(%error, "failed to write diagnostic");
        }
    }
}

fn char_offset(source: &str, byte: usize) -> usize {
    source
        .char_indices()
        .take_while(|&(index, _)| index < byte)
        .count()
}

/// Host-level failures of the runner and CLI. Language-level runtime errors
/// are ordinary values; they only become a `CmmError` at the process edge.
#[derive(Debug, thiserror::Error)]
pub enum CmmError {
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{count} syntax error(s) found")]
    Parse { count: usize },
    #[error("{message}")]
    Runtime { message: String },
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}
