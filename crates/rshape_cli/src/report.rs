//! Rendering diagnostics with source snippets through miette.

use std::fmt;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, Severity, SourceCode, SourceSpan};
use rshape_diagnostics::{Diagnostic, DiagnosticCategory};
use rshape_resolver::FileSystem;

/// A [`Diagnostic`] paired with the text of the file it points into.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SourceDiagnostic {
    message: String,
    code: String,
    severity: Severity,
    help: Option<String>,
    source_code: Option<NamedSource<String>>,
    span: Option<SourceSpan>,
    related: Vec<SourceDiagnostic>,
}

impl SourceDiagnostic {
    pub fn new(diagnostic: &Diagnostic, fs: &impl FileSystem) -> Self {
        let text = diagnostic.file.as_deref().and_then(|file| fs.read_file(file).map(|text| (file, text)));
        // Spans of errors inside a standalone type expression do not point
        // into the file.
        let span = match (&text, diagnostic.span) {
            (Some((_, text)), Some(span)) if span.end() as usize <= text.len() => Some(SourceSpan::from(span.to_range())),
            _ => None,
        };
        Self {
            message: diagnostic.message_text.clone(),
            code: diagnostic.code_string(),
            severity: match diagnostic.category {
                DiagnosticCategory::Error => Severity::Error,
                DiagnosticCategory::Warning => Severity::Warning,
                DiagnosticCategory::Message => Severity::Advice,
            },
            help: diagnostic.help.clone(),
            source_code: text.map(|(file, text)| NamedSource::new(file, text)),
            span,
            related: diagnostic.related_information.iter().map(|related| Self::new(related, fs)).collect(),
        }
    }
}

impl miette::Diagnostic for SourceDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(&self.code))
    }

    fn severity(&self) -> Option<Severity> {
        Some(self.severity)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.as_ref().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.source_code.as_ref().map(|source| source as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let span = self.span?;
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(None, span))))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn miette::Diagnostic> + 'a>> {
        if self.related.is_empty() {
            return None;
        }
        Some(Box::new(self.related.iter().map(|related| related as &dyn miette::Diagnostic)))
    }
}

/// Render a diagnostic as a report with a source snippet.
pub fn render(diagnostic: &Diagnostic, fs: &impl FileSystem, color: bool) -> String {
    let theme = if color { GraphicalTheme::unicode() } else { GraphicalTheme::unicode_nocolor() };
    let handler = GraphicalReportHandler::new_themed(theme).with_width(120);
    let mut out = String::new();
    if handler.render_report(&mut out, &SourceDiagnostic::new(diagnostic, fs)).is_err() {
        // Fall back to the one-line form.
        return format!("{diagnostic}\n");
    }
    out
}
