use crate::context::Context;
use crate::position::Span;
use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IllegalChar,
    ExpectedChar,
    InvalidSyntax,
    Runtime,
    /// Faults outside the language itself, such as a failing host stream.
    Internal,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::IllegalChar => "Illegal Character",
            ErrorKind::ExpectedChar => "Expected Character",
            ErrorKind::InvalidSyntax => "Invalid Syntax",
            ErrorKind::Runtime => "Runtime Error",
            ErrorKind::Internal => "Internal Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorKind::IllegalChar | ErrorKind::ExpectedChar => Color::Red,
            ErrorKind::InvalidSyntax => Color::Yellow,
            ErrorKind::Runtime => Color::Magenta,
            ErrorKind::Internal => Color::Blue,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error)]
#[error("{kind}: {details}")]
pub struct XbError {
    pub kind: ErrorKind,
    pub span: Span,
    pub details: String,
    pub help: Option<String>,
    /// The frame active at the failure point. Only runtime errors carry one.
    pub context: Option<Rc<Context>>,
}

impl XbError {
    pub fn new(kind: ErrorKind, span: Span, details: String) -> Self {
        Self {
            kind,
            span,
            details,
            help: None,
            context: None,
        }
    }

    pub fn illegal_char(span: Span, details: String) -> Self {
        Self::new(ErrorKind::IllegalChar, span, details)
    }

    pub fn expected_char(span: Span, details: String) -> Self {
        Self::new(ErrorKind::ExpectedChar, span, details)
    }

    pub fn invalid_syntax(span: Span, details: String) -> Self {
        Self::new(ErrorKind::InvalidSyntax, span, details)
    }

    pub fn invalid_syntax_with_help(span: Span, details: String, help: String) -> Self {
        Self::invalid_syntax(span, details).with_help(help)
    }

    pub fn runtime(span: Span, details: String, context: Option<Rc<Context>>) -> Self {
        Self {
            context,
            ..Self::new(ErrorKind::Runtime, span, details)
        }
    }

    pub fn internal(span: Span, error: io::Error, context: Option<Rc<Context>>) -> Self {
        Self {
            context,
            ..Self::new(ErrorKind::Internal, span, error.to_string())
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// The plain-text diagnostic printed by the shell.
    pub fn as_string(&self) -> String {
        match self.kind {
            ErrorKind::Runtime | ErrorKind::Internal => format!(
                "{}{}: {}\n\n{}",
                self.traceback(),
                self.kind,
                self.details,
                underline(&self.span)
            ),
            _ => format!(
                "{}: {}\nFile {}, line {}\n\n{}",
                self.kind,
                self.details,
                self.span.start.file_name(),
                self.span.start.line + 1,
                underline(&self.span)
            ),
        }
    }

    /// One line per frame, starting at the failure point and walking
    /// outwards through each frame's entry position.
    pub fn traceback(&self) -> String {
        let mut result = String::from("Traceback (most recent call last):\n");
        for frame in self.frames() {
            result.push_str("  ");
            result.push_str(&frame);
            result.push('\n');
        }
        result
    }

    fn frames(&self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut pos = Some(self.span.start.clone());
        let mut context = self.context.clone();

        while let (Some(ctx), Some(at)) = (context, pos) {
            frames.push(format!(
                "File {}, line {}, in {}",
                at.file_name(),
                at.line + 1,
                ctx.display_name
            ));
            pos = ctx.parent_entry_pos.clone();
            context = ctx.parent.clone();
        }

        frames
    }

    /// Render through ariadne to stderr.
    pub fn report(&self) -> io::Result<()> {
        let source = self.span.start.source.clone();
        let filename = source.name.as_str();
        let color = self.kind.color();
        let start = self.span.start.offset;
        let end = self.span.end.offset.max(start);

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", self.kind.name().fg(color), self.details))
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.details)
                    .with_color(color),
            );

        let mut notes = Vec::new();
        if let Some(ref help_text) = self.help {
            notes.push(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }
        if self.context.is_some() {
            notes.push(format!("{}:\n{}", "traceback".fg(Color::Cyan), self.frames().join("\n")));
        }
        if !notes.is_empty() {
            report_builder = report_builder.with_note(notes.join("\n"));
        }

        report_builder
            .finish()
            .eprint((filename, Source::from(source.text.as_str())))
    }
}

/// The source lines covered by `span`, each followed by a caret row under
/// the covered columns.
pub fn underline(span: &Span) -> String {
    let source = &span.start.source;
    let first = span.start.line;
    let last = span.end.line.max(first);

    (first..=last)
        .map(|line| {
            let text = source.line(line);
            let col_start = if line == first { span.start.column } else { 0 };
            let col_end = if line == last {
                span.end.column
            } else {
                text.chars().count()
            };
            format!(
                "{}\n{}{}",
                text,
                " ".repeat(col_start),
                "^".repeat(col_end.saturating_sub(col_start))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SymbolTable;
    use crate::position::{Position, SourceFile};
    use pretty_assertions::assert_eq;

    fn at(source: &Rc<SourceFile>, line: usize, column: usize) -> Position {
        Position {
            offset: column,
            line,
            column,
            source: source.clone(),
        }
    }

    #[test]
    fn syntax_error_layout() {
        let source = SourceFile::new("file.txt", "Some text");
        let error = XbError::invalid_syntax(
            Span::new(at(&source, 0, 0), at(&source, 0, 4)),
            "Expected ')'".to_string(),
        );
        assert_eq!(
            error.as_string(),
            "Invalid Syntax: Expected ')'\nFile file.txt, line 1\n\nSome text\n^^^^"
        );
    }

    #[test]
    fn underline_is_offset_to_the_column() {
        let source = SourceFile::new("f", "first\nnum x = @");
        let span = Span::new(at(&source, 1, 8), at(&source, 1, 9));
        assert_eq!(underline(&span), "num x = @\n        ^");
    }

    #[test]
    fn underline_spans_several_lines() {
        let source = SourceFile::new("f", "IF 1 THEN\nEND");
        let span = Span::new(at(&source, 0, 3), at(&source, 1, 3));
        assert_eq!(underline(&span), "IF 1 THEN\n   ^^^^^^\nEND\n^^^");
    }

    #[test]
    fn traceback_lists_innermost_frame_first() {
        let source = SourceFile::new("file", "a\nb\nc\nd\ne");
        let function1 = Rc::new(Context::new("Function1", None, None, SymbolTable::new()));
        let function2 = Rc::new(Context::new(
            "Function2",
            Some(function1),
            Some(at(&source, 1, 0)),
            SymbolTable::new(),
        ));
        let error = XbError::runtime(
            Span::new(at(&source, 3, 0), at(&source, 3, 1)),
            "Error details".to_string(),
            Some(function2),
        );

        assert_eq!(
            error.traceback(),
            "Traceback (most recent call last):\n  File file, line 4, in Function2\n  File file, line 2, in Function1\n"
        );
        assert_eq!(
            error.as_string(),
            "Traceback (most recent call last):\n  File file, line 4, in Function2\n  File file, line 2, in Function1\nRuntime Error: Error details\n\nd\n^"
        );
    }

    #[test]
    fn display_names_the_kind() {
        let error = XbError::illegal_char(Span::default(), "'@'".to_string());
        assert_eq!(error.to_string(), "Illegal Character: '@'");
    }
}
