use std::fmt;
use std::rc::Rc;

/// A named piece of source text. Shared by every position cut from it.
#[derive(Debug, Default, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: &str, text: &str) -> Rc<Self> {
        Rc::new(Self {
            name: name.to_string(),
            text: text.to_string(),
        })
    }

    /// The text of a zero-based line, without its terminator.
    pub fn line(&self, line: usize) -> &str {
        self.text.split('\n').nth(line).unwrap_or("")
    }
}

/// A cursor into a source file. `offset` counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    pub source: Rc<SourceFile>,
}

impl Position {
    pub fn start_of(source: Rc<SourceFile>) -> Self {
        Self {
            offset: 0,
            line: 0,
            column: 0,
            source,
        }
    }

    /// Step over `current`; a newline moves to the start of the next line.
    pub fn advance(&mut self, current: char) -> &mut Self {
        self.offset += 1;
        self.column += 1;

        if current == '\n' {
            self.line += 1;
            self.column = 0;
        }

        self
    }

    /// A copy of this position moved one character to the right.
    pub fn next(&self) -> Self {
        let mut next = self.clone();
        next.offset += 1;
        next.column += 1;
        next
    }

    pub fn file_name(&self) -> &str {
        &self.source.name
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && self.line == other.line
            && self.column == other.column
            && Rc::ptr_eq(&self.source, &other.source)
    }
}

/// The start and (exclusive) end of the text something was derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span covering the single character at `pos`.
    pub fn single(pos: &Position) -> Self {
        Self {
            start: pos.clone(),
            end: pos.next(),
        }
    }

    /// From the start of `self` to the end of `other`.
    pub fn to(&self, other: &Span) -> Span {
        Span::new(self.start.clone(), other.end.clone())
    }

    /// The covered source text.
    pub fn text(&self) -> String {
        self.start
            .source
            .text
            .chars()
            .skip(self.start.offset)
            .take(self.end.offset.saturating_sub(self.start.offset))
            .collect()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.start.file_name(),
            self.start.line + 1,
            self.start.column + 1
        )
    }
}
