use crate::error::XbError;
use crate::position::{Position, SourceFile, Span};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Literals
    Int,
    Float,
    String,
    Identifier,

    // Operators
    Plus,
    Minus,
    Mul,
    Div,
    Pow,
    Eq,
    EqEq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    Comma,
    Colon,
    Arrow,

    // Type tags
    Num,
    Text,
    List,

    // Keywords
    And,
    Or,
    Not,
    If,
    Elif,
    Else,
    For,
    To,
    Step,
    While,
    Fn,
    Then,
    End,
    Return,
    Continue,
    Break,

    // Special
    Newline,
    Eof,
}

impl TokenType {
    pub fn is_type_tag(&self) -> bool {
        matches!(self, TokenType::Num | TokenType::Text | TokenType::List)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenType::Int => "int",
            TokenType::Float => "float",
            TokenType::String => "string",
            TokenType::Identifier => "identifier",
            TokenType::Plus => "'+'",
            TokenType::Minus => "'-'",
            TokenType::Mul => "'*'",
            TokenType::Div => "'/'",
            TokenType::Pow => "'^'",
            TokenType::Eq => "'='",
            TokenType::EqEq => "'=='",
            TokenType::NotEq => "'!='",
            TokenType::Less => "'<'",
            TokenType::Greater => "'>'",
            TokenType::LessEq => "'<='",
            TokenType::GreaterEq => "'>='",
            TokenType::LeftParen => "'('",
            TokenType::RightParen => "')'",
            TokenType::LeftSquare => "'['",
            TokenType::RightSquare => "']'",
            TokenType::Comma => "','",
            TokenType::Colon => "':'",
            TokenType::Arrow => "'->'",
            TokenType::Num => "'num'",
            TokenType::Text => "'text'",
            TokenType::List => "'list'",
            TokenType::And => "'and'",
            TokenType::Or => "'or'",
            TokenType::Not => "'not'",
            TokenType::If => "'IF'",
            TokenType::Elif => "'ELIF'",
            TokenType::Else => "'ELSE'",
            TokenType::For => "'FOR'",
            TokenType::To => "'TO'",
            TokenType::Step => "'STEP'",
            TokenType::While => "'WHILE'",
            TokenType::Fn => "'FN'",
            TokenType::Then => "'THEN'",
            TokenType::End => "'END'",
            TokenType::Return => "'RETURN'",
            TokenType::Continue => "'CONTINUE'",
            TokenType::Break => "'BREAK'",
            TokenType::Newline => "newline",
            TokenType::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    /// String contents, or the spelling of an identifier or keyword.
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub value: Option<Literal>,
    pub span: Span,
}

impl Token {
    pub fn new(token_type: TokenType, value: Option<Literal>, span: Span) -> Self {
        Self {
            token_type,
            value,
            span,
        }
    }

    /// The spelling of an identifier or keyword, or a string's contents.
    pub fn text(&self) -> &str {
        match &self.value {
            Some(Literal::Text(text)) => text,
            _ => "",
        }
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current: Option<char>,
    tokens: Vec<Token>,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(name: &str, text: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("num", TokenType::Num);
        keywords.insert("text", TokenType::Text);
        keywords.insert("list", TokenType::List);
        keywords.insert("and", TokenType::And);
        keywords.insert("or", TokenType::Or);
        keywords.insert("not", TokenType::Not);
        keywords.insert("IF", TokenType::If);
        keywords.insert("ELIF", TokenType::Elif);
        keywords.insert("ELSE", TokenType::Else);
        keywords.insert("FOR", TokenType::For);
        keywords.insert("TO", TokenType::To);
        keywords.insert("STEP", TokenType::Step);
        keywords.insert("WHILE", TokenType::While);
        keywords.insert("FN", TokenType::Fn);
        keywords.insert("THEN", TokenType::Then);
        keywords.insert("END", TokenType::End);
        keywords.insert("RETURN", TokenType::Return);
        keywords.insert("CONTINUE", TokenType::Continue);
        keywords.insert("BREAK", TokenType::Break);

        let chars: Vec<char> = text.chars().collect();
        let current = chars.first().copied();

        Self {
            chars,
            pos: Position::start_of(SourceFile::new(name, text)),
            current,
            tokens: Vec::new(),
            keywords,
        }
    }

    /// Tokenize the whole input. The first lexical error aborts the scan.
    pub fn make_tokens(mut self) -> Result<Vec<Token>, XbError> {
        while let Some(c) = self.current {
            self.scan_token(c)?;
        }

        let eof = Span::single(&self.pos);
        self.tokens.push(Token::new(TokenType::Eof, None, eof));

        tracing::trace!(
            file = %self.pos.file_name(),
            count = self.tokens.len(),
            "tokenized"
        );
        Ok(self.tokens)
    }

    fn scan_token(&mut self, c: char) -> Result<(), XbError> {
        match c {
            ' ' | '\t' | '\r' => self.advance(),
            '#' => self.skip_comment(),
            ';' | '\n' => self.single(TokenType::Newline),
            '+' => self.single(TokenType::Plus),
            '*' => self.single(TokenType::Mul),
            '/' => self.single(TokenType::Div),
            '^' => self.single(TokenType::Pow),
            '(' => self.single(TokenType::LeftParen),
            ')' => self.single(TokenType::RightParen),
            '[' => self.single(TokenType::LeftSquare),
            ']' => self.single(TokenType::RightSquare),
            ',' => self.single(TokenType::Comma),
            ':' => self.single(TokenType::Colon),
            '-' => self.either('>', TokenType::Arrow, TokenType::Minus),
            '=' => self.either('=', TokenType::EqEq, TokenType::Eq),
            '<' => self.either('=', TokenType::LessEq, TokenType::Less),
            '>' => self.either('=', TokenType::GreaterEq, TokenType::Greater),
            '!' => self.not_equals()?,
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => self.identifier(),
            _ => {
                let span = Span::single(&self.pos);
                return Err(XbError::illegal_char(span, format!("'{}'", c)));
            }
        }

        Ok(())
    }

    fn advance(&mut self) {
        if let Some(c) = self.current {
            self.pos.advance(c);
        }
        self.current = self.chars.get(self.pos.offset).copied();
    }

    fn single(&mut self, token_type: TokenType) {
        let start = self.pos.clone();
        self.advance();
        self.push(token_type, None, start);
    }

    /// `long` if the next character is `second`, otherwise `short`.
    fn either(&mut self, second: char, long: TokenType, short: TokenType) {
        let start = self.pos.clone();
        self.advance();

        let token_type = if self.current == Some(second) {
            self.advance();
            long
        } else {
            short
        };
        self.push(token_type, None, start);
    }

    fn push(&mut self, token_type: TokenType, value: Option<Literal>, start: Position) {
        let span = Span::new(start, self.pos.clone());
        self.tokens.push(Token::new(token_type, value, span));
    }

    // Runs up to, not including, the newline so it still separates statements.
    fn skip_comment(&mut self) {
        while self.current.is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn not_equals(&mut self) -> Result<(), XbError> {
        let start = self.pos.clone();
        self.advance();

        if self.current == Some('=') {
            self.advance();
            self.push(TokenType::NotEq, None, start);
            return Ok(());
        }

        self.advance();
        Err(XbError::expected_char(
            Span::new(start, self.pos.clone()),
            "'=' (after '!')".to_string(),
        ))
    }

    fn number(&mut self) {
        let start = self.pos.clone();
        let mut digits = String::new();
        let mut dot_count = 0;

        while let Some(c) = self.current {
            if c == '.' {
                // A second dot ends the literal
                if dot_count == 1 {
                    break;
                }
                dot_count += 1;
            } else if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.advance();
        }

        let literal = if dot_count == 0 {
            match digits.parse::<i64>() {
                Ok(n) => Some((TokenType::Int, Literal::Int(n))),
                // Too wide for 64 bits
                Err(_) => digits
                    .parse::<f64>()
                    .ok()
                    .map(|n| (TokenType::Float, Literal::Float(n))),
            }
        } else {
            digits
                .parse::<f64>()
                .ok()
                .map(|n| (TokenType::Float, Literal::Float(n)))
        };

        // Digit runs with at most one dot always parse as f64.
        let (token_type, value) = literal.unwrap_or((TokenType::Float, Literal::Float(0.0)));
        self.push(token_type, Some(value), start);
    }

    fn string(&mut self) -> Result<(), XbError> {
        let start = self.pos.clone();
        let mut text = String::new();
        self.advance();

        loop {
            match self.current {
                None => {
                    return Err(XbError::expected_char(
                        Span::new(start, self.pos.clone()),
                        "'\"' (to close string)".to_string(),
                    ));
                }
                Some('"') => break,
                Some('\\') => {
                    self.advance();
                    match self.current {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some(other) => text.push(other),
                        None => continue,
                    }
                }
                Some(c) => text.push(c),
            }
            self.advance();
        }

        // Closing quote
        self.advance();
        self.push(TokenType::String, Some(Literal::Text(text)), start);
        Ok(())
    }

    fn identifier(&mut self) {
        let start = self.pos.clone();
        let mut name = String::new();

        while let Some(c) = self.current.filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            name.push(c);
            self.advance();
        }

        let token_type = self
            .keywords
            .get(name.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);

        self.push(token_type, Some(Literal::Text(name)), start);
    }
}
