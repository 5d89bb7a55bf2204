//! Lexer (tokenizer) for the component description language.

use crate::error::{CompileError, Result};

use super::ast::Section;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text (string literals without their quotes)
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A name or keyword
    Identifier,
    /// An integer or floating point literal
    Number,
    /// A double-quoted string literal
    Str,
    /// A `### <title>` section header
    Section,
    /// Complement marker '*'
    Star,
    /// '+'
    Plus,
    /// '->'
    Arrow,
    /// ':'
    Colon,
    /// '='
    Equals,
    /// ','
    Comma,
    /// '('
    OpenParen,
    /// ')'
    CloseParen,
    /// '['
    OpenBracket,
    /// ']'
    CloseBracket,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Human-readable token class for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "a name",
            TokenKind::Number => "a number",
            TokenKind::Str => "a quoted string",
            TokenKind::Section => "a section header",
            TokenKind::Star => "'*'",
            TokenKind::Plus => "'+'",
            TokenKind::Arrow => "'->'",
            TokenKind::Colon => "':'",
            TokenKind::Equals => "'='",
            TokenKind::Comma => "','",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::OpenBracket => "'['",
            TokenKind::CloseBracket => "']'",
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of file",
        }
    }
}

/// Lexer for tokenizing component descriptions.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    line_has_only_blanks: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            line_has_only_blanks: true,
        }
    }

    /// Tokenize the whole input, ending with an `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        let token = self.lex_token()?;
        if !matches!(token.kind, TokenKind::Newline | TokenKind::Eof) {
            self.line_has_only_blanks = false;
        }
        Ok(token)
    }

    fn lex_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            if self.chars.peek() != Some(&'#') {
                break;
            }
            let at_line_start = self.line_has_only_blanks;
            let (line, column) = (self.line, self.column);
            let comment = self.read_to_end_of_line();
            if at_line_start {
                if let Some(section) = section_title(&comment) {
                    return Ok(Token {
                        kind: TokenKind::Section,
                        text: section.title().to_string(),
                        line,
                        column,
                    });
                }
            }
        }

        let (line, column) = (self.line, self.column);
        let token = |kind: TokenKind, text: &str| Token {
            kind,
            text: text.to_string(),
            line,
            column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(token(TokenKind::Eof, "")),
        };

        let single = match ch {
            '\n' => Some(TokenKind::Newline),
            '*' => Some(TokenKind::Star),
            '+' => Some(TokenKind::Plus),
            ':' => Some(TokenKind::Colon),
            '=' => Some(TokenKind::Equals),
            ',' => Some(TokenKind::Comma),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Ok(token(kind, &ch.to_string()));
        }

        match ch {
            '-' => {
                self.advance();
                if self.chars.peek() == Some(&'>') {
                    self.advance();
                    Ok(token(TokenKind::Arrow, "->"))
                } else {
                    Err(CompileError::syntax(line, column, "'->'", "'-'"))
                }
            }
            '"' => {
                self.advance();
                let mut text = String::new();
                loop {
                    match self.chars.peek().copied() {
                        Some('"') => {
                            self.advance();
                            return Ok(token(TokenKind::Str, &text));
                        }
                        Some('\n') | None => {
                            return Err(CompileError::syntax(
                                line,
                                column,
                                "closing '\"'",
                                "end of line",
                            ));
                        }
                        Some(c) => {
                            text.push(c);
                            self.advance();
                        }
                    }
                }
            }
            '0'..='9' => {
                let text = self.read_number();
                Ok(token(TokenKind::Number, &text))
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                Ok(token(TokenKind::Identifier, &text))
            }
            _ => Err(CompileError::syntax(
                line,
                column,
                "a token",
                format!("unexpected character '{ch}'"),
            )),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
            self.line_has_only_blanks = true;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_to_end_of_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        text
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();
        self.read_digits(&mut text);

        // Decimal part
        if self.chars.peek() == Some(&'.') {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent part
        if let Some(&ch) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                text.push(ch);
                self.advance();
                if let Some(&sign) = self.chars.peek() {
                    if sign == '-' || sign == '+' {
                        text.push(sign);
                        self.advance();
                    }
                }
                self.read_digits(&mut text);
            }
        }

        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }
}

/// Recognize `### <title>` section headers; anything else is a plain comment.
fn section_title(comment: &str) -> Option<Section> {
    let title = comment.strip_prefix("###")?;
    let normalized = title.split_whitespace().collect::<Vec<_>>().join(" ");
    Section::from_title(&normalized)
}
