use tracing::trace;

use crate::{
    error::Diagnostic,
    token::{Position, Token, TokenKind, KEYWORDS},
    utils::quote,
};

/// Pull based tokenizer over a single source text.
///
/// Tokens are produced on demand by [`Lexer::next_token`]. The stream ends
/// with exactly one `Eof` token, or with an `Error` token when the input
/// contains something that is not part of the language. Once either has
/// been produced the lexer is pinned and keeps returning that same token.
pub struct Lexer<'a> {
    name:     &'a str,
    input:    &'a str,
    start:    usize,
    pos:      usize,
    finished: Option<Token>,
}

/// Create a lexer for `text`; `name` is used in diagnostics.
pub fn tokenize<'a>(name: &'a str, text: &'a str) -> Lexer<'a> {
    Lexer::new(name, text)
}

impl<'a> Lexer<'a> {
    pub fn new(name: &'a str, input: &'a str) -> Self {
        Lexer {
            name,
            input,
            start: 0,
            pos: 0,
            finished: None,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Scan and return the next token.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = &self.finished {
            return token.clone();
        }
        let token = self.scan();
        trace!(kind = %token.kind, pos = token.pos, text = ?token.text, "token");
        if token.kind.is_terminal() {
            self.finished = Some(token.clone());
        }
        token
    }

    /// 1-based line and column of the byte offset `pos`.
    ///
    /// `\n`, `\r\n` and a lone `\r` each end a line. Columns count
    /// characters, not bytes.
    pub fn location(&self, pos: usize) -> Position {
        let mut end = pos.min(self.input.len());
        while !self.input.is_char_boundary(end) {
            end -= 1;
        }

        let mut line = 1;
        let mut column = 1;
        let mut chars = self.input[..end].chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' if chars.peek() == Some(&'\n') => {}
                '\r' | '\n' => {
                    line += 1;
                    column = 1;
                }
                _ => column += 1,
            }
        }
        Position { line, column }
    }

    /// Build a diagnostic anchored at `token`.
    pub fn diagnostic(&self, token: &Token, message: impl Into<String>) -> Diagnostic {
        let at = self.location(token.pos);
        Diagnostic::new(self.name, at.line, at.column, message)
    }

    fn scan(&mut self) -> Token {
        loop {
            self.start = self.pos;
            let c = match self.bump() {
                Some(c) => c,
                None => return self.emit(TokenKind::Eof),
            };
            match c {
                '/' if self.peek() == Some('/') => {
                    self.eat_while(|c| !is_eol(c));
                }
                c if is_eol(c) => {
                    self.eat_while(is_eol);
                    return self.emit(TokenKind::Eol);
                }
                c if is_space(c) => {
                    self.eat_while(is_space);
                }
                '[' => return self.emit(TokenKind::LeftBracket),
                ']' => return self.emit(TokenKind::RightBracket),
                '.' => return self.emit(TokenKind::Dot),
                ':' => return self.emit(TokenKind::Colon),
                c if is_letter(c) => return self.scan_identifier(),
                c if is_digit(c) => return self.scan_number(),
                c => {
                    return self.error(format!("unrecognized character: U+{:04X} {:?}", c as u32, c));
                }
            }
        }
    }

    // The first letter has already been consumed.
    fn scan_identifier(&mut self) -> Token {
        self.eat_while(is_alphanumeric);
        let kind = KEYWORDS
            .get(self.current())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        self.emit(kind)
    }

    // The first digit has already been consumed.
    fn scan_number(&mut self) -> Token {
        self.eat_while(is_digit);
        let redundant_zero = self.pos - self.start > 1 && self.current().starts_with('0');
        let glued_letter = match self.peek() {
            Some(c) if is_letter(c) => {
                self.bump();
                true
            }
            _ => false,
        };
        if redundant_zero || glued_letter {
            return self.error(format!("bad number syntax: {}", quote(self.current())));
        }
        self.emit(TokenKind::Number)
    }

    fn current(&self) -> &'a str {
        &self.input[self.start..self.pos]
    }

    fn emit(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.start, self.current())
    }

    fn error(&self, description: String) -> Token {
        Token::new(TokenKind::Error, self.start, description)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

/// Yields every token up to and including the terminating `Eof` or `Error`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished.is_some() {
            return None;
        }
        Some(self.next_token())
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_eol(c: char) -> bool {
    c == '\r' || c == '\n'
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_alphanumeric(c: char) -> bool {
    is_letter(c) || is_digit(c)
}
