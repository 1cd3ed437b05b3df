use tracing::debug;

use crate::{
    error::Diagnostic,
    token::{Position, Token, TokenKind},
    tokenizer::Lexer,
    types::{
        ArraySpec, BasicType, Choice, ChoiceField, Declaration, Enum, EnumField, FieldType,
        Message, MessageField, PackageDecl, QualifiedTypeRef, SourceFile, TypeAlias,
    },
    utils::quote,
};

/// Returned by a production once its diagnostic has been recorded.
#[derive(Debug)]
struct Abort;

type PResult<T> = Result<T, Abort>;

/// Semantic token test used by `expect_matching`. Returns what was expected
/// when the token does not match.
type Matcher = fn(&Token) -> Result<(), &'static str>;

fn match_capitalized(token: &Token) -> Result<(), &'static str> {
    match token.text.as_bytes().first() {
        Some(c) if token.kind == TokenKind::Identifier && c.is_ascii_uppercase() => Ok(()),
        _ => Err("expected capitalized identifier"),
    }
}

fn match_lowercase(token: &Token) -> Result<(), &'static str> {
    match token.text.as_bytes().first() {
        Some(c) if token.kind == TokenKind::Identifier && c.is_ascii_lowercase() => Ok(()),
        _ => Err("expected lowercase identifier"),
    }
}

fn found(token: &Token) -> String {
    format!("found {}", quote(&token.to_string()))
}

fn describe_kind(kind: TokenKind) -> String {
    let text = kind.as_str();
    if text.starts_with('<') {
        text.to_string()
    } else {
        quote(text)
    }
}

/// Output of parsing one file. The file is accepted only when
/// `diagnostics` is empty.
#[derive(Debug)]
pub struct Parsed {
    pub file:        SourceFile,
    pub diagnostics: Vec<Diagnostic>,
}

/// Recursive descent parser with one token of lookahead.
///
/// Syntax errors are collected and parsing resumes at the next line, so one
/// pass reports every independent mistake. A lexical error ends the file.
pub struct Parser<'a> {
    lexer:       Lexer<'a>,
    prev:        Token,
    next:        Token,
    diagnostics: Vec<Diagnostic>,
    package:     Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut parser = Parser {
            lexer,
            // Acts as the line break before the first declaration.
            prev:        Token::new(TokenKind::Eol, 0, ""),
            next:        Token::new(TokenKind::Eof, 0, ""),
            diagnostics: Vec::new(),
            package:     None,
        };
        parser.next = parser.pull();
        parser
    }

    pub fn parse(mut self) -> Parsed {
        let mut file = SourceFile::new(self.lexer.name());

        loop {
            let decl = match self.next.kind {
                TokenKind::Eol => {
                    self.consume();
                    continue;
                }
                TokenKind::Eof | TokenKind::Error => break,
                TokenKind::Package => self.parse_package().map(|d| Some(Declaration::Package(d))),
                TokenKind::Type    => self.parse_type_alias().map(|d| Some(Declaration::TypeAlias(d))),
                TokenKind::Enum    => self.parse_enum().map(|d| d.map(Declaration::Enum)),
                TokenKind::Choice  => self.parse_choice().map(|d| d.map(Declaration::Choice)),
                TokenKind::Message => self.parse_message().map(|d| d.map(Declaration::Message)),
                _ => {
                    let message = format!("unexpected token {}", quote(&self.next.to_string()));
                    Err(self.error_at_next(message))
                }
            };

            match decl {
                Ok(Some(decl)) => {
                    debug!(kind = decl.keyword(), name = decl.name(), "parsed declaration");
                    file.declarations.push(decl);
                }
                // A block with a broken header that still closed with `end`.
                Ok(None) => {}
                Err(Abort) => self.recover(),
            }
        }

        file.package = self.package;
        Parsed {
            file,
            diagnostics: self.diagnostics,
        }
    }

    // ------------------------------------------------------------------------
    // Token cursor

    fn pull(&mut self) -> Token {
        let token = self.lexer.next_token();
        if token.kind == TokenKind::Error {
            let diag = self.lexer.diagnostic(&token, token.text.clone());
            self.diagnostics.push(diag);
        }
        token
    }

    /// Advance by one token. Once `Eof` or `Error` is the lookahead the
    /// cursor stays put.
    fn consume(&mut self) {
        if self.next.kind.is_terminal() {
            self.prev = self.next.clone();
            return;
        }
        let following = self.pull();
        self.prev = std::mem::replace(&mut self.next, following);
    }

    fn accept(&mut self, kind: TokenKind) -> bool {
        if self.next.kind != kind {
            return false;
        }
        self.consume();
        true
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<()> {
        if self.accept(kind) {
            return Ok(());
        }
        let message = format!("expected {}, {}", describe_kind(kind), found(&self.next));
        Err(self.error_at_next(message))
    }

    fn expect_matching(&mut self, matcher: Matcher) -> PResult<()> {
        match matcher(&self.next) {
            Ok(()) => {
                self.consume();
                Ok(())
            }
            Err(expected) => {
                let message = format!("{}, {}", expected, found(&self.next));
                Err(self.error_at_next(message))
            }
        }
    }

    fn error_at_next(&mut self, message: String) -> Abort {
        let token = self.next.clone();
        self.error_at(&token, message)
    }

    fn error_at(&mut self, token: &Token, message: String) -> Abort {
        // Lexical errors were reported when they were pulled.
        if token.kind != TokenKind::Error {
            let diag = self.lexer.diagnostic(token, message);
            self.diagnostics.push(diag);
        }
        Abort
    }

    fn next_pos(&self) -> Position {
        self.lexer.location(self.next.pos)
    }

    /// Skip the rest of the current line, including its EOL.
    fn skip_line(&mut self) {
        while !self.next.kind.is_terminal() {
            let eol = self.next.kind == TokenKind::Eol;
            self.consume();
            if eol {
                break;
            }
        }
    }

    /// Resynchronize the top level after a failed declaration: resume at the
    /// next line, or right here when a declaration keyword starts this line.
    fn recover(&mut self) {
        if self.prev.kind == TokenKind::Eol && self.next.kind.is_declaration_keyword() {
            return;
        }
        self.skip_line();
    }

    // ------------------------------------------------------------------------
    // Shared productions

    fn expect_type_name(&mut self) -> PResult<String> {
        self.expect_matching(match_capitalized)?;
        Ok(self.prev.text.clone())
    }

    fn number_value(&mut self) -> PResult<u32> {
        let token = self.prev.clone();
        token.text.parse::<u32>().map_err(|_| {
            let message = format!("number out of range, {}", found(&token));
            self.error_at(&token, message)
        })
    }

    /// `Number ':'`
    fn parse_tag(&mut self) -> PResult<u32> {
        self.expect(TokenKind::Number)?;
        let tag = self.number_value()?;
        self.expect(TokenKind::Colon)?;
        Ok(tag)
    }

    /// `[ '[' [Number] ']' ]`
    fn parse_array(&mut self) -> PResult<Option<ArraySpec>> {
        if !self.accept(TokenKind::LeftBracket) {
            return Ok(None);
        }
        let spec = if self.accept(TokenKind::Number) {
            ArraySpec::Fixed(self.number_value()?)
        } else {
            ArraySpec::Dynamic
        };
        self.expect(TokenKind::RightBracket)?;
        Ok(Some(spec))
    }

    fn accept_basic_type(&mut self) -> Option<BasicType> {
        match self.next.kind {
            TokenKind::Basic(basic) => {
                self.consume();
                Some(basic)
            }
            _ => None,
        }
    }

    fn expect_basic_type(&mut self) -> PResult<BasicType> {
        if let Some(basic) = self.accept_basic_type() {
            return Ok(basic);
        }
        let message = format!("expected basic type, {}", found(&self.next));
        Err(self.error_at_next(message))
    }

    /// `Identifier ['.' CapIdent]`
    ///
    /// Whether the first identifier is a package or the type name itself is
    /// only known after looking for the dot, so the capitalization of an
    /// unqualified name is checked afterwards.
    fn parse_type_ref(&mut self) -> PResult<QualifiedTypeRef> {
        self.expect(TokenKind::Identifier)?;
        let first = self.prev.clone();
        if self.accept(TokenKind::Dot) {
            let name = self.expect_type_name()?;
            return Ok(QualifiedTypeRef::qualified(first.text, name));
        }
        if let Err(expected) = match_capitalized(&first) {
            let message = format!("{}, {}", expected, found(&first));
            return Err(self.error_at(&first, message));
        }
        Ok(QualifiedTypeRef::local(first.text))
    }

    /// `CapIdent EOL` after a block keyword. On failure the rest of the line
    /// is skipped so the body can still be checked.
    fn parse_block_header(&mut self) -> PResult<String> {
        let header = self
            .expect_type_name()
            .and_then(|name| self.expect(TokenKind::Eol).map(|()| name));
        if header.is_err() {
            self.skip_line();
        }
        header
    }

    /// Field lines up to and including the closing `end`. A bad field line is
    /// reported and skipped.
    fn parse_block_body<T>(
        &mut self,
        keyword: &str,
        name: Option<&str>,
        parse_field: fn(&mut Self) -> PResult<T>,
    ) -> PResult<Vec<T>> {
        let mut fields = Vec::new();
        loop {
            match self.next.kind {
                TokenKind::End => {
                    self.consume();
                    if self.next.kind != TokenKind::Eof {
                        self.expect(TokenKind::Eol)?;
                    }
                    return Ok(fields);
                }
                TokenKind::Eol => self.consume(),
                TokenKind::Error => return Err(Abort),
                kind if kind == TokenKind::Eof || kind.is_declaration_keyword() => {
                    // A broken header has already been reported.
                    let Some(name) = name else {
                        return Err(Abort);
                    };
                    let message = format!(
                        "expected \"end\" to close {} {}, {}",
                        keyword,
                        quote(name),
                        found(&self.next)
                    );
                    return Err(self.error_at_next(message));
                }
                _ => match parse_field(self) {
                    Ok(field) => fields.push(field),
                    Err(Abort) => self.skip_line(),
                },
            }
        }
    }

    // ------------------------------------------------------------------------
    // package

    /// `'package' Identifier EOL`
    fn parse_package(&mut self) -> PResult<PackageDecl> {
        let pos = self.next_pos();
        self.consume();
        self.expect(TokenKind::Identifier)?;
        let name = self.prev.text.clone();
        if let Some(previous) = self.package.replace(name.clone()) {
            debug!(previous = %previous, package = %name, "package declaration overrides previous one");
        }
        self.expect(TokenKind::Eol)?;
        Ok(PackageDecl { name, pos })
    }

    // ------------------------------------------------------------------------
    // type

    /// `'type' CapIdent [ArraySpec] BasicType EOL`
    fn parse_type_alias(&mut self) -> PResult<TypeAlias> {
        let pos = self.next_pos();
        self.consume();
        let name = self.expect_type_name()?;
        let array = self.parse_array()?;
        let basic = self.expect_basic_type()?;
        self.expect(TokenKind::Eol)?;
        Ok(TypeAlias { name, array, basic, pos })
    }

    // ------------------------------------------------------------------------
    // enum

    /// `'enum' CapIdent EOL { field } 'end'`. Yields `None` when the header
    /// was reported as broken but the block still closed.
    fn parse_enum(&mut self) -> PResult<Option<Enum>> {
        let pos = self.next_pos();
        self.consume();
        let name = self.parse_block_header();
        let fields = self.parse_block_body("enum", name.as_deref().ok(), Self::parse_enum_field)?;
        Ok(name.ok().map(|name| Enum { name, fields, pos }))
    }

    /// `Number ':' CapIdent EOL`
    fn parse_enum_field(&mut self) -> PResult<EnumField> {
        let pos = self.next_pos();
        let tag = self.parse_tag()?;
        let name = self.expect_type_name()?;
        self.expect(TokenKind::Eol)?;
        Ok(EnumField { tag, name, pos })
    }

    // ------------------------------------------------------------------------
    // choice

    /// `'choice' CapIdent EOL { field } 'end'`. Yields `None` when the header
    /// was reported as broken but the block still closed.
    fn parse_choice(&mut self) -> PResult<Option<Choice>> {
        let pos = self.next_pos();
        self.consume();
        let name = self.parse_block_header();
        let fields = self.parse_block_body("choice", name.as_deref().ok(), Self::parse_choice_field)?;
        Ok(name.ok().map(|name| Choice { name, fields, pos }))
    }

    /// `Number ':' QualifiedTypeRef EOL`
    fn parse_choice_field(&mut self) -> PResult<ChoiceField> {
        let pos = self.next_pos();
        let tag = self.parse_tag()?;
        let type_ = self.parse_type_ref()?;
        self.expect(TokenKind::Eol)?;
        Ok(ChoiceField { tag, type_, pos })
    }

    // ------------------------------------------------------------------------
    // message

    /// `'message' CapIdent EOL { field } 'end'`. Yields `None` when the header
    /// was reported as broken but the block still closed.
    fn parse_message(&mut self) -> PResult<Option<Message>> {
        let pos = self.next_pos();
        self.consume();
        let name = self.parse_block_header();
        let fields = self.parse_block_body("message", name.as_deref().ok(), Self::parse_message_field)?;
        Ok(name.ok().map(|name| Message { name, fields, pos }))
    }

    /// `Number ':' LowerIdent [ArraySpec] (BasicType | QualifiedTypeRef) EOL`
    fn parse_message_field(&mut self) -> PResult<MessageField> {
        let pos = self.next_pos();
        let tag = self.parse_tag()?;
        self.expect_matching(match_lowercase)?;
        let name = self.prev.text.clone();
        let array = self.parse_array()?;
        let type_ = match self.accept_basic_type() {
            Some(basic) => FieldType::Basic(basic),
            None => FieldType::Named(self.parse_type_ref()?),
        };
        self.expect(TokenKind::Eol)?;
        Ok(MessageField { tag, name, array, type_, pos })
    }
}
