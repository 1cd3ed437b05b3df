use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use serde::Serialize;

/// The built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicType {
    Bool,
    Byte,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
}

impl BasicType {
    pub const ALL: [BasicType; 13] = [
        BasicType::Bool,
        BasicType::Byte,
        BasicType::Int8,
        BasicType::Int16,
        BasicType::Int32,
        BasicType::Int64,
        BasicType::Uint8,
        BasicType::Uint16,
        BasicType::Uint32,
        BasicType::Uint64,
        BasicType::Float32,
        BasicType::Float64,
        BasicType::String,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BasicType::Bool    => "bool",
            BasicType::Byte    => "byte",
            BasicType::Int8    => "int8",
            BasicType::Int16   => "int16",
            BasicType::Int32   => "int32",
            BasicType::Int64   => "int64",
            BasicType::Uint8   => "uint8",
            BasicType::Uint16  => "uint16",
            BasicType::Uint32  => "uint32",
            BasicType::Uint64  => "uint64",
            BasicType::Float32 => "float32",
            BasicType::Float64 => "float64",
            BasicType::String  => "string",
        }
    }

    pub fn from_keyword(text: &str) -> Option<BasicType> {
        BasicType::ALL.iter().copied().find(|t| t.as_str() == text)
    }

    /// Width of the value in bytes, or `None` for variable length strings.
    /// `byte` is stored exactly like `uint8`.
    pub fn width(self) -> Option<u8> {
        match self {
            BasicType::Bool | BasicType::Byte | BasicType::Int8 | BasicType::Uint8 => Some(1),
            BasicType::Int16 | BasicType::Uint16 => Some(2),
            BasicType::Int32 | BasicType::Uint32 | BasicType::Float32 => Some(4),
            BasicType::Int64 | BasicType::Uint64 | BasicType::Float64 => Some(8),
            BasicType::String => None,
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-based line and column in a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    pub line:   u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Error,
    Identifier,
    Number,
    Eol,
    Eof,
    LeftBracket,
    RightBracket,
    Dot,
    Colon,
    // Reserved words
    Package,
    Type,
    Enum,
    Message,
    Choice,
    End,
    Basic(BasicType),
}

impl TokenKind {
    pub fn is_basic_type(self) -> bool {
        matches!(self, TokenKind::Basic(_))
    }

    /// Keywords that start a top-level declaration.
    pub fn is_declaration_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Package | TokenKind::Type | TokenKind::Enum | TokenKind::Message | TokenKind::Choice
        )
    }

    /// Kinds after which the token stream has ended.
    pub fn is_terminal(self) -> bool {
        matches!(self, TokenKind::Eof | TokenKind::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Error        => "<error>",
            TokenKind::Identifier   => "<identifier>",
            TokenKind::Number       => "<number>",
            TokenKind::Eol          => "<eol>",
            TokenKind::Eof          => "<eof>",
            TokenKind::LeftBracket  => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Dot          => ".",
            TokenKind::Colon        => ":",
            TokenKind::Package      => "package",
            TokenKind::Type         => "type",
            TokenKind::Enum         => "enum",
            TokenKind::Message      => "message",
            TokenKind::Choice       => "choice",
            TokenKind::End          => "end",
            TokenKind::Basic(t)     => t.as_str(),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static! {
    /// Reserved words and basic type names. Identifiers never shadow these.
    pub static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut map = HashMap::new();
        map.insert("package", TokenKind::Package);
        map.insert("type",    TokenKind::Type);
        map.insert("enum",    TokenKind::Enum);
        map.insert("message", TokenKind::Message);
        map.insert("choice",  TokenKind::Choice);
        map.insert("end",     TokenKind::End);
        for basic in BasicType::ALL {
            map.insert(basic.as_str(), TokenKind::Basic(basic));
        }
        map
    };
}

/// A classified fragment of the input.
///
/// `pos` is the byte offset of the first character. For `Error` tokens
/// `text` holds the description of the problem instead of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos:  usize,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: usize, text: impl Into<String>) -> Self {
        Token { kind, pos, text: text.into() }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Error | TokenKind::Identifier | TokenKind::Number => f.write_str(&self.text),
            kind => f.write_str(kind.as_str()),
        }
    }
}
