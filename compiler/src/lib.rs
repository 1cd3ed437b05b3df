//! speak-compiler
//!
//! Front end for Speak interface definition files:
//!  1) A pull based tokenizer with byte offsets and line/column lookup,
//!  2) A recursive descent parser that collects diagnostics and recovers
//!     at line boundaries,
//!  3) The AST handed to code generators (`types`),
//!  4) A canonical source printer (`Display` on the AST),
//!  5) Error types (`Diagnostic`, `SpeakError`).

pub mod error;
pub mod token;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod printer;
pub mod compiler;

pub use compiler::{parse_file, parse_text};
pub use error::{Diagnostic, SpeakError};
pub use parser::{Parsed, Parser};
pub use tokenizer::{tokenize, Lexer};
