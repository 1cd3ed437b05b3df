use serde::Serialize;
use thiserror::Error;

/// One problem found while tokenizing or parsing a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{file}:{line}:{column}: error: {message}")]
pub struct Diagnostic {
    pub file:    String,
    pub line:    u32,
    pub column:  u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: &str, line: u32, column: u32, message: impl Into<String>) -> Self {
        Diagnostic {
            file: file.to_string(),
            line,
            column,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SpeakError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{file}: rejected with {} error(s)", .diagnostics.len())]
    Rejected {
        file:        String,
        diagnostics: Vec<Diagnostic>,
    },
}
