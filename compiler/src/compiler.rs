use std::fs;
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::{
    error::{Diagnostic, SpeakError},
    parser::{Parsed, Parser},
    tokenizer::tokenize,
    types::SourceFile,
};

/// Parse one source text. `name` is used in diagnostics.
#[instrument(skip(text), fields(len = text.len()))]
pub fn parse_text(name: &str, text: &str) -> Parsed {
    let parsed = Parser::new(tokenize(name, text)).parse();
    debug!(
        declarations = parsed.file.declarations.len(),
        diagnostics = parsed.diagnostics.len(),
        "parsed file"
    );
    parsed
}

/// Read `path` as UTF-8 and parse it. A read failure is reported as a
/// single diagnostic.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_file(path: impl AsRef<Path>) -> Parsed {
    let path = path.as_ref();
    let name = path.display().to_string();
    match fs::read_to_string(path) {
        Ok(text) => parse_text(&name, &text),
        Err(err) => {
            warn!(error = %err, "cannot read source file");
            Parsed {
                file:        SourceFile::new(&name),
                diagnostics: vec![Diagnostic::new(&name, 0, 0, err.to_string())],
            }
        }
    }
}

impl Parsed {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// The AST of an accepted file, or every diagnostic of a rejected one.
    pub fn into_result(self) -> Result<SourceFile, SpeakError> {
        if self.diagnostics.is_empty() {
            Ok(self.file)
        } else {
            Err(SpeakError::Rejected {
                file:        self.file.name,
                diagnostics: self.diagnostics,
            })
        }
    }
}
