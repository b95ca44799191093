//! Parsers module for docstring extraction
//!
//! A parser turns the text of one source file into a [`ModuleOutline`]:
//! the file docstring, its top-level functions and classes, and the
//! methods of those classes. Syntax errors are reported as errors; a unit
//! without a docstring is not an error at this level.

pub mod docstring;
mod python;

pub use python::PythonParser;

use crate::models::{Language, ModuleOutline};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to initialize parser: {0}")]
    InitError(String),

    #[error("Failed to parse source code: {0}")]
    ParseError(String),

    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },
}

/// Trait for language-specific docstring parsers
pub trait DocParser {
    /// Get the language this parser handles
    fn language(&self) -> Language;

    /// Parse source code and extract the documentable units
    fn parse_module(&mut self, source: &str) -> Result<ModuleOutline, ParserError>;
}

/// Create a parser for the specified language
pub fn create_parser(language: &Language) -> Result<Box<dyn DocParser>, ParserError> {
    match language {
        Language::Python => Ok(Box::new(PythonParser::new()?)),
    }
}

/// Convert `\r\n` and lone `\r` line endings to `\n`
pub fn normalize_newlines(source: &str) -> String {
    if !source.contains('\r') {
        return source.to_string();
    }
    source.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_parser() {
        let parser = create_parser(&Language::Python).unwrap();
        assert_eq!(parser.language(), Language::Python);
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize_newlines("plain\n"), "plain\n");
    }
}
