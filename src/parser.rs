//! Parser entry point.
//!
//! The grammar lives in `src/grammar.pest` and is compiled by pest; this
//! module only turns the pair stream into an [`Ast`](crate::ast::Ast) and
//! pest's error value into a plain `path:line:col: message` diagnostic.

use crate::ast::{self, Ast};
use pest::error::LineColLocation;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct CoralParser;

/// Parse failure, displayed as `path:line:col: message`.
#[derive(Debug, Clone, Error)]
#[error("{path}:{line}:{column}: {message}")]
pub struct SyntaxError {
    pub path: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse a whole source string into a syntax tree.
pub fn parse(path: &str, source: &str) -> Result<Ast, SyntaxError> {
    match CoralParser::parse(Rule::program, source) {
        Ok(mut pairs) => match pairs.next() {
            Some(pair) => Ok(ast::build(pair)),
            None => Err(SyntaxError {
                path: path.to_string(),
                line: 1,
                column: 1,
                message: "empty parse result".to_string(),
            }),
        },
        Err(error) => {
            let (line, column) = match error.line_col {
                LineColLocation::Pos(pos) => pos,
                LineColLocation::Span(start, _) => start,
            };
            Err(SyntaxError {
                path: path.to_string(),
                line,
                column,
                message: error.variant.message().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fails(source: &str) -> bool {
        parse("test.co", source).is_err()
    }

    #[test]
    fn test_parse_simple_programs() {
        assert!(parse("test.co", "1 + 2 * 3").is_ok());
        assert!(parse("test.co", "mut x = 1; x = x + 1").is_ok());
        assert!(parse("test.co", "fn(a, b) { a + b }(1, 2)").is_ok());
        assert!(parse("test.co", "if a { 1 } else if b { 2 } else { 3 }").is_ok());
        assert!(parse("test.co", "while i < 10 { i = i + 1 }").is_ok());
        assert!(parse("test.co", "[1, 'two', {three: 3}]").is_ok());
    }

    #[test]
    fn test_comments_are_whitespace() {
        assert!(parse("test.co", "1 /* block */ + 2 # line\n+ 3 // other\n").is_ok());
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        assert!(parse_fails("1 +"));
        assert!(parse_fails("(1"));
        assert!(parse_fails("'unterminated"));
        assert!(parse_fails("fn(a { a }"));
    }

    #[test]
    fn test_error_location_and_format() {
        let error = parse("demo.co", "f(").expect_err("should fail");
        assert_eq!(error.path, "demo.co");
        assert_eq!(error.line, 1);
        let text = error.to_string();
        assert!(text.starts_with("demo.co:1:"), "got: {text}");
    }

    #[test]
    fn test_semicolons_are_optional() {
        assert!(parse("test.co", "1 2 3").is_ok());
        assert!(parse("test.co", "1; 2; 3;").is_ok());
    }
}
