// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for enum description files.
//!
//! Transforms a token stream into enum declarations.

mod hints;
mod parser;

pub use parser::{ParseError, ParseErrorKind, ParseResult, Parser, MAX_TYPE_DEPTH};

/// Lex and parse in one go. Lex errors are not included; callers that
/// care about them should run the lexer themselves.
pub fn parse_source(source: &str) -> ParseResult {
    let lex_result = tagsize_lexer::Lexer::new(source).tokenize();
    Parser::new(lex_result.tokens).parse()
}
