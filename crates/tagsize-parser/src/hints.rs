// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use tagsize_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("':'", _) => Some("named fields are written as `name: Type`"),

        ("'{'", _) => Some("an enum body starts with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),
        ("'}'", _) => None,
        ("',' or newline", _) => Some("separate variants with a newline or ','"),
        ("',' or '}'", _) => Some("separate named fields with ',' or a newline"),

        ("')'", TokenKind::Eof) => Some("add ')' to close the payload"),
        ("')'", _) => Some("separate payload fields with ','"),

        ("']'", TokenKind::Eof) => Some("add ']' to close the array type"),
        ("';'", _) => Some("array types are written as `[T; N]`"),
        ("a length", _) => Some("array lengths are plain numbers like 4 or 0x10"),

        ("a number", _) => Some("write `bytes(size, align)` with integer literals"),

        ("a name", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("a name", TokenKind::Enum) => Some("'enum' is reserved"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("type", _) => Some("try a type like 'u8', 'f64', '[u32; 4]', '*T' or another enum's name"),

        ("'enum'", _) => Some("each declaration starts with 'enum'"),

        _ => None,
    }
}
