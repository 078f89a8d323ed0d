// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use logos::Logos;
use tagsize_ast::token::{Token, TokenKind};
use tagsize_ast::Span;
use thiserror::Error;

/// Raw token type for logos - numbers are decoded in a second pass.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")] // Horizontal whitespace only; newlines separate variants
enum RawToken {
    #[token("enum")]
    Enum,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("*")]
    Star,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"0x[0-9a-fA-F_]+")]
    HexInt,
    #[regex(r"0b[01_]+")]
    BinInt,
    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,
}

/// Consume a (possibly nested) block comment.
///
/// Returns false when the input ends before the comment closes, which
/// surfaces as a lex error covering the whole comment.
fn block_comment(lexer: &mut logos::Lexer<RawToken>) -> bool {
    let rest = lexer.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;

    while i < rest.len() {
        match (rest[i], rest.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lexer.bump(i);
                    return true;
                }
            }
            _ => i += 1,
        }
    }

    lexer.bump(rest.len());
    false
}

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// The lexer for enum description source.
pub struct Lexer<'a> {
    source: &'a str,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, errors: Vec::new() }
    }

    /// Tokenize the entire source, collecting multiple errors.
    pub fn tokenize(&mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            if self.errors.len() >= MAX_ERRORS {
                break;
            }

            let range = raw.span();
            let span = Span::new(range.start, range.end);
            let slice = raw.slice();

            let kind = match result {
                Ok(RawToken::BlockComment) => continue,
                Ok(tok) => match convert_token(tok, slice, span) {
                    Ok(kind) => kind,
                    Err(e) => {
                        self.errors.push(e);
                        continue;
                    }
                },
                Err(()) if slice.starts_with("/*") => {
                    self.errors.push(LexError::unterminated_comment(span));
                    continue;
                }
                Err(()) => {
                    let ch = self.source[range.start..].chars().next().unwrap_or('?');
                    self.errors.push(LexError::unexpected_char(ch, range.start));
                    continue;
                }
            };

            tokens.push(Token { kind, span });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.source.len(), self.source.len()),
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }
}

fn convert_token(raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
    Ok(match raw {
        RawToken::Enum => TokenKind::Enum,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Star => TokenKind::Star,
        RawToken::Newline => TokenKind::Newline,
        RawToken::DecInt => TokenKind::Int(parse_int(slice, 10, span)?),
        RawToken::HexInt => TokenKind::Int(parse_int(&slice[2..], 16, span)?),
        RawToken::BinInt => TokenKind::Int(parse_int(&slice[2..], 2, span)?),
        RawToken::Ident => TokenKind::Ident(slice.to_string()),
        RawToken::LineComment | RawToken::BlockComment => {
            unreachable!("comments are skipped")
        }
    })
}

/// Decode digits with `_` separators; overflow and empty digit runs are errors.
fn parse_int(digits: &str, radix: u32, span: Span) -> Result<u64, LexError> {
    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return Err(LexError::invalid_number(span));
    }
    u64::from_str_radix(&cleaned, radix).map_err(|_| LexError::invalid_number(span))
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedChar,
    UnterminatedComment,
    InvalidNumber,
}

/// A lexer error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl LexError {
    fn unexpected_char(ch: char, pos: usize) -> Self {
        let hint = match ch {
            '<' | '>' => Some("generic parameters are not supported; write concrete types".to_string()),
            '&' => Some("references are pointer sized; write '*T'".to_string()),
            _ => None,
        };
        Self {
            kind: LexErrorKind::UnexpectedChar,
            span: Span::new(pos, pos + ch.len_utf8()),
            message: format!("Unexpected character '{}'", ch),
            hint,
        }
    }

    fn unterminated_comment(span: Span) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedComment,
            span: Span::new(span.start, span.start + 2),
            message: "Unterminated block comment".to_string(),
            hint: Some("add '*/' to close the comment".to_string()),
        }
    }

    fn invalid_number(span: Span) -> Self {
        Self {
            kind: LexErrorKind::InvalidNumber,
            span,
            message: "Invalid number".to_string(),
            hint: Some("numbers must fit in 64 bits".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "lex errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_tuple_variant() {
        assert_eq!(
            kinds("enum Shape { Circle(f64) }"),
            vec![
                TokenKind::Enum,
                TokenKind::Ident("Shape".into()),
                TokenKind::LBrace,
                TokenKind::Ident("Circle".into()),
                TokenKind::LParen,
                TokenKind::Ident("f64".into()),
                TokenKind::RParen,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newlines_are_tokens() {
        let toks = kinds("A\nB\r\nC");
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("A".into()),
                TokenKind::Newline,
                TokenKind::Ident("B".into()),
                TokenKind::Newline,
                TokenKind::Ident("C".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn integer_radixes_and_separators() {
        assert_eq!(
            kinds("1_024 0x10 0b101"),
            vec![
                TokenKind::Int(1024),
                TokenKind::Int(16),
                TokenKind::Int(5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("enumeration"),
            vec![TokenKind::Ident("enumeration".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let toks = kinds("enum /* outer /* inner */ still */ A // trailing\n");
        assert_eq!(
            toks,
            vec![
                TokenKind::Enum,
                TokenKind::Ident("A".into()),
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_comment_is_reported() {
        let result = Lexer::new("enum A /* never closed").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedComment);
        assert_eq!(result.errors[0].span.start, 7);
    }

    #[test]
    fn unexpected_character_keeps_going() {
        let result = Lexer::new("enum A { B<u8> }").tokenize();
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.kind == LexErrorKind::UnexpectedChar));
        assert_eq!(result.errors[0].span, Span::new(10, 11));
        assert!(result.errors[0].hint.is_some());
        // The rest of the input still lexes.
        assert!(result.tokens.iter().any(|t| t.kind == TokenKind::Ident("u8".into())));
    }

    #[test]
    fn overflowing_number_is_invalid() {
        let result = Lexer::new("99999999999999999999999").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidNumber);
        assert_eq!(result.errors[0].to_string(), "Invalid number");
    }

    #[test]
    fn eof_span_is_at_end() {
        let src = "enum A";
        let result = Lexer::new(src).tokenize();
        let eof = result.tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.span, Span::new(src.len(), src.len()));
    }
}
