// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Recursive-descent parser for enum declarations.

use tagsize_ast::decl::{EnumDecl, FieldDecl, PayloadStyle, TypeExpr, TypeExprKind, VariantDecl};
use tagsize_ast::token::{Token, TokenKind};
use tagsize_ast::Span;
use thiserror::Error;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 20;

/// Deepest `*`/`[` nesting accepted in one type.
pub const MAX_TYPE_DEPTH: usize = 256;

/// The parser for enum description source.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<ParseError>,
    type_depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token { kind: TokenKind::Eof, span: Span::new(end, end) });
        }
        Self { tokens, pos: 0, errors: Vec::new(), type_depth: 0 }
    }

    /// Record error, return if should continue.
    fn record_error(&mut self, error: ParseError) -> bool {
        self.errors.push(error);
        self.errors.len() < MAX_ERRORS
    }

    /// Skip to the next `enum` after an error. The keyword is reserved, so
    /// it can only start a declaration.
    fn synchronize(&mut self) {
        while !self.at_end() && !self.check(&TokenKind::Enum) {
            self.advance();
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        if !self.at_end() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<&Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(kind.display_name()))
        }
    }

    fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn skip_terminators(&mut self) {
        while self.check(&TokenKind::Newline) || self.check(&TokenKind::Semi) {
            self.advance();
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.error_expected("a name")),
        }
    }

    fn expect_int(&mut self, what: &str) -> Result<(u64, Span), ParseError> {
        let value = match self.current_kind() {
            TokenKind::Int(value) => *value,
            _ => return Err(self.error_expected(what)),
        };
        let span = self.advance().span;
        Ok((value, span))
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parse every declaration in the token stream.
    pub fn parse(&mut self) -> ParseResult {
        let mut decls = Vec::new();
        self.skip_terminators();

        while !self.at_end() {
            match self.parse_enum_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                }
            }
            self.skip_terminators();
        }

        ParseResult {
            decls,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn parse_enum_decl(&mut self) -> Result<EnumDecl, ParseError> {
        if let TokenKind::Ident(word) = self.current_kind() {
            if matches!(word.as_str(), "struct" | "union") {
                return Err(ParseError {
                    kind: ParseErrorKind::Unsupported,
                    span: self.current().span,
                    message: format!("`{}` declarations are not supported", word),
                    hint: Some("describe the fields as a single-variant enum".to_string()),
                });
            }
        }

        let start = self.expect(&TokenKind::Enum)?.span;
        let (name, name_span) = self.expect_ident()?;
        self.skip_newlines();
        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let mut variants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            variants.push(self.parse_variant()?);

            if self.match_token(&TokenKind::Comma) || self.check(&TokenKind::Newline) {
                self.skip_newlines();
            } else if !self.check(&TokenKind::RBrace) && !self.at_end() {
                return Err(self.error_expected("',' or newline"));
            }
        }

        let end = self.expect(&TokenKind::RBrace)?.span;
        Ok(EnumDecl {
            name,
            name_span,
            variants,
            span: start.to(end),
        })
    }

    fn parse_variant(&mut self) -> Result<VariantDecl, ParseError> {
        let (name, name_span) = self.expect_ident()?;
        let mut fields = Vec::new();

        let (style, end) = if self.match_token(&TokenKind::LParen) {
            self.skip_newlines();
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                let ty = self.parse_type()?;
                fields.push(FieldDecl {
                    name: format!("_{}", fields.len()),
                    span: ty.span,
                    ty,
                });
                self.skip_newlines();
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
            let end = self.expect(&TokenKind::RParen)?.span;
            (PayloadStyle::Tuple, end)
        } else if self.match_token(&TokenKind::LBrace) {
            // Struct-style variant: Move { x: i32, y: i32 }
            self.skip_newlines();
            while !self.check(&TokenKind::RBrace) && !self.at_end() {
                let (field_name, field_span) = self.expect_ident()?;
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                fields.push(FieldDecl {
                    name: field_name,
                    span: field_span.to(ty.span),
                    ty,
                });

                if self.match_token(&TokenKind::Comma) || self.check(&TokenKind::Newline) {
                    self.skip_newlines();
                } else if !self.check(&TokenKind::RBrace) && !self.at_end() {
                    return Err(self.error_expected("',' or '}'"));
                }
            }
            let end = self.expect(&TokenKind::RBrace)?.span;
            (PayloadStyle::Named, end)
        } else {
            (PayloadStyle::Unit, name_span)
        };

        Ok(VariantDecl {
            name,
            span: name_span.to(end),
            style,
            fields,
        })
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        if self.type_depth >= MAX_TYPE_DEPTH {
            return Err(ParseError::too_deep(self.current().span));
        }
        self.type_depth += 1;
        let ty = self.parse_type_inner();
        self.type_depth -= 1;
        ty
    }

    fn parse_type_inner(&mut self) -> Result<TypeExpr, ParseError> {
        let start = self.current().span;

        match self.current_kind().clone() {
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type()?;
                Ok(TypeExpr {
                    span: start.to(inner.span),
                    kind: TypeExprKind::Pointer(Box::new(inner)),
                })
            }
            TokenKind::LBracket => {
                self.advance();
                self.skip_newlines();
                let elem = self.parse_type()?;
                self.skip_newlines();
                self.expect(&TokenKind::Semi)?;
                self.skip_newlines();
                let (len, _) = self.expect_int("a length")?;
                self.skip_newlines();
                let end = self.expect(&TokenKind::RBracket)?.span;
                Ok(TypeExpr {
                    span: start.to(end),
                    kind: TypeExprKind::Array { elem: Box::new(elem), len },
                })
            }
            TokenKind::Ident(name) if name == "bytes" && self.peek(1) == &TokenKind::LParen => {
                self.advance();
                self.advance();
                let (size, _) = self.expect_int("a number")?;
                self.expect(&TokenKind::Comma)?;
                let (align, _) = self.expect_int("a number")?;
                let end = self.expect(&TokenKind::RParen)?.span;
                Ok(TypeExpr {
                    span: start.to(end),
                    kind: TypeExprKind::Bytes { size, align },
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(TypeExpr { span: start, kind: TypeExprKind::Named(name) })
            }
            _ => Err(self.error_expected("type")),
        }
    }
}

/// Result of parsing: declarations plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub decls: Vec<EnumDecl>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A required token was missing.
    Expected,
    /// Valid-looking syntax the language does not have.
    Unsupported,
    /// A type nested more than `MAX_TYPE_DEPTH` levels.
    TooDeep,
}

/// A parser error with location and friendly message.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub message: String,
    pub hint: Option<String>,
}

impl ParseError {
    fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let message = format_expected_message(expected, found);
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self {
            kind: ParseErrorKind::Expected,
            span,
            message,
            hint,
        }
    }

    fn too_deep(span: Span) -> Self {
        Self {
            kind: ParseErrorKind::TooDeep,
            span,
            message: format!("Type nests more than {} levels deep", MAX_TYPE_DEPTH),
            hint: Some("split the type up with `bytes(size, align)` or a pointer to another enum".to_string()),
        }
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &TokenKind) -> String {
    match expected {
        "'{'" => format!("Expected '{{' to start the enum body, found {}", found.display_name()),
        "'}'" if matches!(found, TokenKind::Eof) => "Unclosed '{' - missing '}'".to_string(),
        "'}'" => format!("Expected '}}' to close the enum, found {}", found.display_name()),
        "')'" if matches!(found, TokenKind::Eof) => "Unclosed '(' - missing ')'".to_string(),
        "']'" if matches!(found, TokenKind::Eof) => "Unclosed '[' - missing ']'".to_string(),
        "a name" => format!("Expected name, found {}", found.display_name()),
        "type" => format!("Expected type, found {}", found.display_name()),
        "'enum'" => format!("Expected enum declaration, found {}", found.display_name()),
        _ => format!("Expected {}, found {}", expected, found.display_name()),
    }
}
