// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from phase error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};
use tagsize_layout::{LayoutError, SpecViolation};
use tagsize_lexer::LexErrorKind;
use tagsize_parser::ParseErrorKind;
use tagsize_types::{LowerErrorKind, LowerWarningKind};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for tagsize_lexer::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match self.kind {
            LexErrorKind::UnexpectedChar => ("E0001", "unexpected character"),
            LexErrorKind::UnterminatedComment => ("E0002", "comment starts here"),
            LexErrorKind::InvalidNumber => ("E0003", "invalid number"),
        };
        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, label);

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for tagsize_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let code = match self.kind {
            ParseErrorKind::Unsupported => "E0100",
            ParseErrorKind::Expected => "E0101",
            ParseErrorKind::TooDeep => "E0102",
        };
        let mut diag = Diagnostic::error(&self.message)
            .with_code(code)
            .with_primary(self.span, "here");

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        diag
    }
}

// ============================================================================
// Lowering Errors
// ============================================================================

impl ToDiagnostic for tagsize_types::LowerError {
    fn to_diagnostic(&self) -> Diagnostic {
        let message = self.kind.to_string();

        match &self.kind {
            LowerErrorKind::UnknownType(_) => Diagnostic::error(message)
                .with_code("E0200")
                .with_primary(self.span, "not a primitive or a declared enum")
                .with_help("field types are primitives, `[T; N]`, `*T`, `bytes(size, align)` or enums from this file"),

            LowerErrorKind::DuplicateEnum(_) => Diagnostic::error(message)
                .with_code("E0201")
                .with_primary(self.span, "redefined here")
                .with_note("the first definition is used"),

            LowerErrorKind::DuplicateVariant { .. } => Diagnostic::error(message)
                .with_code("E0202")
                .with_primary(self.span, "declared again here"),

            LowerErrorKind::EmptyEnum(_) => Diagnostic::error(message)
                .with_code("E0203")
                .with_primary(self.span, "needs at least one variant"),

            LowerErrorKind::RecursiveEnum(name) => Diagnostic::error(message)
                .with_code("E0204")
                .with_primary(self.span, "recursive without indirection")
                .with_help(format!("store it behind a pointer: `*{}`", name)),

            LowerErrorKind::ShadowsPrimitive(_) => Diagnostic::error(message)
                .with_code("E0205")
                .with_primary(self.span, "built-in type name")
                .with_help("rename the enum"),

            LowerErrorKind::Layout(e) => e.to_diagnostic().with_primary(self.span, "while laying out this"),
        }
    }
}

impl ToDiagnostic for tagsize_types::LowerWarning {
    fn to_diagnostic(&self) -> Diagnostic {
        match &self.kind {
            LowerWarningKind::ZeroSizedField { .. } => Diagnostic::warning(self.kind.to_string())
                .with_code("W0200")
                .with_primary(self.span, "zero-sized")
                .with_note("the field is left out of the variant's layout"),
        }
    }
}

// ============================================================================
// Layout Errors
// ============================================================================

impl ToDiagnostic for LayoutError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LayoutError::InvalidSpec(violation) => {
                let diag = Diagnostic::error(self.to_string()).with_code("E0300");
                match violation {
                    SpecViolation::Field(_) | SpecViolation::VariantField { .. } => diag.with_note(
                        "fields need a positive size, a power-of-two alignment, and a size that is a multiple of the alignment",
                    ),
                    SpecViolation::Overflow => diag.with_note("sizes are computed in 64-bit bytes"),
                    SpecViolation::NoVariants | SpecViolation::DuplicateVariant(_) => diag,
                }
            }
            LayoutError::NotFound { .. } => Diagnostic::error(self.to_string())
                .with_code("E0301")
                .with_help("variant names are case-sensitive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::ErrorCodeRegistry;
    use crate::ErrorCode;
    use tagsize_layout::FieldSpec;
    use tagsize_types::TargetConfig;

    fn code(diag: &Diagnostic) -> &str {
        diag.code.as_ref().map(|c: &ErrorCode| c.0.as_str()).unwrap_or("")
    }

    #[test]
    fn lex_errors_map_by_kind() {
        let result = tagsize_lexer::Lexer::new("enum A { B<u8> } /*").tokenize();
        let codes: Vec<String> = result
            .errors
            .iter()
            .map(|e| code(&e.to_diagnostic()).to_string())
            .collect();
        assert_eq!(codes, vec!["E0001", "E0001", "E0002"]);
        assert!(result.errors[0].to_diagnostic().help.is_some());
    }

    #[test]
    fn parse_errors_map_by_kind() {
        let result = tagsize_parser::parse_source("struct P { x: u8 }\nenum A { B C }");
        let codes: Vec<String> = result
            .errors
            .iter()
            .map(|e| code(&e.to_diagnostic()).to_string())
            .collect();
        assert_eq!(codes, vec!["E0100", "E0101"]);
    }

    #[test]
    fn lower_errors_carry_spans() {
        let src = "enum List { Cons(i32, List), Nil }";
        let parsed = tagsize_parser::parse_source(src);
        let lowered = tagsize_types::lower(&parsed.decls, &TargetConfig::default());
        let diag = lowered.errors[0].to_diagnostic();
        assert_eq!(code(&diag), "E0204");
        let span = diag.primary_span().unwrap();
        assert_eq!(&src[span.start..span.end], "List");
        assert_eq!(diag.help.as_deref(), Some("store it behind a pointer: `*List`"));
    }

    #[test]
    fn wrapped_layout_errors_use_layout_codes() {
        let parsed = tagsize_parser::parse_source("enum Raw { B(bytes(3, 2)) }");
        let lowered = tagsize_types::lower(&parsed.decls, &TargetConfig::default());
        let diag = lowered.errors[0].to_diagnostic();
        assert_eq!(code(&diag), "E0300");
        assert_eq!(diag.labels.len(), 1);
    }

    #[test]
    fn deep_types_map_to_their_own_code() {
        let src = format!("enum A {{ B({}u8) }}", "*".repeat(tagsize_parser::MAX_TYPE_DEPTH + 1));
        let result = tagsize_parser::parse_source(&src);
        assert_eq!(code(&result.errors[0].to_diagnostic()), "E0102");
    }

    #[test]
    fn zero_sized_fields_warn() {
        let src = "enum A { B(u8, unit) }";
        let parsed = tagsize_parser::parse_source(src);
        let lowered = tagsize_types::lower(&parsed.decls, &TargetConfig::default());
        assert!(lowered.is_ok());
        let diag = lowered.warnings[0].to_diagnostic();
        assert_eq!(code(&diag), "W0200");
        assert!(!diag.is_error());
        let span = diag.primary_span().unwrap();
        assert_eq!(&src[span.start..span.end], "unit");
    }

    /// Run a snippet through every phase and collect the codes it raises.
    fn codes_for(src: &str) -> Vec<String> {
        let codes = |diags: Vec<Diagnostic>| -> Vec<String> {
            diags.iter().map(|d| code(d).to_string()).collect()
        };

        let lexed = tagsize_lexer::Lexer::new(src).tokenize();
        if !lexed.is_ok() {
            return codes(lexed.errors.iter().map(|e| e.to_diagnostic()).collect());
        }
        let parsed = tagsize_parser::Parser::new(lexed.tokens).parse();
        if !parsed.is_ok() {
            return codes(parsed.errors.iter().map(|e| e.to_diagnostic()).collect());
        }
        let lowered = tagsize_types::lower(&parsed.decls, &TargetConfig::default());
        let diags = lowered
            .errors
            .iter()
            .map(|e| e.to_diagnostic())
            .chain(lowered.warnings.iter().map(|w| w.to_diagnostic()))
            .collect();
        codes(diags)
    }

    #[test]
    fn registry_examples_raise_their_codes() {
        let registry = ErrorCodeRegistry::default();
        let mut checked = 0;
        for info in registry.all() {
            // Command lines and elided snippets are not description source.
            if info.example.starts_with("tagsize ") || info.example.contains("...") {
                continue;
            }
            let codes = codes_for(info.example);
            assert!(
                codes.iter().any(|c| c == info.code),
                "{} example {:?} raised {:?}",
                info.code,
                info.example,
                codes
            );
            checked += 1;
        }
        assert!(checked >= 12, "only {} examples checked", checked);
    }

    #[test]
    fn layout_errors() {
        let invalid = FieldSpec::new(0, 1).unwrap_err().to_diagnostic();
        assert_eq!(code(&invalid), "E0300");
        assert_eq!(invalid.message, "invalid layout spec: size must be positive");
        assert!(invalid.labels.is_empty());

        let missing = LayoutError::NotFound {
            enum_name: "Shape".into(),
            variant: "Oval".into(),
        }
        .to_diagnostic();
        assert_eq!(code(&missing), "E0301");
    }
}
