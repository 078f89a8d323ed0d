// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lowering from parsed declarations to layout specs.
//!
//! Enums may use each other as field types in any order, so each enum is
//! lowered on first use with a depth-first walk. An enum reached again
//! while it is still being lowered contains itself by value.

use std::collections::HashMap;

use tagsize_ast::decl::{EnumDecl, TypeExpr, TypeExprKind};
use tagsize_ast::Span;
use tagsize_layout::{compute_enum_layout, EnumSpec, FieldSpec, LayoutError, LayoutResult, VariantSpec};
use thiserror::Error;

use crate::config::TargetConfig;
use crate::primitives::{is_primitive, primitive};

/// An enum that lowered and laid out cleanly.
#[derive(Debug, Clone)]
pub struct LoweredEnum {
    pub spec: EnumSpec,
    pub layout: LayoutResult,
    /// Source fields behind each variant's `FieldSpec`s, index for index.
    /// Zero-sized fields have no entry.
    pub fields: Vec<Vec<FieldOrigin>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOrigin {
    pub name: String,
    pub ty: String,
}

/// Result of lowering: enums in declaration order plus any errors and
/// warnings found.
#[derive(Debug)]
pub struct LowerResult {
    pub enums: Vec<LoweredEnum>,
    pub errors: Vec<LowerError>,
    pub warnings: Vec<LowerWarning>,
}

impl LowerResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&LoweredEnum> {
        self.enums.iter().find(|e| e.spec.name() == name)
    }
}

/// A lowering error with location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LowerError {
    pub kind: LowerErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerErrorKind {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("enum `{0}` is defined more than once")]
    DuplicateEnum(String),

    #[error("variant `{variant}` is declared more than once in enum `{enum_name}`")]
    DuplicateVariant { enum_name: String, variant: String },

    #[error("enum `{0}` has no variants")]
    EmptyEnum(String),

    #[error("enum `{0}` contains itself without indirection")]
    RecursiveEnum(String),

    #[error("enum `{0}` shadows a built-in type")]
    ShadowsPrimitive(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl LowerError {
    fn new(kind: LowerErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Something legal that probably isn't what the author meant.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LowerWarning {
    pub kind: LowerWarningKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerWarningKind {
    #[error("field `{field}` of variant `{variant}` is zero-sized and takes no space")]
    ZeroSizedField { variant: String, field: String },
}

#[derive(Debug, Clone)]
enum State {
    Pending,
    Visiting,
    Done(Option<LoweredEnum>),
    /// Header checks failed; never lowered.
    Rejected,
}

struct Lowerer<'a> {
    decls: &'a [EnumDecl],
    target: &'a TargetConfig,
    index: HashMap<&'a str, usize>,
    states: Vec<State>,
    errors: Vec<LowerError>,
    warnings: Vec<LowerWarning>,
}

/// Lower every declaration and compute its layout.
pub fn lower(decls: &[EnumDecl], target: &TargetConfig) -> LowerResult {
    let mut lowerer = Lowerer {
        decls,
        target,
        index: HashMap::new(),
        states: vec![State::Pending; decls.len()],
        errors: Vec::new(),
        warnings: Vec::new(),
    };
    lowerer.check_headers();

    for i in 0..decls.len() {
        lowerer.lower_enum(i);
    }

    let enums = lowerer
        .states
        .into_iter()
        .filter_map(|state| match state {
            State::Done(lowered) => lowered,
            _ => None,
        })
        .collect();

    LowerResult {
        enums,
        errors: lowerer.errors,
        warnings: lowerer.warnings,
    }
}

impl<'a> Lowerer<'a> {
    /// Name-level checks that need no layout work.
    fn check_headers(&mut self) {
        let decls = self.decls;
        for (i, decl) in decls.iter().enumerate() {
            if is_primitive(&decl.name) {
                self.reject(i, LowerErrorKind::ShadowsPrimitive(decl.name.clone()), decl.name_span);
                continue;
            }
            if self.index.contains_key(decl.name.as_str()) {
                self.reject(i, LowerErrorKind::DuplicateEnum(decl.name.clone()), decl.name_span);
                continue;
            }
            self.index.insert(&decl.name, i);

            if decl.variants.is_empty() {
                self.reject(i, LowerErrorKind::EmptyEnum(decl.name.clone()), decl.name_span);
                continue;
            }

            let mut seen: HashMap<&str, Span> = HashMap::new();
            for variant in &decl.variants {
                if seen.insert(&variant.name, variant.span).is_some() {
                    let kind = LowerErrorKind::DuplicateVariant {
                        enum_name: decl.name.clone(),
                        variant: variant.name.clone(),
                    };
                    self.reject(i, kind, variant.span);
                    break;
                }
            }
        }
    }

    fn reject(&mut self, i: usize, kind: LowerErrorKind, span: Span) {
        self.states[i] = State::Rejected;
        self.errors.push(LowerError::new(kind, span));
    }

    /// Lower one enum, returning its `(total_size, union_alignment)`.
    fn lower_enum(&mut self, i: usize) -> Option<(u64, u64)> {
        match &self.states[i] {
            State::Done(lowered) => {
                return lowered
                    .as_ref()
                    .map(|l| (l.layout.total_size, l.layout.union_alignment));
            }
            State::Rejected | State::Visiting => return None,
            State::Pending => {}
        }

        self.states[i] = State::Visiting;
        let lowered = self.build_enum(i);
        let size_align = lowered
            .as_ref()
            .map(|l| (l.layout.total_size, l.layout.union_alignment));
        self.states[i] = State::Done(lowered);
        size_align
    }

    fn build_enum(&mut self, i: usize) -> Option<LoweredEnum> {
        let decls = self.decls;
        let decl = &decls[i];
        let mut variants = Vec::with_capacity(decl.variants.len());
        let mut origins = Vec::with_capacity(decl.variants.len());
        let mut failed = false;

        for variant in &decl.variants {
            let mut fields = Vec::new();
            let mut field_origins = Vec::new();
            for field in &variant.fields {
                match self.resolve_type(&field.ty) {
                    Ok(Some(spec)) => {
                        fields.push(spec);
                        field_origins.push(FieldOrigin {
                            name: field.name.clone(),
                            ty: field.ty.to_string(),
                        });
                    }
                    Ok(None) => self.warnings.push(LowerWarning {
                        kind: LowerWarningKind::ZeroSizedField {
                            variant: variant.name.clone(),
                            field: field.name.clone(),
                        },
                        span: field.ty.span,
                    }),
                    Err(Some(e)) => {
                        self.errors.push(e);
                        failed = true;
                    }
                    Err(None) => failed = true,
                }
            }
            variants.push(VariantSpec::new(variant.name.clone(), fields));
            origins.push(field_origins);
        }

        if failed {
            return None;
        }

        let built = EnumSpec::new(decl.name.clone(), variants)
            .and_then(|spec| compute_enum_layout(&spec).map(|layout| (spec, layout)));
        match built {
            Ok((spec, layout)) => Some(LoweredEnum {
                spec,
                layout,
                fields: origins,
                span: decl.span,
            }),
            Err(e) => {
                self.errors.push(LowerError::new(e.into(), decl.name_span));
                None
            }
        }
    }

    /// `Ok(None)` is a zero-sized type. `Err(None)` means the type depends
    /// on an enum that already failed and was reported.
    fn resolve_type(&mut self, ty: &TypeExpr) -> Result<Option<FieldSpec>, Option<LowerError>> {
        let layout_err = |e: LayoutError| Some(LowerError::new(e.into(), ty.span));

        match &ty.kind {
            TypeExprKind::Named(name) => {
                if let Some(scalar) = primitive(name, self.target) {
                    if scalar.size == 0 {
                        return Ok(None);
                    }
                    return FieldSpec::new(scalar.size, scalar.align).map(Some).map_err(layout_err);
                }

                let Some(&target) = self.index.get(name.as_str()) else {
                    return Err(Some(LowerError::new(
                        LowerErrorKind::UnknownType(name.clone()),
                        ty.span,
                    )));
                };
                if matches!(self.states[target], State::Visiting) {
                    return Err(Some(LowerError::new(
                        LowerErrorKind::RecursiveEnum(name.clone()),
                        ty.span,
                    )));
                }
                let (size, align) = self.lower_enum(target).ok_or(None::<LowerError>)?;
                FieldSpec::new(size, align).map(Some).map_err(layout_err)
            }
            TypeExprKind::Array { elem, len } => {
                let Some(elem) = self.resolve_type(elem)? else {
                    return Ok(None);
                };
                if *len == 0 {
                    return Ok(None);
                }
                let size = elem
                    .size()
                    .checked_mul(*len)
                    .ok_or_else(|| layout_err(overflow()))?;
                FieldSpec::new(size, elem.alignment()).map(Some).map_err(layout_err)
            }
            TypeExprKind::Pointer(pointee) => {
                self.check_pointee(pointee).map_err(Some)?;
                let width = self.target.pointer_width;
                FieldSpec::new(width, width).map(Some).map_err(layout_err)
            }
            TypeExprKind::Bytes { size, align } => {
                FieldSpec::new(*size, *align).map(Some).map_err(layout_err)
            }
        }
    }

    /// A pointee only has to exist; its layout does not matter.
    fn check_pointee(&self, ty: &TypeExpr) -> Result<(), LowerError> {
        match &ty.kind {
            TypeExprKind::Named(name) => {
                if is_primitive(name) || self.index.contains_key(name.as_str()) {
                    Ok(())
                } else {
                    Err(LowerError::new(LowerErrorKind::UnknownType(name.clone()), ty.span))
                }
            }
            TypeExprKind::Array { elem, .. } => self.check_pointee(elem),
            TypeExprKind::Pointer(inner) => self.check_pointee(inner),
            TypeExprKind::Bytes { .. } => Ok(()),
        }
    }
}

fn overflow() -> LayoutError {
    LayoutError::InvalidSpec(tagsize_layout::SpecViolation::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsize_layout::{FieldIssue, SpecViolation};

    fn lower_src(src: &str) -> LowerResult {
        let parsed = tagsize_parser::parse_source(src);
        assert!(parsed.is_ok(), "parse errors: {:?}", parsed.errors);
        lower(&parsed.decls, &TargetConfig::default())
    }

    fn lower_ok(src: &str) -> LowerResult {
        let result = lower_src(src);
        assert!(result.is_ok(), "lower errors: {:?}", result.errors);
        result
    }

    #[test]
    fn shape_matches_worked_example() {
        let result = lower_ok("enum Shape {\n    Circle(f64)\n    Rectangle(f64, f64)\n}");
        let shape = result.get("Shape").unwrap();
        assert_eq!(shape.layout.discriminant_width, 1);
        assert_eq!(shape.layout.payload_offset, 8);
        assert_eq!(shape.layout.total_size, 24);
        assert_eq!(shape.fields[1][1].name, "_1");
        assert_eq!(shape.fields[1][1].ty, "f64");
    }

    #[test]
    fn nested_enum_uses_total_size() {
        // Declared after its user on purpose.
        let result = lower_ok("enum Wrapper { Some(Shape), None }\nenum Shape { Circle(f64), Rect(f64, f64) }");
        let names: Vec<&str> = result.enums.iter().map(|e| e.spec.name()).collect();
        assert_eq!(names, vec!["Wrapper", "Shape"]);

        let wrapper = result.get("Wrapper").unwrap();
        let some = &wrapper.spec.variants()[0].fields()[0];
        assert_eq!((some.size(), some.alignment()), (24, 8));
        assert_eq!(wrapper.layout.total_size, 32);
    }

    #[test]
    fn arrays_pointers_and_bytes() {
        let result = lower_ok("enum Blob { Data([u16; 3], *Blob, bytes(12, 4)) }");
        let fields = result.enums[0].spec.variants()[0].fields();
        assert_eq!((fields[0].size(), fields[0].alignment()), (6, 2));
        assert_eq!((fields[1].size(), fields[1].alignment()), (8, 8));
        assert_eq!((fields[2].size(), fields[2].alignment()), (12, 4));
        // 0..6, pad to 8, 8..16, 16..28, round to 32
        assert_eq!(result.enums[0].layout.variants[0].payload.field_offsets, vec![0, 8, 16]);
        assert_eq!(result.enums[0].layout.max_variant_size, 32);
    }

    #[test]
    fn pointer_width_follows_target() {
        let parsed = tagsize_parser::parse_source("enum Node { Link(*Node, usize), End }");
        let result = lower(&parsed.decls, &TargetConfig::with_pointer_width(4).unwrap());
        assert!(result.is_ok());
        let layout = &result.enums[0].layout;
        assert_eq!(layout.max_variant_size, 8);
        assert_eq!(layout.payload_offset, 4);
        assert_eq!(layout.total_size, 12);
    }

    #[test]
    fn zero_sized_fields_are_dropped() {
        let result = lower_ok("enum Z { A(unit, u8, [u64; 0]) }");
        let lowered = &result.enums[0];
        assert_eq!(lowered.spec.variants()[0].fields().len(), 1);
        assert_eq!(lowered.fields[0].len(), 1);
        assert_eq!(lowered.fields[0][0].ty, "u8");
        assert_eq!(lowered.layout.total_size, 2);

        let dropped: Vec<&str> = result
            .warnings
            .iter()
            .map(|w| match &w.kind {
                LowerWarningKind::ZeroSizedField { field, .. } => field.as_str(),
            })
            .collect();
        assert_eq!(dropped, vec!["_0", "_2"]);
    }

    #[test]
    fn sized_fields_raise_no_warnings() {
        let result = lower_ok("enum Shape { Circle(f64), Dot }");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unknown_type() {
        let src = "enum A { B(String) }";
        let result = lower_src(src);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LowerErrorKind::UnknownType("String".into()));
        let span = result.errors[0].span;
        assert_eq!(&src[span.start..span.end], "String");
        assert!(result.enums.is_empty());
    }

    #[test]
    fn unknown_pointee() {
        let result = lower_src("enum A { B(*Missing) }");
        assert_eq!(result.errors[0].kind, LowerErrorKind::UnknownType("Missing".into()));
    }

    #[test]
    fn duplicate_enum_keeps_first() {
        let result = lower_src("enum A { X(u8) }\nenum A { Y(u64) }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LowerErrorKind::DuplicateEnum("A".into()));
        assert_eq!(result.enums.len(), 1);
        assert_eq!(result.enums[0].layout.total_size, 2);
    }

    #[test]
    fn duplicate_variant() {
        let result = lower_src("enum A { X, Y, X }");
        assert_eq!(
            result.errors[0].kind,
            LowerErrorKind::DuplicateVariant { enum_name: "A".into(), variant: "X".into() }
        );
        assert!(result.enums.is_empty());
    }

    #[test]
    fn empty_enum() {
        let result = lower_src("enum Never {}");
        assert_eq!(result.errors[0].kind, LowerErrorKind::EmptyEnum("Never".into()));
    }

    #[test]
    fn primitive_names_are_reserved() {
        let result = lower_src("enum u8 { A }");
        assert_eq!(result.errors[0].kind, LowerErrorKind::ShadowsPrimitive("u8".into()));
    }

    #[test]
    fn direct_recursion_is_rejected() {
        let result = lower_src("enum List { Cons(i32, List), Nil }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LowerErrorKind::RecursiveEnum("List".into()));
        assert!(result.enums.is_empty());
    }

    #[test]
    fn mutual_recursion_reports_once() {
        let result = lower_src("enum A { X(B) }\nenum B { Y(A) }\nenum C { Z(u8) }");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LowerErrorKind::RecursiveEnum("A".into()));
        let names: Vec<&str> = result.enums.iter().map(|e| e.spec.name()).collect();
        assert_eq!(names, vec!["C"]);
    }

    #[test]
    fn pointer_breaks_recursion() {
        let result = lower_ok("enum List { Cons(i32, *List), Nil }");
        assert_eq!(result.enums[0].layout.total_size, 24);
    }

    #[test]
    fn dependents_of_failed_enums_fail_quietly() {
        let result = lower_src("enum Bad { X(Nope) }\nenum User { Y(Bad) }");
        assert_eq!(result.errors.len(), 1);
        assert!(result.enums.is_empty());
    }

    #[test]
    fn bad_bytes_surface_as_layout_errors() {
        let result = lower_src("enum Raw { B(bytes(6, 4)) }");
        assert_eq!(
            result.errors[0].kind,
            LowerErrorKind::Layout(LayoutError::InvalidSpec(SpecViolation::Field(
                FieldIssue::SizeNotMultiple { size: 6, align: 4 }
            )))
        );
        assert_eq!(
            result.errors[0].to_string(),
            "invalid layout spec: size 6 is not a multiple of alignment 4"
        );
    }

    #[test]
    fn oversized_array_overflows() {
        let result = lower_src("enum Big { A([u64; 0xFFFFFFFFFFFFFFFF]) }");
        assert_eq!(
            result.errors[0].kind,
            LowerErrorKind::Layout(LayoutError::InvalidSpec(SpecViolation::Overflow))
        );
    }
}
