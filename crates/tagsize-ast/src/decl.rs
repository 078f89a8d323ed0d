// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration nodes for enum descriptions.

use crate::Span;

/// `enum Name { Variant, ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: String,
    pub name_span: Span,
    pub variants: Vec<VariantDecl>,
    /// From `enum` to the closing brace.
    pub span: Span,
}

impl EnumDecl {
    pub fn variant(&self, name: &str) -> Option<&VariantDecl> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// One arm of an enum declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    pub name: String,
    pub span: Span,
    pub style: PayloadStyle,
    pub fields: Vec<FieldDecl>,
}

/// How a variant spells its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStyle {
    /// `Empty`
    Unit,
    /// `Circle(f64)`
    Tuple,
    /// `Move { x: i32, y: i32 }`
    Named,
}

/// A payload field. Tuple fields are named `_0`, `_1`, ...
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A field type as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// A primitive (`u8`, `f64`, ...) or the name of another enum.
    Named(String),
    /// `[T; N]`
    Array { elem: Box<TypeExpr>, len: u64 },
    /// `*T`, always pointer sized.
    Pointer(Box<TypeExpr>),
    /// `bytes(size, align)`: an opaque blob with explicit layout.
    Bytes { size: u64, align: u64 },
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeExprKind::Named(name) => write!(f, "{}", name),
            TypeExprKind::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            TypeExprKind::Pointer(inner) => write!(f, "*{}", inner),
            TypeExprKind::Bytes { size, align } => write!(f, "bytes({}, {})", size, align),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(kind: TypeExprKind) -> TypeExpr {
        TypeExpr { kind, span: Span::default() }
    }

    #[test]
    fn type_expr_display_round_trips_syntax() {
        let arr = ty(TypeExprKind::Array {
            elem: Box::new(ty(TypeExprKind::Named("u32".into()))),
            len: 3,
        });
        assert_eq!(arr.to_string(), "[u32; 3]");

        let ptr = ty(TypeExprKind::Pointer(Box::new(ty(TypeExprKind::Named("List".into())))));
        assert_eq!(ptr.to_string(), "*List");

        let raw = ty(TypeExprKind::Bytes { size: 12, align: 4 });
        assert_eq!(raw.to_string(), "bytes(12, 4)");
    }

    #[test]
    fn variant_lookup_by_name() {
        let decl = EnumDecl {
            name: "Shape".into(),
            name_span: Span::default(),
            variants: vec![VariantDecl {
                name: "Circle".into(),
                span: Span::default(),
                style: PayloadStyle::Tuple,
                fields: vec![],
            }],
            span: Span::default(),
        };
        assert!(decl.variant("Circle").is_some());
        assert!(decl.variant("Square").is_none());
    }
}
