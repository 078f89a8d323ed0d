// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (E0001, E0200, etc.) to titles, categories and longer
//! explanations. Used by `tagsize explain <code>` and the JSON report.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
    pub description: &'static str,
    pub example: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Lowering,
    Layout,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Lowering => write!(f, "Lowering"),
            ErrorCategory::Layout => write!(f, "Layout"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr, $desc:literal, $example:literal)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
                description: $desc,
                example: $example,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("unexpected character", Syntax,
                    "The character cannot start any token. Descriptions only use names,\nnumbers, and the punctuation `{ } ( ) [ ] : ; , *`.",
                    "enum Opt { Some(Vec<u8>) }   // '<' is not allowed"),
                "E0002" => ("unterminated block comment", Syntax,
                    "A `/*` comment reaches the end of the file without a matching `*/`.\nBlock comments nest, so every inner `/*` needs its own `*/`.",
                    "/* outer /* inner */\nenum A { B }"),
                "E0003" => ("invalid number", Syntax,
                    "Integer literals must fit in 64 bits and contain at least one digit.",
                    "enum A { B([u8; 99999999999999999999]) }"),

                // Parser errors (E01xx)
                "E0100" => ("unsupported declaration", Syntax,
                    "Only `enum` declarations are understood. A struct is an enum with\na single variant.",
                    "struct Point { x: i32, y: i32 }"),
                "E0101" => ("expected token not found", Syntax,
                    "The parser needed a specific token here, such as a closing brace or\na separator between variants.",
                    "enum A { B C }   // missing ',' or newline"),
                "E0102" => ("type nested too deeply", Syntax,
                    "Pointer and array types may nest at most 256 levels deep.",
                    "enum A { B(********...u8) }   // 257 or more '*'"),

                // Lowering errors (E02xx)
                "E0200" => ("unknown type", Lowering,
                    "Field types must be primitives, `[T; N]`, `*T`, `bytes(size, align)`,\nor the name of an enum declared in the same file.",
                    "enum A { B(String) }"),
                "E0201" => ("duplicate enum", Lowering,
                    "Two enums in the file share a name. Only the first is used.",
                    "enum A { X }\nenum A { Y }"),
                "E0202" => ("duplicate variant", Lowering,
                    "Variant names must be unique within an enum because the name selects\nthe discriminant.",
                    "enum A { X, X }"),
                "E0203" => ("empty enum", Lowering,
                    "An enum without variants has no values and no discriminant to size.",
                    "enum Never {}"),
                "E0204" => ("recursive enum", Lowering,
                    "An enum that contains itself by value would be infinitely large.\nStore the recursive part behind a pointer instead.",
                    "enum List { Cons(i32, List), Nil }   // use *List"),
                "E0205" => ("shadows built-in", Lowering,
                    "Enum names may not reuse a primitive type name.",
                    "enum u8 { A }"),
                "W0200" => ("zero-sized field", Lowering,
                    "A `unit` or zero-length array field occupies no bytes, so it is left\nout of the layout. This is a warning, not an error.",
                    "enum A { B(u8, unit) }"),

                // Layout errors (E03xx)
                "E0300" => ("invalid layout spec", Layout,
                    "A field has a zero size, a non power-of-two alignment, or a size\nthat is not a multiple of its alignment, or the layout overflows.",
                    "enum Raw { B(bytes(6, 4)) }"),
                "E0301" => ("variant not found", Layout,
                    "A query named a variant the enum does not declare. Names are\ncase-sensitive.",
                    "tagsize describe shapes.tsz Shape Triangle"),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}
