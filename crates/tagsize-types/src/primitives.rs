// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Built-in scalar types.

use crate::config::TargetConfig;

/// Size and alignment of a built-in type. `unit` is the only zero-sized one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarLayout {
    pub size: u64,
    pub align: u64,
}

/// Every name the description language treats as built in.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "bool", "u8", "i8", "u16", "i16", "u32", "i32", "f32", "char", "u64", "i64", "f64", "u128",
    "i128", "usize", "isize", "ptr", "unit",
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_NAMES.contains(&name)
}

/// Layout of a built-in type on the given target.
pub fn primitive(name: &str, target: &TargetConfig) -> Option<ScalarLayout> {
    let natural = |size| Some(ScalarLayout { size, align: size });
    match name {
        "bool" | "u8" | "i8" => natural(1),
        "u16" | "i16" => natural(2),
        "u32" | "i32" | "f32" | "char" => natural(4),
        "u64" | "i64" | "f64" => natural(8),
        "u128" | "i128" => natural(16),
        "usize" | "isize" | "ptr" => natural(target.pointer_width),
        "unit" => Some(ScalarLayout { size: 0, align: 1 }),
        _ => None,
    }
}
