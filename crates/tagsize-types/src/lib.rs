// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type resolution for enum descriptions.
//!
//! Maps field types to sizes and alignments on a target, and lowers
//! declarations into layout specs.

mod config;
mod lower;
mod primitives;

pub use config::{parse_pointer_width, ConfigError, TargetConfig, POINTER_WIDTH_ENV};
pub use lower::{
    lower, FieldOrigin, LowerError, LowerErrorKind, LowerResult, LowerWarning, LowerWarningKind, LoweredEnum,
};
pub use primitives::{is_primitive, primitive, ScalarLayout, PRIMITIVE_NAMES};
