// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Tagged-union layout calculator.
//!
//! Models an enum as a discriminant followed by a payload area large
//! enough for its biggest variant:
//!
//! ```text
//! | tag | padding | payload (max variant size) | tail padding |
//! 0     disc      payload_offset                             total_size
//! ```
//!
//! - the tag is the smallest integer holding every discriminant (one byte
//!   for up to 256 variants)
//! - the payload starts at the tag width rounded up to the largest variant
//!   alignment
//! - the total is rounded up to the union alignment, the larger of the tag
//!   width and every variant alignment
//!
//! Everything here is a pure function of its input.

mod error;
mod layout;
mod spec;

pub use error::{FieldIssue, LayoutError, SpecViolation};
pub use layout::{
    compute_enum_layout, compute_variant_layout, describe_variant, discriminant_width, round_up,
    LayoutResult, PayloadLayout, VariantLayout, VariantLayoutReport,
};
pub use spec::{EnumSpec, FieldSpec, VariantSpec};
