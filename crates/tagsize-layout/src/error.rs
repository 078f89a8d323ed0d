// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Layout errors.

use thiserror::Error;

/// Why a layout could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The input is structurally wrong. Retrying with the same input cannot
    /// succeed.
    #[error("invalid layout spec: {0}")]
    InvalidSpec(#[from] SpecViolation),

    /// A query named a variant the enum does not have.
    #[error("enum `{enum_name}` has no variant named `{variant}`")]
    NotFound { enum_name: String, variant: String },
}

/// The specific rule an enum, variant or field broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecViolation {
    #[error("{0}")]
    Field(FieldIssue),

    #[error("field {index} of variant `{variant}`: {issue}")]
    VariantField {
        variant: String,
        index: usize,
        issue: FieldIssue,
    },

    #[error("an enum needs at least one variant")]
    NoVariants,

    #[error("variant `{0}` is declared more than once")]
    DuplicateVariant(String),

    #[error("layout size overflows 64 bits")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldIssue {
    #[error("size must be positive")]
    ZeroSize,

    #[error("alignment {0} is not a power of two")]
    AlignNotPowerOfTwo(u64),

    #[error("size {size} is not a multiple of alignment {align}")]
    SizeNotMultiple { size: u64, align: u64 },
}

impl LayoutError {
    pub(crate) fn overflow() -> Self {
        LayoutError::InvalidSpec(SpecViolation::Overflow)
    }
}
