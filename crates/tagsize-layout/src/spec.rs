// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Input model: fields, variants and enums.
//!
//! Constructors validate eagerly. The types also deserialize from JSON,
//! which bypasses the constructors, so every computation validates again.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, LayoutError, SpecViolation};

/// A primitive payload field: a size in bytes and a power-of-two alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    size: u64,
    alignment: u64,
}

impl FieldSpec {
    pub fn new(size: u64, alignment: u64) -> Result<Self, LayoutError> {
        let field = Self { size, alignment };
        field.check().map_err(SpecViolation::Field)?;
        Ok(field)
    }

    /// A field aligned to its own size, like every primitive up to 16 bytes.
    pub fn natural(size: u64) -> Result<Self, LayoutError> {
        Self::new(size, size)
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn alignment(&self) -> u64 {
        self.alignment
    }

    /// Size must be positive, alignment a power of two, and size a multiple
    /// of alignment (so alignment never exceeds size).
    pub(crate) fn check(&self) -> Result<(), FieldIssue> {
        if self.size == 0 {
            return Err(FieldIssue::ZeroSize);
        }
        if !self.alignment.is_power_of_two() {
            return Err(FieldIssue::AlignNotPowerOfTwo(self.alignment));
        }
        if self.size % self.alignment != 0 {
            return Err(FieldIssue::SizeNotMultiple {
                size: self.size,
                align: self.alignment,
            });
        }
        Ok(())
    }
}

/// One arm of a tagged union: a name and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSpec {
    name: String,
    #[serde(default)]
    fields: Vec<FieldSpec>,
}

impl VariantSpec {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self { name: name.into(), fields }
    }

    /// A variant without payload.
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// A named tagged union. Variant order fixes the discriminant numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    name: String,
    variants: Vec<VariantSpec>,
}

impl EnumSpec {
    pub fn new(name: impl Into<String>, variants: Vec<VariantSpec>) -> Result<Self, LayoutError> {
        let spec = Self { name: name.into(), variants };
        spec.check()?;
        Ok(spec)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[VariantSpec] {
        &self.variants
    }

    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Discriminant of a variant, i.e. its declaration index.
    pub fn discriminant_of(&self, name: &str) -> Option<u64> {
        self.variants.iter().position(|v| v.name == name).map(|i| i as u64)
    }

    /// At least one variant, names unique. Field checks happen during
    /// layout, where the variant name is known.
    pub(crate) fn check(&self) -> Result<(), SpecViolation> {
        if self.variants.is_empty() {
            return Err(SpecViolation::NoVariants);
        }
        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(SpecViolation::DuplicateVariant(variant.name.clone()));
            }
        }
        Ok(())
    }
}
