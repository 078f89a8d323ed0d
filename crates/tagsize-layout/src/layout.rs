// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! Layout computation - payload sizes, discriminant width, union size.

use serde::{Deserialize, Serialize};

use crate::error::{FieldIssue, LayoutError, SpecViolation};
use crate::spec::{EnumSpec, VariantSpec};

/// Round `value` up to the next multiple of `align`.
///
/// `align` must be a power of two.
pub fn round_up(value: u64, align: u64) -> Result<u64, LayoutError> {
    if !align.is_power_of_two() {
        return Err(SpecViolation::Field(FieldIssue::AlignNotPowerOfTwo(align)).into());
    }
    let mask = align - 1;
    value
        .checked_add(mask)
        .map(|v| v & !mask)
        .ok_or_else(LayoutError::overflow)
}

/// Raw payload of one variant, before any enum-level padding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadLayout {
    pub size: u64,
    pub alignment: u64,
    /// Offset of each field from the start of the payload.
    pub field_offsets: Vec<u64>,
}

/// Variant layout within an enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantLayout {
    pub name: String,
    pub discriminant: u64,
    #[serde(flatten)]
    pub payload: PayloadLayout,
}

/// Enum memory layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutResult {
    pub name: String,
    pub discriminant_width: u64,
    pub variants: Vec<VariantLayout>,
    pub max_variant_size: u64,
    pub max_variant_align: u64,
    pub union_alignment: u64,
    pub payload_offset: u64,
    pub total_size: u64,
}

/// Where one variant sits inside its enum and how much of the payload
/// area it leaves empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantLayoutReport {
    pub enum_name: String,
    pub variant: String,
    pub discriminant: u64,
    pub size: u64,
    pub alignment: u64,
    pub payload_offset: u64,
    /// Padding between the tag and the payload.
    pub tag_padding: u64,
    /// Bytes past this variant's payload that other variants may use.
    pub unused_bytes: u64,
    pub total_size: u64,
}

impl LayoutResult {
    pub fn variant(&self, name: &str) -> Option<&VariantLayout> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Report for one variant of an already computed layout.
    pub fn report(&self, name: &str) -> Result<VariantLayoutReport, LayoutError> {
        let variant = self.variant(name).ok_or_else(|| LayoutError::NotFound {
            enum_name: self.name.clone(),
            variant: name.to_string(),
        })?;

        Ok(VariantLayoutReport {
            enum_name: self.name.clone(),
            variant: variant.name.clone(),
            discriminant: variant.discriminant,
            size: variant.payload.size,
            alignment: variant.payload.alignment,
            payload_offset: self.payload_offset,
            tag_padding: self.payload_offset.saturating_sub(self.discriminant_width),
            unused_bytes: self
                .total_size
                .saturating_sub(self.payload_offset)
                .saturating_sub(variant.payload.size),
            total_size: self.total_size,
        })
    }
}

/// Lay out the fields of one variant in declaration order.
///
/// Each field starts at the running offset rounded up to its alignment.
/// The variant is as aligned as its most aligned field (1 with no fields)
/// and its size is rounded up to that alignment.
pub fn compute_variant_layout(variant: &VariantSpec) -> Result<PayloadLayout, LayoutError> {
    let mut offset = 0u64;
    let mut alignment = 1u64;
    let mut field_offsets = Vec::with_capacity(variant.fields().len());

    for (index, field) in variant.fields().iter().enumerate() {
        field.check().map_err(|issue| SpecViolation::VariantField {
            variant: variant.name().to_string(),
            index,
            issue,
        })?;

        offset = round_up(offset, field.alignment())?;
        field_offsets.push(offset);
        offset = offset.checked_add(field.size()).ok_or_else(LayoutError::overflow)?;
        alignment = alignment.max(field.alignment());
    }

    Ok(PayloadLayout {
        size: round_up(offset, alignment)?,
        alignment,
        field_offsets,
    })
}

/// Bytes needed to store a discriminant for `variant_count` variants.
///
/// One byte covers up to 256 variants; beyond that the smallest of 2, 4 or
/// 8 bytes whose range holds every discriminant.
pub fn discriminant_width(variant_count: usize) -> Result<u64, LayoutError> {
    let count = variant_count as u64;
    match count {
        0 => Err(SpecViolation::NoVariants.into()),
        c if c <= 1 << 8 => Ok(1),
        c if c <= 1 << 16 => Ok(2),
        c if c <= 1 << 32 => Ok(4),
        _ => Ok(8),
    }
}

/// Compute the full tagged-union layout of an enum.
pub fn compute_enum_layout(spec: &EnumSpec) -> Result<LayoutResult, LayoutError> {
    spec.check()?;
    let discriminant_width = discriminant_width(spec.variants().len())?;

    let mut variants = Vec::with_capacity(spec.variants().len());
    let mut max_variant_size = 0u64;
    let mut max_variant_align = 1u64;

    for (discriminant, variant) in spec.variants().iter().enumerate() {
        let payload = compute_variant_layout(variant)?;
        max_variant_size = max_variant_size.max(payload.size);
        max_variant_align = max_variant_align.max(payload.alignment);
        variants.push(VariantLayout {
            name: variant.name().to_string(),
            discriminant: discriminant as u64,
            payload,
        });
    }

    let union_alignment = max_variant_align.max(discriminant_width);
    let payload_offset = round_up(discriminant_width, max_variant_align)?;
    let payload_end = payload_offset
        .checked_add(max_variant_size)
        .ok_or_else(LayoutError::overflow)?;
    let total_size = round_up(payload_end, union_alignment)?;

    Ok(LayoutResult {
        name: spec.name().to_string(),
        discriminant_width,
        variants,
        max_variant_size,
        max_variant_align,
        union_alignment,
        payload_offset,
        total_size,
    })
}

/// Layout report for a single variant, looked up by name.
pub fn describe_variant(spec: &EnumSpec, name: &str) -> Result<VariantLayoutReport, LayoutError> {
    compute_enum_layout(spec)?.report(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::FieldSpec;

    fn field(size: u64, align: u64) -> FieldSpec {
        FieldSpec::new(size, align).unwrap()
    }

    fn shape() -> EnumSpec {
        EnumSpec::new(
            "Shape",
            vec![
                VariantSpec::new("Circle", vec![field(8, 8)]),
                VariantSpec::new("Rectangle", vec![field(8, 8), field(8, 8)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn shape_layout() {
        let layout = compute_enum_layout(&shape()).unwrap();
        assert_eq!(layout.discriminant_width, 1);
        assert_eq!(layout.max_variant_size, 16);
        assert_eq!(layout.max_variant_align, 8);
        assert_eq!(layout.union_alignment, 8);
        assert_eq!(layout.payload_offset, 8);
        assert_eq!(layout.total_size, 24);
        assert_eq!(layout.variants[1].discriminant, 1);
    }

    #[test]
    fn single_variant_still_pays_for_tag() {
        let spec = EnumSpec::new("Boxed", vec![VariantSpec::new("Only", vec![field(8, 8)])]).unwrap();
        let layout = compute_enum_layout(&spec).unwrap();
        assert_eq!(layout.payload_offset, 8);
        assert_eq!(layout.total_size, 16);
    }

    #[test]
    fn describe_circle() {
        let report = describe_variant(&shape(), "Circle").unwrap();
        assert_eq!(report.discriminant, 0);
        assert_eq!(report.size, 8);
        assert_eq!(report.alignment, 8);
        assert_eq!(report.payload_offset, 8);
        assert_eq!(report.tag_padding, 7);
        assert_eq!(report.unused_bytes, 8);
        assert_eq!(report.total_size, 24);

        let rect = describe_variant(&shape(), "Rectangle").unwrap();
        assert_eq!(rect.unused_bytes, 0);
    }

    #[test]
    fn describe_missing_variant() {
        let err = describe_variant(&shape(), "Triangle").unwrap_err();
        assert_eq!(
            err,
            LayoutError::NotFound {
                enum_name: "Shape".into(),
                variant: "Triangle".into()
            }
        );
        assert_eq!(err.to_string(), "enum `Shape` has no variant named `Triangle`");
        // Case matters.
        assert!(describe_variant(&shape(), "circle").is_err());
    }

    #[test]
    fn field_offsets_follow_alignment() {
        let v = VariantSpec::new("Mixed", vec![field(1, 1), field(4, 4), field(2, 2)]);
        let payload = compute_variant_layout(&v).unwrap();
        assert_eq!(payload.field_offsets, vec![0, 4, 8]);
        assert_eq!(payload.alignment, 4);
        assert_eq!(payload.size, 12);
    }

    #[test]
    fn empty_variant_is_zero_sized() {
        let payload = compute_variant_layout(&VariantSpec::unit("None")).unwrap();
        assert_eq!(payload.size, 0);
        assert_eq!(payload.alignment, 1);
        assert!(payload.field_offsets.is_empty());
    }

    #[test]
    fn fieldless_enum_is_just_a_tag() {
        let spec = EnumSpec::new(
            "Color",
            vec![VariantSpec::unit("Red"), VariantSpec::unit("Green"), VariantSpec::unit("Blue")],
        )
        .unwrap();
        let layout = compute_enum_layout(&spec).unwrap();
        assert_eq!(layout.payload_offset, 1);
        assert_eq!(layout.total_size, 1);
        assert_eq!(layout.union_alignment, 1);
    }

    #[test]
    fn discriminant_width_boundaries() {
        assert_eq!(discriminant_width(1).unwrap(), 1);
        assert_eq!(discriminant_width(256).unwrap(), 1);
        assert_eq!(discriminant_width(257).unwrap(), 2);
        assert_eq!(discriminant_width(65_536).unwrap(), 2);
        assert_eq!(discriminant_width(65_537).unwrap(), 4);
        assert_eq!(discriminant_width(1 << 32).unwrap(), 4);
        assert_eq!(discriminant_width((1 << 32) + 1).unwrap(), 8);
        assert_eq!(
            discriminant_width(0),
            Err(LayoutError::InvalidSpec(SpecViolation::NoVariants))
        );
    }

    #[test]
    fn wide_tag_raises_union_alignment() {
        let variants = (0..300).map(|i| VariantSpec::unit(format!("V{}", i))).collect();
        let spec = EnumSpec::new("Many", variants).unwrap();
        let layout = compute_enum_layout(&spec).unwrap();
        assert_eq!(layout.discriminant_width, 2);
        assert_eq!(layout.union_alignment, 2);
        assert_eq!(layout.payload_offset, 2);
        assert_eq!(layout.total_size, 2);
    }

    #[test]
    fn dominated_variant_changes_nothing() {
        let base = shape();
        let before = compute_enum_layout(&base).unwrap();

        let mut variants = base.variants().to_vec();
        variants.push(VariantSpec::new("Point", vec![field(4, 4)]));
        let extended = EnumSpec::new("Shape", variants).unwrap();
        let after = compute_enum_layout(&extended).unwrap();

        assert_eq!(after.total_size, before.total_size);
        assert_eq!(after.union_alignment, before.union_alignment);
        assert_eq!(after.variants.len(), 3);
    }

    #[test]
    fn layout_invariants_hold_across_shapes() {
        // Deterministic pseudo-random walk over field mixes and variant counts.
        let palette = [(1, 1), (2, 2), (4, 4), (8, 8), (16, 16), (12, 4), (3, 1), (6, 2)];
        let mut seed = 0x2545_f491_u64;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for round in 0..200 {
            let variant_count = 1 + (next() % 6) as usize;
            let variants: Vec<VariantSpec> = (0..variant_count)
                .map(|i| {
                    let field_count = (next() % 5) as usize;
                    let fields = (0..field_count)
                        .map(|_| {
                            let (s, a) = palette[(next() % palette.len() as u64) as usize];
                            field(s, a)
                        })
                        .collect();
                    VariantSpec::new(format!("V{}", i), fields)
                })
                .collect();
            let spec = EnumSpec::new(format!("E{}", round), variants).unwrap();
            let layout = compute_enum_layout(&spec).unwrap();

            assert!(layout.union_alignment.is_power_of_two());
            assert_eq!(layout.total_size % layout.union_alignment, 0);
            assert!(layout.total_size >= layout.discriminant_width + layout.max_variant_size);
            assert!(layout.payload_offset >= layout.discriminant_width);
            for v in &layout.variants {
                assert_eq!(v.payload.size % v.payload.alignment, 0);
                assert!(layout.payload_offset + v.payload.size <= layout.total_size);
            }
        }
    }

    #[test]
    fn layout_is_deterministic() {
        assert_eq!(compute_enum_layout(&shape()).unwrap(), compute_enum_layout(&shape()).unwrap());
    }

    #[test]
    fn report_matches_describe() {
        let layout = compute_enum_layout(&shape()).unwrap();
        assert_eq!(layout.report("Circle").unwrap(), describe_variant(&shape(), "Circle").unwrap());
        assert!(layout.variant("Rectangle").is_some());
        assert!(layout.variant("Square").is_none());
    }

    #[test]
    fn overflow_is_invalid() {
        let v = VariantSpec::new("Huge", vec![field(u64::MAX, 1), field(1, 1)]);
        assert_eq!(
            compute_variant_layout(&v),
            Err(LayoutError::InvalidSpec(SpecViolation::Overflow))
        );
    }

    #[test]
    fn round_up_rules() {
        assert_eq!(round_up(0, 8).unwrap(), 0);
        assert_eq!(round_up(1, 8).unwrap(), 8);
        assert_eq!(round_up(8, 8).unwrap(), 8);
        assert_eq!(round_up(9, 4).unwrap(), 12);
        assert!(round_up(5, 3).is_err());
        assert!(round_up(u64::MAX, 2).is_err());
    }

    #[test]
    fn deserialized_specs_are_revalidated() {
        let json = r#"{ "name": "Bad", "variants": [
            { "name": "Ok", "fields": [{ "size": 4, "alignment": 4 }] },
            { "name": "Broken", "fields": [{ "size": 4, "alignment": 4 }, { "size": 0, "alignment": 1 }] }
        ] }"#;
        let spec: EnumSpec = serde_json::from_str(json).unwrap();
        let err = compute_enum_layout(&spec).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidSpec(SpecViolation::VariantField {
                variant: "Broken".into(),
                index: 1,
                issue: FieldIssue::ZeroSize,
            })
        );
        assert_eq!(
            err.to_string(),
            "invalid layout spec: field 1 of variant `Broken`: size must be positive"
        );

        let empty: EnumSpec = serde_json::from_str(r#"{ "name": "Never", "variants": [] }"#).unwrap();
        assert_eq!(
            compute_enum_layout(&empty),
            Err(LayoutError::InvalidSpec(SpecViolation::NoVariants))
        );
        assert!(describe_variant(&empty, "Anything").is_err());
    }

    #[test]
    fn serializes_flat_variant_layout() {
        let layout = compute_enum_layout(&shape()).unwrap();
        let value = serde_json::to_value(&layout).unwrap();
        assert_eq!(value["total_size"], 24);
        assert_eq!(value["variants"][0]["name"], "Circle");
        assert_eq!(value["variants"][0]["size"], 8);
        assert_eq!(value["variants"][1]["field_offsets"][1], 8);
    }
}
