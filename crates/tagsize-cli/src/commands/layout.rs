// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Layout commands: layout, describe.

use std::process;

use serde::{Deserialize, Serialize};
use tagsize_ast::Span;
use tagsize_diagnostics::{Diagnostic, ToDiagnostic};
use tagsize_layout::{compute_enum_layout, describe_variant, EnumSpec, VariantLayoutReport};
use tagsize_types::{FieldOrigin, LoweredEnum};

use super::read_source;
use crate::{output, show_diagnostics, show_warnings, Format, Options};

/// A `.json` input: one serialized enum or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpecFile {
    One(EnumSpec),
    Many(Vec<EnumSpec>),
}

pub fn cmd_layout(path: &str, opts: Options) {
    let enums = load_enums(path, opts);

    match opts.format {
        Format::Human => {
            for (i, lowered) in enums.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print_layout(lowered);
            }
            println!("\n{}", output::banner_ok(&format!("Layout: {} enums", enums.len())));
        }
        Format::Json => {
            let layouts: Vec<_> = enums.iter().map(|e| &e.layout).collect();
            print_json(&layouts);
        }
    }
}

pub fn cmd_describe(path: &str, enum_name: &str, variant: &str, opts: Options) {
    let enums = load_enums(path, opts);

    let Some(lowered) = enums.iter().find(|e| e.spec.name() == enum_name) else {
        let names: Vec<&str> = enums.iter().map(|e| e.spec.name()).collect();
        let diag = Diagnostic::error(format!("no enum named `{}`", enum_name))
            .with_note(format!("enums in this file: {}", names.join(", ")));
        fail(&[diag], "", path, "describe", opts.format);
    };

    match describe_variant(&lowered.spec, variant) {
        Ok(report) => match opts.format {
            Format::Human => print_report(&report),
            Format::Json => print_json(&report),
        },
        Err(e) => {
            let names: Vec<&str> = lowered.spec.variants().iter().map(|v| v.name()).collect();
            let diag = e
                .to_diagnostic()
                .with_note(format!("variants of `{}`: {}", enum_name, names.join(", ")));
            fail(&[diag], "", path, "describe", opts.format);
        }
    }
}

/// Lower and lay out every enum in a file, exiting on the first failing phase.
fn load_enums(path: &str, opts: Options) -> Vec<LoweredEnum> {
    let source = read_source(path);
    if path.ends_with(".json") {
        load_json(&source, path, opts.format)
    } else {
        load_description(&source, path, opts)
    }
}

fn load_description(source: &str, path: &str, opts: Options) -> Vec<LoweredEnum> {
    let lex_result = tagsize_lexer::Lexer::new(source).tokenize();
    if !lex_result.is_ok() {
        let diags: Vec<Diagnostic> = lex_result.errors.iter().map(|e| e.to_diagnostic()).collect();
        fail(&diags, source, path, "lex", opts.format);
    }

    let parse_result = tagsize_parser::Parser::new(lex_result.tokens).parse();
    if !parse_result.is_ok() {
        let diags: Vec<Diagnostic> = parse_result.errors.iter().map(|e| e.to_diagnostic()).collect();
        fail(&diags, source, path, "parse", opts.format);
    }

    let lowered = tagsize_types::lower(&parse_result.decls, &opts.target);
    let warnings: Vec<Diagnostic> = lowered.warnings.iter().map(|w| w.to_diagnostic()).collect();
    if !lowered.is_ok() {
        let mut diags: Vec<Diagnostic> = lowered.errors.iter().map(|e| e.to_diagnostic()).collect();
        diags.extend(warnings);
        fail(&diags, source, path, "lower", opts.format);
    }
    if !warnings.is_empty() {
        show_warnings(&warnings, source, path, opts.format);
    }
    lowered.enums
}

fn load_json(source: &str, path: &str, format: Format) -> Vec<LoweredEnum> {
    let specs = match serde_json::from_str::<SpecFile>(source) {
        Ok(SpecFile::One(spec)) => vec![spec],
        Ok(SpecFile::Many(specs)) => specs,
        Err(e) => {
            let diag = Diagnostic::error(format!("not a valid enum spec file: {}", e))
                .with_help("expected {\"name\": .., \"variants\": [{\"name\": .., \"fields\": [{\"size\": .., \"alignment\": ..}]}]} or a list of those");
            fail(&[diag], source, path, "layout", format);
        }
    };

    let mut enums = Vec::with_capacity(specs.len());
    let mut diags = Vec::new();
    for spec in specs {
        match compute_enum_layout(&spec) {
            Ok(layout) => {
                let fields = spec
                    .variants()
                    .iter()
                    .map(|v| {
                        v.fields()
                            .iter()
                            .enumerate()
                            .map(|(i, f)| FieldOrigin {
                                name: format!("_{}", i),
                                ty: format!("bytes({}, {})", f.size(), f.alignment()),
                            })
                            .collect()
                    })
                    .collect();
                enums.push(LoweredEnum {
                    spec,
                    layout,
                    fields,
                    span: Span::default(),
                });
            }
            Err(e) => diags.push(e.to_diagnostic().with_note(format!("in enum `{}`", spec.name()))),
        }
    }

    if !diags.is_empty() {
        fail(&diags, source, path, "layout", format);
    }
    enums
}

fn fail(diags: &[Diagnostic], source: &str, path: &str, phase: &str, format: Format) -> ! {
    show_diagnostics(diags, source, path, phase, format);
    if format == Format::Human {
        let title = match phase {
            "lex" => "Lex",
            "parse" => "Parse",
            "lower" => "Lower",
            _ => "Layout",
        };
        let errors = diags.iter().filter(|d| d.is_error()).count();
        eprintln!("\n{}", output::banner_fail(title, errors));
    }
    process::exit(1);
}

fn print_layout(lowered: &LoweredEnum) {
    let layout = &lowered.layout;
    println!(
        "enum {} (size: {}, align: {})",
        output::type_name(&layout.name),
        output::number(layout.total_size),
        output::number(layout.union_alignment)
    );
    println!(
        "  tag: {} {}, payload at {} ({})",
        output::number(layout.discriminant_width),
        if layout.discriminant_width == 1 { "byte" } else { "bytes" },
        output::number(layout.payload_offset),
        output::padding(layout.payload_offset.saturating_sub(layout.discriminant_width))
    );

    for (variant, origins) in layout.variants.iter().zip(&lowered.fields) {
        let unused = layout
            .report(&variant.name)
            .map(|r| r.unused_bytes)
            .unwrap_or_default();
        println!(
            "  {} = {} (size: {}, align: {}, unused: {})",
            variant.name,
            variant.discriminant,
            output::number(variant.payload.size),
            output::number(variant.payload.alignment),
            output::number(unused)
        );
        for (origin, offset) in origins.iter().zip(&variant.payload.field_offsets) {
            println!("    {}: {} at +{}", origin.name, origin.ty, offset);
        }
    }
}

fn print_report(report: &VariantLayoutReport) {
    println!("{}::{}", output::type_name(&report.enum_name), output::type_name(&report.variant));
    println!("  discriminant    {}", output::number(report.discriminant));
    println!(
        "  payload size    {} (align {})",
        output::number(report.size),
        output::number(report.alignment)
    );
    println!("  payload offset  {}", output::number(report.payload_offset));
    println!("  tag padding     {}", output::number(report.tag_padding));
    println!("  unused bytes    {}", output::number(report.unused_bytes));
    println!("  total size      {}", output::number(report.total_size));
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}: serializing output: {}", output::error_label(), e);
            process::exit(1);
        }
    }
}
