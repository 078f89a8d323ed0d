// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Phase inspection commands: lex, parse.

use std::process;

use tagsize_ast::token::TokenKind;
use tagsize_diagnostics::{Diagnostic, ToDiagnostic};

use super::read_source;
use crate::{get_line_number, output, show_diagnostics, Format};

pub fn cmd_lex(path: &str, format: Format) {
    let source = read_source(path);
    let result = tagsize_lexer::Lexer::new(&source).tokenize();

    if !result.is_ok() {
        let diags: Vec<Diagnostic> = result.errors.iter().map(|e| e.to_diagnostic()).collect();
        show_diagnostics(&diags, &source, path, "lex", format);
        if format == Format::Human {
            eprintln!("\n{}", output::banner_fail("Lex", result.errors.len()));
        }
        process::exit(1);
    }

    match format {
        Format::Human => {
            println!("{}\n", output::section(&format!("Tokens ({})", result.tokens.len())));
            for tok in &result.tokens {
                if matches!(tok.kind, TokenKind::Newline) {
                    continue;
                }
                println!("{:4}:{:<4} {:?}", tok.span.start, tok.span.end, tok.kind);
            }
            println!("\n{}", output::banner_ok(&format!("Lex: {} tokens", result.tokens.len())));
        }
        Format::Json => {
            let tokens: Vec<serde_json::Value> = result
                .tokens
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "kind": format!("{:?}", t.kind),
                        "start": t.span.start,
                        "end": t.span.end,
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(tokens));
        }
    }
}

pub fn cmd_parse(path: &str, format: Format) {
    let source = read_source(path);
    let mut all_diags: Vec<Diagnostic> = Vec::new();

    let lex_result = tagsize_lexer::Lexer::new(&source).tokenize();

    // One diagnostic per line; later errors on a line are usually fallout.
    let mut last_line: Option<usize> = None;
    for error in &lex_result.errors {
        let line = get_line_number(&source, error.span.start);
        if last_line != Some(line) {
            all_diags.push(error.to_diagnostic());
            last_line = Some(line);
        }
    }

    let token_count = lex_result.tokens.len();
    let parse_result = tagsize_parser::Parser::new(lex_result.tokens).parse();

    last_line = None;
    for error in &parse_result.errors {
        let line = get_line_number(&source, error.span.start);
        if last_line != Some(line) {
            all_diags.push(error.to_diagnostic());
            last_line = Some(line);
        }
    }

    if !all_diags.is_empty() {
        show_diagnostics(&all_diags, &source, path, "parse", format);
        if format == Format::Human {
            eprintln!("\n{}", output::banner_fail("Parse", all_diags.len()));
        }
        process::exit(1);
    }

    match format {
        Format::Human => {
            println!("{}\n", output::section(&format!("Lexed {} tokens", token_count)));
            println!("{}\n", output::section(&format!("Declarations ({})", parse_result.decls.len())));
            for decl in &parse_result.decls {
                println!("enum {} {{", output::type_name(&decl.name));
                for variant in &decl.variants {
                    let fields: Vec<String> = variant
                        .fields
                        .iter()
                        .map(|f| format!("{}: {}", f.name, f.ty))
                        .collect();
                    if fields.is_empty() {
                        println!("    {}", variant.name);
                    } else {
                        println!("    {} {{ {} }}", variant.name, fields.join(", "));
                    }
                }
                println!("}}");
            }
            println!("\n{}", output::banner_ok("Parse"));
        }
        Format::Json => {
            let decls: Vec<serde_json::Value> = parse_result
                .decls
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.name,
                        "variants": d.variants.iter().map(|v| serde_json::json!({
                            "name": v.name,
                            "fields": v.fields.iter().map(|f| serde_json::json!({
                                "name": f.name,
                                "type": f.ty.to_string(),
                            })).collect::<Vec<_>>(),
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect();
            println!("{}", serde_json::Value::Array(decls));
        }
    }
}
