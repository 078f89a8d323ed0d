// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! tagsize CLI - tagged-union layout calculator.

mod commands;
mod help;
mod output;

use std::env;
use std::process;

use tagsize_diagnostics::formatter::DiagnosticFormatter;
use tagsize_diagnostics::json;
use tagsize_diagnostics::Diagnostic;
use tagsize_types::{parse_pointer_width, TargetConfig};

/// Output format for diagnostics and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Human,
    Json,
}

/// Global options, parsed from anywhere on the command line.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub format: Format,
    pub target: TargetConfig,
}

fn main() {
    output::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (args, opts) = match parse_options(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{}: {}", output::error_label(), msg);
            process::exit(1);
        }
    };

    let Some(command) = args.first() else {
        help::print_usage();
        return;
    };

    match command.as_str() {
        "layout" => {
            let Some(path) = args.get(1) else {
                usage_error("tagsize layout <file>");
            };
            commands::layout::cmd_layout(path, opts);
        }
        "describe" => {
            let (Some(path), Some(enum_name), Some(variant)) = (args.get(1), args.get(2), args.get(3)) else {
                usage_error("tagsize describe <file> <Enum> <Variant>");
            };
            commands::layout::cmd_describe(path, enum_name, variant, opts);
        }
        "lex" => {
            let Some(path) = args.get(1) else {
                usage_error("tagsize lex <file>");
            };
            commands::phase::cmd_lex(path, opts.format);
        }
        "parse" => {
            let Some(path) = args.get(1) else {
                usage_error("tagsize parse <file>");
            };
            commands::phase::cmd_parse(path, opts.format);
        }
        "explain" => {
            let Some(code) = args.get(1) else {
                usage_error("tagsize explain <code>");
            };
            commands::tools::cmd_explain(code);
        }
        "help" | "--help" | "-h" => help::print_usage(),
        "version" | "--version" | "-V" => {
            println!("tagsize {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("{}: unknown command `{}`", output::error_label(), other);
            eprintln!("Run `tagsize help` for available commands.");
            process::exit(1);
        }
    }
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: {}", usage);
    process::exit(1);
}

/// Split global options from positional arguments.
///
/// The pointer width comes from `--pointer-width`, then
/// `TAGSIZE_POINTER_WIDTH`, then the default.
fn parse_options(args: Vec<String>) -> Result<(Vec<String>, Options), String> {
    let mut format = Format::Human;
    let mut pointer_width = None;
    let mut positional = Vec::new();

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "--json" {
            format = Format::Json;
        } else if arg == "--pointer-width" {
            let value = iter
                .next()
                .ok_or_else(|| "--pointer-width needs a value".to_string())?;
            pointer_width = Some(parse_pointer_width(&value).map_err(|e| e.to_string())?);
        } else if let Some(value) = arg.strip_prefix("--pointer-width=") {
            pointer_width = Some(parse_pointer_width(value).map_err(|e| e.to_string())?);
        } else {
            positional.push(arg);
        }
    }

    let target = match pointer_width {
        Some(width) => TargetConfig::with_pointer_width(width),
        None => TargetConfig::from_env(),
    }
    .map_err(|e| e.to_string())?;

    Ok((positional, Options { format, target }))
}

/// Print diagnostics in the requested format.
pub fn show_diagnostics(diagnostics: &[Diagnostic], source: &str, path: &str, phase: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(path);
            for diag in diagnostics {
                eprintln!("{}", formatter.format(diag));
            }
        }
        Format::Json => {
            let report = json::to_json_report(diagnostics, source, path, phase);
            println!("{}", json::to_json_string(&report));
        }
    }
}

/// Print warnings from a phase that otherwise succeeded.
///
/// Always on stderr, so `--json` output on stdout stays one document.
pub fn show_warnings(warnings: &[Diagnostic], source: &str, path: &str, format: Format) {
    match format {
        Format::Human => {
            let formatter = DiagnosticFormatter::new(source).with_file_name(path);
            for diag in warnings {
                eprintln!("{}", formatter.format(diag));
            }
        }
        Format::Json => {
            let report = json::to_json_report(warnings, source, path, "lower");
            eprintln!("{}", json::to_json_string(&report));
        }
    }
}

/// Get the line number for a byte offset.
pub fn get_line_number(source: &str, pos: usize) -> usize {
    source[..pos.min(source.len())].matches('\n').count() + 1
}
