// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Utility commands: explain.

use colored::Colorize;
use std::process;

use tagsize_diagnostics::codes::ErrorCodeRegistry;

use crate::output;

pub fn cmd_explain(code: &str) {
    let registry = ErrorCodeRegistry::default();
    let code = code.to_ascii_uppercase();

    let Some(info) = registry.get(&code) else {
        eprintln!("{}: unknown error code `{}`", output::error_label(), code);
        eprintln!();
        eprintln!("Codes use the format E0NNN or W0NNN (e.g., E0200, W0200).");
        process::exit(1);
    };

    let severity = if info.code.starts_with('W') {
        "warning".yellow().bold()
    } else {
        "error".red().bold()
    };
    println!("{}[{}]: {}", severity, info.code.bold(), info.title.bold());
    println!();
    println!("  Category: {}", info.category);
    println!();
    for line in info.description.lines() {
        println!("  {}", line);
    }
    println!();
    if !info.example.is_empty() {
        println!("  {}:", "Example".bold());
        println!();
        for line in info.example.lines() {
            println!("    {}", line);
        }
        println!();
    }
    println!("  Run `tagsize layout <file>` to see it in context.");
}
