// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Help text for CLI commands.

use crate::output;

pub fn print_usage() {
    println!(
        "{} {} - Tagged-union size calculator",
        output::title("tagsize"),
        output::version(env!("CARGO_PKG_VERSION"))
    );
    println!();
    println!(
        "{}: {} {} {} {}",
        output::section_header("Usage"),
        output::command("tagsize"),
        output::arg("[options]"),
        output::arg("<command>"),
        output::arg("[args]")
    );
    println!();
    println!("{}", output::section_header("Layout:"));
    println!("  {} {}                     Print the layout of every enum in a file", output::command("layout"), output::arg("<file>"));
    println!("  {} {}  Show where one variant sits in its enum", output::command("describe"), output::arg("<file> <Enum> <Variant>"));

    println!();
    println!("{}", output::section_header("Phases:"));
    println!("  {} {}                        Tokenize a file and print tokens", output::command("lex"), output::arg("<file>"));
    println!("  {} {}                      Parse a file and print declarations", output::command("parse"), output::arg("<file>"));

    println!();
    println!("{}", output::section_header("Other:"));
    println!("  {} {}                    Explain an error code", output::command("explain"), output::arg("<code>"));
    println!("  {}                              Show this help", output::command("help"));
    println!("  {}                           Show version", output::command("version"));

    println!();
    println!("{}", output::section_header("Options:"));
    println!("  {}               Machine-readable JSON output", output::arg("--json"));
    println!("  {}  Bytes in a pointer: 2, 4 or 8 (default 8,", output::arg("--pointer-width <N>"));
    println!("                        or $TAGSIZE_POINTER_WIDTH)");

    println!();
    println!("Files ending in {} are read as serialized enum specs.", output::arg(".json"));
}
