// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CLI command implementations.

pub mod layout;
pub mod phase;
pub mod tools;

use std::fs;
use std::process;

use crate::output;

/// Read a source file or exit with an error.
pub fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: reading {}: {}", output::error_label(), output::file_path(path), e);
            process::exit(1);
        }
    }
}
