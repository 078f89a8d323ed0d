// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax tree types for enum layout descriptions.
//!
//! Shared between the lexer, the parser, and the lowering pass that turns
//! declarations into layout specs.

pub mod span;
pub mod token;
pub mod decl;

pub use span::{LineMap, Span};
