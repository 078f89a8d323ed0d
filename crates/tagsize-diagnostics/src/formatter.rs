// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[E0200]: unknown type `Strng`
//!   --> shapes.tsz:3:12
//!    |
//!  3 |     Label(Strng)
//!    |           ^^^^^ not a primitive or a declared enum
//!    |
//!    = help: field types are primitives, arrays, pointers, bytes(..) or enums
//! ```

use colored::Colorize;
use std::collections::BTreeMap;

use tagsize_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(primary) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        };
        if annotated.is_empty() {
            self.format_footer(&mut out, diagnostic, 2);
            return out;
        }

        let (line, col) = self.offset_to_line_col(primary.start);
        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            "-->".blue(),
            self.file_name.unwrap_or("<source>"),
            line,
            col
        ));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);
        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            if let Some(prev) = prev_line_num {
                if annotated_line.line_num > prev + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
            }

            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));
            self.format_annotations(&mut out, annotated_line, gutter_width);

            prev_line_num = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic, gutter_width);
        out
    }

    /// Format several diagnostics separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity_str = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };

        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity_str,
                code.0.as_str().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity_str, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic, gutter_width: usize) {
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "help".cyan().bold(),
                help
            ));
        }
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.offset_to_line_col(label.span.end);
            let text = self.get_line(line_num).unwrap_or("");

            // Multi-line spans are underlined to the end of their first line.
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            let entry = lines.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
        sorted.sort_by_key(|a| (a.style == LabelStyle::Secondary, a.col_start));

        let width = line.text.len() + 2;
        let mut underline = vec![' '; width];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            let start = ann.col_start.saturating_sub(1).min(width);
            let end = ann.col_end.saturating_sub(1).min(width);
            for slot in &mut underline[start..end.max(start)] {
                if *slot == ' ' {
                    *slot = ch;
                }
            }
            if let Some(msg) = &ann.message {
                messages.push((start, ann.style, msg.as_str()));
            }
        }

        let underline: String = underline.into_iter().collect::<String>().trim_end().to_string();
        if underline.is_empty() {
            return;
        }
        let pad = " ".repeat(gutter_width + 1);

        if messages.len() <= 1 {
            match messages.first() {
                Some((_, style, msg)) => out.push_str(&format!(
                    "{} {} {} {}\n",
                    pad,
                    "|".blue(),
                    color_underline(&underline),
                    styled(msg, *style)
                )),
                None => out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(&underline))),
            }
            return;
        }

        // Several labels on one line: messages go beneath, rightmost first.
        out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(&underline)));
        messages.sort_by_key(|(col, _, _)| std::cmp::Reverse(*col));
        for (col, style, msg) in messages {
            out.push_str(&format!(
                "{} {} {}{} {}\n",
                pad,
                "|".blue(),
                " ".repeat(col),
                styled("|", style),
                styled(msg, style)
            ));
        }
    }

    /// Convert byte offset to (line, col), both 1-based.
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    /// Get source line text by 1-based line number.
    fn get_line(&self, line_num: usize) -> Option<&str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

fn styled(text: &str, style: LabelStyle) -> String {
    match style {
        LabelStyle::Primary => text.red().bold().to_string(),
        LabelStyle::Secondary => text.blue().to_string(),
    }
}

/// Color the underline characters (^ in red, - in blue).
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut run = String::new();
    let mut current = None;

    for ch in s.chars() {
        let kind = matches!(ch, '^' | '-').then_some(ch);
        if kind != current && !run.is_empty() {
            result.push_str(&flush_run(&run, current));
            run.clear();
        }
        run.push(ch);
        current = kind;
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, current));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}
