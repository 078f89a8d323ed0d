// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Byte spans and line lookup for description files.

/// A half-open byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line-start table for turning byte offsets into `line:col` positions.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Offset of the first byte of every line; always starts with 0.
    starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// 1-based `(line, column)` of a byte offset.
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let idx = self.starts.partition_point(|&s| s <= offset).saturating_sub(1);
        let col = offset.saturating_sub(self.starts[idx]) + 1;
        ((idx + 1) as u32, col as u32)
    }

    /// Text of a 1-based line, without its trailing newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.starts.get(idx)?;
        let end = match self.starts.get(idx + 1) {
            Some(&next) => next - 1,
            None => source.len(),
        };
        source.get(start..end).map(|s| s.trim_end_matches('\r'))
    }

    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }
}
