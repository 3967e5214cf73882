// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Byte spans and line/column mapping over template source.

/// A span in the source of a template file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Maps byte offsets in a template file to line and column numbers.
///
/// Built once per file; each lookup is a binary search over the collected
/// line starts.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Byte offset where each line begins; `starts[0]` is 0.
    starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Line and column of a byte offset, both 1-based. A newline byte
    /// belongs to the line it terminates.
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let col = offset - self.starts[line - 1] + 1;
        (line as u32, col as u32)
    }

    /// The text of a 1-based line, without its terminating newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.starts.get(idx)?;
        let end = match self.starts.get(idx + 1) {
            Some(&next) => next - 1,
            None => source.len(),
        };
        source.get(start..end)
    }

    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }
}
