//! Structure-preserving suppression of content-stream lines.
//!
//! Suppressed lines are commented out in place, never removed, so line
//! numbers stay valid and bytes outside the marked lines are untouched.

use std::collections::BTreeSet;

use crate::lines::LineSequence;
use crate::matcher::LineMatcher;

/// Which lines to suppress.
///
/// A line is selected if its index is an explicit target, or if it lies in
/// the inclusive range `[start_line, end_line]` and the matcher accepts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressionSelection {
    targets: BTreeSet<usize>,
    start_line: usize,
    end_line: Option<usize>,
}

/// Why a line was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected {
    Explicit,
    Matched,
}

impl SuppressionSelection {
    /// Range-only selection. `end_line` of `None` means the total line count.
    pub fn range(start_line: usize, end_line: Option<usize>) -> Self {
        Self {
            targets: BTreeSet::new(),
            start_line,
            end_line,
        }
    }

    pub fn with_targets<I: IntoIterator<Item = usize>>(mut self, targets: I) -> Self {
        self.targets.extend(targets);
        self
    }

    /// Resolved inclusive end of the range for a stream of `total_lines`.
    pub fn end_line(&self, total_lines: usize) -> usize {
        self.end_line.unwrap_or(total_lines)
    }

    fn select(
        &self,
        index: usize,
        line: &[u8],
        end_line: usize,
        matcher: &dyn LineMatcher,
    ) -> Option<Selected> {
        if self.targets.contains(&index) {
            Some(Selected::Explicit)
        } else if (self.start_line..=end_line).contains(&index) && matcher.matches(line) {
            Some(Selected::Matched)
        } else {
            None
        }
    }
}

/// Outcome of [`suppress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    pub lines: LineSequence,
    /// Indices of commented-out lines, ascending, with the reason.
    pub suppressed: Vec<(usize, Selected)>,
    /// The inclusive range end that was applied.
    pub end_line: usize,
}

impl Suppression {
    pub fn count(&self) -> usize {
        self.suppressed.len()
    }
}

/// Prefix every selected line with `marker`.
pub fn suppress(
    lines: &LineSequence,
    selection: &SuppressionSelection,
    matcher: &dyn LineMatcher,
    marker: &[u8],
) -> Suppression {
    let end_line = selection.end_line(lines.len());
    let mut suppressed = Vec::new();
    let mut out = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        match selection.select(index, line, end_line, matcher) {
            Some(reason) => {
                let mut marked = Vec::with_capacity(marker.len() + line.len());
                marked.extend_from_slice(marker);
                marked.extend_from_slice(line);
                out.push(marked);
                suppressed.push((index, reason));
            }
            None => out.push(line.to_vec()),
        }
    }

    log::debug!(
        "Suppressed {} of {} lines (range {}-{}, {} explicit targets)",
        suppressed.len(),
        lines.len(),
        selection.start_line,
        end_line,
        selection.targets.len()
    );

    Suppression {
        lines: LineSequence::from_lines(out),
        suppressed,
        end_line,
    }
}
