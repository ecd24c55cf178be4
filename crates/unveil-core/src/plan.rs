//! Step plans: the sequence of line-count cutoffs a Stepper walks.

use crate::error::{Result, UnveilError};

/// Largest number of cutoffs a plan may hold.
pub const MAX_PLAN_POINTS: u64 = 1_000_000;

/// How a range of lines is divided into cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMode {
    /// Advance by a fixed number of lines; the last interval may be shorter.
    Stride(usize),
    /// Divide the range into this many equal bins. Must be positive.
    Bins(i64),
}

/// Non-decreasing cutoffs bounded by `[start_line, end_line]`, ending at
/// `end_line`. Each cutoff is a count of leading lines to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    start_line: usize,
    end_line: usize,
    mode: StepMode,
    cutoffs: Vec<usize>,
}

impl StepPlan {
    pub fn new(start_line: usize, end_line: usize, mode: StepMode) -> Result<Self> {
        if let StepMode::Bins(bins) = mode {
            if bins <= 0 {
                return Err(UnveilError::InvalidBins(bins));
            }
            let points = bins as u64 + 1;
            if points > MAX_PLAN_POINTS {
                return Err(UnveilError::PlanTooLarge {
                    points,
                    limit: MAX_PLAN_POINTS,
                });
            }
        }
        if mode == StepMode::Stride(0) {
            return Err(UnveilError::InvalidStep);
        }
        if start_line > end_line {
            return Err(UnveilError::InvalidRange {
                start: start_line,
                end: end_line,
            });
        }

        let cutoffs = match mode {
            StepMode::Bins(bins) => bin_cutoffs(start_line, end_line, bins as u64),
            StepMode::Stride(step) => stride_cutoffs(start_line, end_line, step),
        };

        Ok(Self {
            start_line,
            end_line,
            mode,
            cutoffs,
        })
    }

    /// Build a plan over a stream of `total_lines` lines. A missing or
    /// oversized `end_line` becomes `total_lines`.
    pub fn for_lines(
        start_line: usize,
        end_line: Option<usize>,
        total_lines: usize,
        mode: StepMode,
    ) -> Result<Self> {
        let end_line = end_line.map_or(total_lines, |end| end.min(total_lines));
        Self::new(start_line, end_line, mode)
    }

    pub fn cutoffs(&self) -> &[usize] {
        &self.cutoffs
    }

    pub fn len(&self) -> usize {
        self.cutoffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cutoffs.is_empty()
    }

    /// Cutoffs with consecutive repeats collapsed. Bins mode over a range
    /// narrower than the bin count repeats values.
    pub fn distinct(&self) -> Vec<usize> {
        let mut out = self.cutoffs.clone();
        out.dedup();
        out
    }

    pub fn start_line(&self) -> usize {
        self.start_line
    }

    pub fn end_line(&self) -> usize {
        self.end_line
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }
}

fn bin_cutoffs(start: usize, end: usize, bins: u64) -> Vec<usize> {
    let span = (end - start) as u128;
    (0..=bins)
        .map(|i| start + (span * i as u128 / bins as u128) as usize)
        .collect()
}

fn stride_cutoffs(start: usize, end: usize, step: usize) -> Vec<usize> {
    let mut cutoffs: Vec<usize> = (start..=end).step_by(step).collect();
    if cutoffs.last() != Some(&end) {
        cutoffs.push(end);
    }
    cutoffs
}
