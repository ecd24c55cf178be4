//! Options shared by the extract, step and remove operations.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matcher::{LineMatcher, RegexMatcher, SubstringMatcher, DRAW_OPERATOR};

/// Tunables for every operation. Missing keys in a config file take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnveilOptions {
    // -- Stepper --
    /// Stride used when no bin count is given.
    pub step: usize,
    /// Planned snapshot count above which confirmation is required.
    pub confirm_threshold: usize,
    pub progress_every: usize,
    /// Number of `\nQ` tokens appended to every truncated stream.
    pub padding_repeats: usize,

    // -- Remover --
    pub operator: String,
    /// When set, replaces `operator` as the line predicate.
    pub operator_regex: Option<String>,
    pub comment_marker: String,

    // -- Output --
    pub compress_output: bool,
}

impl Default for UnveilOptions {
    fn default() -> Self {
        Self {
            step: 1000,
            confirm_threshold: 100,
            progress_every: 20,
            padding_repeats: 10,
            operator: DRAW_OPERATOR.to_string(),
            operator_regex: None,
            comment_marker: "% ".to_string(),
            compress_output: false,
        }
    }
}

impl UnveilOptions {
    /// Build the line predicate the Remover uses.
    pub fn matcher(&self) -> Result<Box<dyn LineMatcher>> {
        match self.operator_regex {
            Some(ref pattern) => Ok(Box::new(RegexMatcher::new(pattern)?)),
            None => Ok(Box::new(SubstringMatcher::new(&self.operator)?)),
        }
    }
}
