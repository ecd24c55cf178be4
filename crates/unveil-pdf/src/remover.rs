//! Comment out drawing operators on a page and write the modified document.

use std::path::{Path, PathBuf};

use unveil_core::error::Result;
use unveil_core::matcher::LineMatcher;
use unveil_core::options::UnveilOptions;
use unveil_core::suppress::{suppress, SuppressionSelection};

use crate::accessor::{self, input_stem};

#[derive(Debug, Clone, Default)]
pub struct RemoveRequest {
    /// 0-based page index.
    pub page: usize,
    pub start_line: usize,
    /// Inclusive end of the match range; `None` is the line count.
    pub end_line: Option<usize>,
    /// Lines suppressed whether or not they match.
    pub target_lines: Vec<usize>,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressStatus {
    Modified,
    /// Nothing was suppressed. The output is still written.
    NoMatch,
}

#[derive(Debug, Clone)]
pub struct SuppressReport {
    pub output_path: PathBuf,
    pub total_lines: usize,
    pub start_line: usize,
    pub end_line: usize,
    /// Indices of suppressed lines, ascending.
    pub suppressed: Vec<usize>,
    pub status: SuppressStatus,
}

impl SuppressReport {
    pub fn count(&self) -> usize {
        self.suppressed.len()
    }
}

/// `{parent}/{stem}_rem.pdf`
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}_rem.pdf", input_stem(input)))
}

pub struct Remover<'a> {
    options: &'a UnveilOptions,
    matcher: Box<dyn LineMatcher>,
}

impl<'a> Remover<'a> {
    /// Use the matcher described by `options`.
    pub fn new(options: &'a UnveilOptions) -> Result<Self> {
        Ok(Self {
            matcher: options.matcher()?,
            options,
        })
    }

    pub fn with_matcher(options: &'a UnveilOptions, matcher: Box<dyn LineMatcher>) -> Self {
        Self { options, matcher }
    }

    pub fn run(&self, input: &Path, request: &RemoveRequest) -> Result<SuppressReport> {
        let (mut doc, content) = accessor::load_page(input, request.page)?;
        let lines = content.lines();

        let selection = SuppressionSelection::range(request.start_line, request.end_line)
            .with_targets(request.target_lines.iter().copied());
        let result = suppress(
            &lines,
            &selection,
            self.matcher.as_ref(),
            self.options.comment_marker.as_bytes(),
        );

        let output_path = request
            .output_path
            .clone()
            .unwrap_or_else(|| default_output_path(input));
        accessor::rewrite_page_streams(&mut doc, &content.refs, result.lines.join())?;
        accessor::save_document(&mut doc, &output_path, self.options.compress_output)?;

        let status = if result.count() == 0 {
            log::warn!(
                "No {} operators found in lines {}-{}; {} written unchanged",
                self.matcher.describe(),
                request.start_line,
                result.end_line,
                output_path.display()
            );
            SuppressStatus::NoMatch
        } else {
            log::info!(
                "{} (Range: {}-{}, Modified: {} lines)",
                output_path.display(),
                request.start_line,
                result.end_line,
                result.count()
            );
            SuppressStatus::Modified
        };

        Ok(SuppressReport {
            output_path,
            total_lines: lines.len(),
            start_line: request.start_line,
            end_line: result.end_line,
            suppressed: result.suppressed.iter().map(|(index, _)| *index).collect(),
            status,
        })
    }
}
