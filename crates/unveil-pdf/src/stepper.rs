//! Incremental truncated snapshots of a page, for bisecting where hidden
//! content gets covered.

use std::path::{Path, PathBuf};

use lopdf::Document;

use unveil_core::error::{Result, UnveilError};
use unveil_core::lines::LineSequence;
use unveil_core::options::UnveilOptions;
use unveil_core::plan::{StepMode, StepPlan};
use unveil_core::port::{self, Confirmation, ProgressReporter};

use crate::accessor::{self, input_stem};

/// Closing token appended to every truncated stream.
const RESTORE_TOKEN: &[u8] = b"\nQ";

/// Parameters of one stepping run.
#[derive(Debug, Clone)]
pub struct StepRequest {
    /// 0-based page index.
    pub page: usize,
    pub start_line: usize,
    /// Largest cutoff; clamped to the line count. `None` is the line count.
    pub end_line: Option<usize>,
    pub mode: StepMode,
    pub output_dir: Option<PathBuf>,
}

impl Default for StepRequest {
    fn default() -> Self {
        Self {
            page: 0,
            start_line: 0,
            end_line: None,
            mode: StepMode::Stride(1000),
            output_dir: None,
        }
    }
}

/// A snapshot that could not be written. The others are unaffected.
#[derive(Debug)]
pub struct SnapshotFailure {
    pub cutoff: usize,
    pub error: UnveilError,
}

#[derive(Debug)]
pub struct StepReport {
    pub output_dir: PathBuf,
    pub plan: StepPlan,
    pub total_lines: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<SnapshotFailure>,
}

impl StepReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `{parent}/{stem}_steps`
pub fn default_output_dir(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}_steps", input_stem(input)))
}

pub fn snapshot_file_name(page: usize, cutoff: usize) -> String {
    format!("page_{}_step_{:06}.pdf", page, cutoff)
}

/// The first `cutoff` lines followed by `repeats` restore-state operators.
///
/// The padding closes any `q` left open by the cut. It is a fixed margin,
/// not a balance check.
pub fn truncated_stream(lines: &LineSequence, cutoff: usize, repeats: usize) -> Vec<u8> {
    let mut data = lines.join_prefix(cutoff);
    data.reserve(RESTORE_TOKEN.len() * repeats);
    for _ in 0..repeats {
        data.extend_from_slice(RESTORE_TOKEN);
    }
    data
}

pub struct Stepper<'a> {
    options: &'a UnveilOptions,
    confirmation: &'a dyn Confirmation,
    progress: Option<ProgressReporter>,
}

impl<'a> Stepper<'a> {
    pub fn new(options: &'a UnveilOptions, confirmation: &'a dyn Confirmation) -> Self {
        Self {
            options,
            confirmation,
            progress: None,
        }
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Write one snapshot per distinct cutoff of the plan.
    ///
    /// Everything is validated, and the confirmation gate consulted, before
    /// the output directory is created.
    pub fn run(&self, input: &Path, request: &StepRequest) -> Result<StepReport> {
        let (pristine, content) = accessor::load_page(input, request.page)?;
        let lines = content.lines();
        let total_lines = lines.len();

        let plan = StepPlan::for_lines(request.start_line, request.end_line, total_lines, request.mode)?;
        let cutoffs = plan.distinct();

        if !port::gate(self.confirmation, cutoffs.len(), self.options.confirm_threshold) {
            log::info!("Aborted: {} snapshots not confirmed", cutoffs.len());
            return Err(UnveilError::Declined {
                planned: cutoffs.len(),
            });
        }

        let output_dir = request
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(input));
        std::fs::create_dir_all(&output_dir)?;

        log::info!(
            "Stepping page {} lines {}-{} ({}) into {} snapshot(s)",
            request.page,
            plan.start_line(),
            plan.end_line(),
            describe_mode(plan.mode()),
            cutoffs.len()
        );

        let total = cutoffs.len();
        let mut written = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (idx, &cutoff) in cutoffs.iter().enumerate() {
            let path = output_dir.join(snapshot_file_name(request.page, cutoff));
            let data = truncated_stream(&lines, cutoff, self.options.padding_repeats);

            match self.write_snapshot(&pristine, &content.refs, data, &path) {
                Ok(()) => written.push(path),
                Err(error) => {
                    log::error!("Snapshot at cutoff {} failed: {}", cutoff, error);
                    failures.push(SnapshotFailure { cutoff, error });
                }
            }

            let done = idx + 1;
            if self.options.progress_every > 0 && done % self.options.progress_every == 0 {
                log::info!("Progress: {}/{} files generated...", done, total);
                if let Some(ref reporter) = self.progress {
                    reporter(done, total);
                }
            }
        }

        if failures.is_empty() {
            log::info!("{} snapshot(s) written to {}", written.len(), output_dir.display());
        } else {
            log::warn!(
                "{} of {} snapshot(s) failed; {} written to {}",
                failures.len(),
                total,
                written.len(),
                output_dir.display()
            );
        }

        Ok(StepReport {
            output_dir,
            plan,
            total_lines,
            written,
            failures,
        })
    }

    /// Each snapshot starts from a fresh copy of the pristine document.
    fn write_snapshot(
        &self,
        pristine: &Document,
        refs: &[lopdf::ObjectId],
        data: Vec<u8>,
        path: &Path,
    ) -> Result<()> {
        let mut snapshot = pristine.clone();
        accessor::rewrite_page_streams(&mut snapshot, refs, data)?;
        accessor::save_document(&mut snapshot, path, self.options.compress_output)
    }
}

fn describe_mode(mode: StepMode) -> String {
    match mode {
        StepMode::Stride(step) => format!("step: {}", step),
        StepMode::Bins(bins) => format!("bins: {}", bins),
    }
}
