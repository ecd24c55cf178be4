//! Extract → step → remove in one pass over the same input.

use std::path::Path;

use log::info;

use unveil_core::error::Result;
use unveil_core::options::UnveilOptions;
use unveil_core::port::Confirmation;

use crate::extract::{self, ExtractReport};
use crate::remover::{RemoveRequest, Remover, SuppressReport};
use crate::stepper::{StepReport, StepRequest, Stepper};

#[derive(Debug)]
pub struct AnalyzeReport {
    pub extract: ExtractReport,
    pub step: StepReport,
    pub remove: SuppressReport,
}

/// Run all three phases with default output locations. The remover uses the
/// stepper's page and line range. Stops at the first failing phase.
pub fn analyze(
    input: &Path,
    step: &StepRequest,
    options: &UnveilOptions,
    confirmation: &dyn Confirmation,
) -> Result<AnalyzeReport> {
    info!("[1/3] Extracting streams from {}", input.display());
    let extract = extract::extract(input, None, false)?;

    info!("[2/3] Generating incremental snapshots");
    let step_report = Stepper::new(options, confirmation).run(input, step)?;

    info!("[3/3] Removing operators");
    let remove_request = RemoveRequest {
        page: step.page,
        start_line: step.start_line,
        end_line: step.end_line,
        ..RemoveRequest::default()
    };
    let remove = Remover::new(options)?.run(input, &remove_request)?;

    Ok(AnalyzeReport {
        extract,
        step: step_report,
        remove,
    })
}
