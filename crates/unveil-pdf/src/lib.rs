//! PDF side of the toolset: content-stream access, extraction, stepping and
//! operator removal, all through lopdf.

pub mod accessor;
pub mod analyze;
pub mod extract;
pub mod remover;
pub mod sample;
pub mod stepper;

pub use accessor::PageContentStream;
pub use analyze::{analyze, AnalyzeReport};
pub use extract::{extract, ExtractReport};
pub use remover::{RemoveRequest, Remover, SuppressReport, SuppressStatus};
pub use stepper::{SnapshotFailure, StepReport, StepRequest, Stepper};
