use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnveilError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageIndexOutOfRange { page: usize, page_count: usize },

    #[error("Page {page} has no content streams")]
    NoContentStreams { page: usize },

    #[error("Invalid bins value {0}: bins must be positive")]
    InvalidBins(i64),

    #[error("Plan of {points} cutoffs exceeds the limit of {limit}")]
    PlanTooLarge { points: u64, limit: u64 },

    #[error("Invalid step: stride must be at least 1")]
    InvalidStep,

    #[error("Invalid line range: start {start} is beyond end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("Declined to generate {planned} snapshots")]
    Declined { planned: usize },

    #[error("Invalid operator pattern: {0}")]
    InvalidPattern(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, UnveilError>;
