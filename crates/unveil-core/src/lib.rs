//! Content-stream instrumentation engine.
//!
//! Everything here is pure: byte-line segmentation, step plans, lexical
//! operator matching and line suppression. Document access lives in
//! `unveil-pdf`.

pub mod error;
pub mod latin1;
pub mod lines;
pub mod matcher;
pub mod options;
pub mod plan;
pub mod port;
pub mod suppress;

pub use error::{Result, UnveilError};
pub use lines::LineSequence;
pub use plan::{StepMode, StepPlan};
