//! Injection points for the interactive parts of an operation.

/// Progress reporter callback: `(completed, total)`.
pub type ProgressReporter = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Asked before generating more snapshots than the configured threshold.
pub trait Confirmation {
    /// Return `true` to proceed with writing `planned` files.
    fn confirm(&self, planned: usize) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(usize) -> bool,
{
    fn confirm(&self, planned: usize) -> bool {
        self(planned)
    }
}

/// Answers every confirmation with a fixed decision.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl Confirmation for FixedAnswer {
    fn confirm(&self, _planned: usize) -> bool {
        self.0
    }
}

/// Run the gate: only consult `confirmation` when `planned` exceeds `threshold`.
pub fn gate(confirmation: &dyn Confirmation, planned: usize, threshold: usize) -> bool {
    planned <= threshold || confirmation.confirm(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_gate_skips_small_batches() {
        let asked = Cell::new(false);
        let c = |_: usize| {
            asked.set(true);
            false
        };
        assert!(gate(&c, 100, 100));
        assert!(!asked.get());
    }

    #[test]
    fn test_gate_asks_above_threshold() {
        let seen = Cell::new(0);
        let c = |n: usize| {
            seen.set(n);
            true
        };
        assert!(gate(&c, 101, 100));
        assert_eq!(seen.get(), 101);
        assert!(!gate(&FixedAnswer(false), 101, 100));
    }
}
