use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::Signature;

/// A discovered output file plus its computed content signature.
/// Created only after the producing process has exited; immutable afterward.
#[derive(Debug, Clone)]
pub struct OutputEntry {
    pub path: PathBuf,
    pub sig: Signature,
}

/// The face a task shows its dependents: a completion flag and the frozen
/// list of outputs, both written exactly once.
///
/// Dependents hold this behind `Arc` and only ever read it. The owning
/// task freezes the outputs first and flips the flag last, so a reader
/// that observes `is_complete()` always sees the full output list and
/// never a harvest in progress.
#[derive(Debug, Default)]
pub struct Completion {
    has_run: AtomicBool,
    outputs: OnceLock<Vec<OutputEntry>>,
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Structural readiness gate checked by downstream tasks.
    pub fn is_complete(&self) -> bool {
        self.has_run.load(Ordering::Acquire)
    }

    /// Outputs registered at completion; empty until then.
    pub fn outputs(&self) -> &[OutputEntry] {
        self.outputs.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Freeze `outputs` and mark the task complete. Completion is
    /// write-once; a second call is a bug in the owning task.
    pub(crate) fn complete(&self, outputs: Vec<OutputEntry>) {
        let already_set = self.outputs.set(outputs).is_err();
        debug_assert!(!already_set, "task completed twice");
        self.has_run.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_are_empty_until_complete() {
        let handle = Completion::new();
        assert!(!handle.is_complete());
        assert!(handle.outputs().is_empty());

        handle.complete(Vec::new());
        assert!(handle.is_complete());
    }
}
