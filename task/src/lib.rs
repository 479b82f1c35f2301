use std::path::PathBuf;
use std::sync::Arc;

/// Content signatures for change detection and output stamping.
mod sig;
pub use sig::{SigError, SigWriter, Signature};

/// Write-once completion handles shared between tasks.
mod handle;
pub use handle::{Completion, OutputEntry};

/// States and poll answers for the status machinery.
mod status;
pub use status::{State, Status};

/// Expansion of input roots into concrete input files.
mod scan;

/// The documentation generator task.
mod generator;
pub use generator::{GeneratorSpec, GeneratorTask};

/// Archival of generated outputs.
mod archive;
pub use archive::{ArchiveTask, TarOptions};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Could not find the generator input {0:?}")]
    InputNotFound(PathBuf),
    #[error("Invalid glob pattern \"{0}\"")]
    BadPattern(String, #[source] glob::PatternError),
    #[error("Task \"{0}\" was executed before it was ready")]
    NotReady(String),
}

/// The face the build orchestrator sees: a non-blocking status probe,
/// synchronous execution, and a completion handle for dependents.
pub trait BuildTask {
    fn name(&self) -> &str;

    /// Resolve the task's current status. Safe to call any number of
    /// times; a task that answers `AskLater` has done no work.
    fn poll(&mut self) -> anyhow::Result<Status>;

    /// Run the external process and register outputs on success.
    /// Returns the process exit code verbatim.
    fn execute(&mut self) -> anyhow::Result<i32>;

    /// Handle through which dependents observe this task's completion.
    fn completion(&self) -> &Arc<Completion>;
}
