/// Cooperative polling scheduler for the build's tasks
mod build_runner;
pub use build_runner::BuildRunner;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Task \"{0}\" failed with exit code {1}")]
    TaskFailed(String, i32),
    #[error("No task can make progress; a dependency was never satisfied")]
    Stalled,
}
