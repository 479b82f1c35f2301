use anyhow::{Context, Result};
use colored::Colorize;

use task::{BuildTask, Status};

use crate::ui::Ui;

use super::Error;

/// `BuildRunner` drives the build's tasks to completion.
///
/// It repeatedly probes every open task with a non-blocking status poll.
/// A task that answers `AskLater` costs nothing and is revisited on the
/// next pass; a task that answers `Run` is executed synchronously before
/// the pass continues. The loop ends when every task has run or skipped,
/// or errors out when a full pass over the open tasks makes no progress.
pub struct BuildRunner {
    ui: Ui,
    dry_run: bool,
}

impl BuildRunner {
    /// Create a new `BuildRunner`.
    pub fn new(ui: Ui, dry_run: bool) -> Self {
        Self { ui, dry_run }
    }

    pub fn run(&mut self, mut tasks: Vec<Box<dyn BuildTask>>) -> Result<()> {
        debug_assert!(!tasks.is_empty());

        if self.dry_run {
            return self.report_only(&mut tasks);
        }

        let mut finished = vec![false; tasks.len()];
        let mut open = tasks.len();
        while open > 0 {
            let mut progressed = false;
            for (i, task) in tasks.iter_mut().enumerate() {
                if finished[i] {
                    continue;
                }
                let status = task
                    .poll()
                    .with_context(|| format!("while resolving status of task \"{}\"", task.name()))?;
                match status {
                    Status::AskLater => {}
                    Status::Skip => {
                        eprintln!("{} {}", "SKIP".yellow(), task.name());
                        finished[i] = true;
                        open -= 1;
                        progressed = true;
                    }
                    Status::Run => {
                        self.run_task(task.as_mut())?;
                        finished[i] = true;
                        open -= 1;
                        progressed = true;
                    }
                }
            }
            if !progressed {
                return Err(Error::Stalled.into());
            }
        }
        eprintln!("{}\n", "Completed build.".green());

        Ok(())
    }

    fn run_task(&mut self, task: &mut dyn BuildTask) -> Result<()> {
        eprintln!("{} {}", "RUN".green(), task.name());
        self.ui.start_timer();

        let code = task
            .execute()
            .with_context(|| format!("while executing task \"{}\"", task.name()))?;
        if code != 0 {
            return Err(Error::TaskFailed(task.name().to_owned(), code).into());
        }

        self.ui.print_elapsed("Task execution");
        eprintln!("{} {}\n", "COMPLETED".green(), task.name());
        Ok(())
    }

    /// Dry run: resolve and report each task's status once, run nothing.
    fn report_only(&mut self, tasks: &mut [Box<dyn BuildTask>]) -> Result<()> {
        for task in tasks.iter_mut() {
            let status = task
                .poll()
                .with_context(|| format!("while resolving status of task \"{}\"", task.name()))?;
            let verdict = match status {
                Status::Run => "would run",
                Status::Skip => "would skip",
                Status::AskLater => "waiting on upstream tasks",
            };
            eprintln!("{} {}: {}", "DRY".cyan(), task.name(), verdict);
        }
        Ok(())
    }
}
