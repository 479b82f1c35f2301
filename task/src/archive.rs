use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::{Completion, OutputEntry, Signature, State, Status};

/// Compressor options for the external archiver, selected from the
/// target's file name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TarOptions(&'static str);

impl TarOptions {
    /// `bz2` and `gz` suffixes get matching compressors; anything else
    /// is packed without compression.
    pub fn for_target(target: &Path) -> Self {
        match target.to_str() {
            Some(name) if name.ends_with("bz2") => Self("cjf"),
            Some(name) if name.ends_with("gz") => Self("czf"),
            _ => Self("cf"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Bundles the outputs of one or more producer tasks into a single
/// archive.
///
/// The producers' output sets only exist after they have run, so the
/// archive pulls them into its own input list on the first poll where
/// every producer reports complete, and exactly once. An archive whose
/// producers yielded nothing skips without invoking the archiver.
pub struct ArchiveTask {
    name: String,
    program: String,
    target: PathBuf,
    build_root: PathBuf,
    opts: TarOptions,
    input_tasks: Vec<Arc<Completion>>,
    inputs: Vec<PathBuf>,
    /// one-shot guard around pulling producer outputs.
    pulled: bool,
    state: State,
    done: Arc<Completion>,
}

impl ArchiveTask {
    pub fn new(
        name: &str,
        program: &str,
        target: PathBuf,
        build_root: PathBuf,
        input_tasks: Vec<Arc<Completion>>,
    ) -> Self {
        let opts = TarOptions::for_target(&target);
        Self {
            name: name.to_owned(),
            program: program.to_owned(),
            target,
            build_root,
            opts,
            input_tasks,
            inputs: Vec::new(),
            pulled: false,
            state: State::Waiting,
            done: Arc::new(Completion::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn completion(&self) -> &Arc<Completion> {
        &self.done
    }

    pub fn options(&self) -> TarOptions {
        self.opts
    }

    /// Files collected from the producers; populated by the first poll
    /// after all producers complete.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn poll(&mut self) -> Result<Status> {
        if self.input_tasks.iter().any(|t| !t.is_complete()) {
            self.state = State::Waiting;
            return Ok(Status::AskLater);
        }

        if !self.pulled {
            // execute this only once
            self.pulled = true;
            for task in &self.input_tasks {
                self.inputs
                    .extend(task.outputs().iter().map(|o| o.path.clone()));
            }
            self.state = if self.inputs.is_empty() {
                log::info!("task \"{}\": no inputs to archive", self.name);
                State::Skip
            } else {
                State::Ready
            };
        }

        if self.state == State::Skip || self.done.is_complete() {
            return Ok(Status::Skip);
        }
        Ok(Status::Run)
    }

    /// Invoke the archiver over the collected inputs. Returns the
    /// process exit code verbatim; on success, registers the single
    /// known artifact as this task's output.
    pub fn execute(&mut self) -> Result<i32> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(self.opts.as_str()).arg(&self.target);
        for input in &self.inputs {
            // files inside the build tree are archived by relative path
            cmd.arg(input.strip_prefix(&self.build_root).unwrap_or(input));
        }
        cmd.current_dir(&self.build_root);

        log::info!(
            "task \"{}\": archiving {} files into {:?}",
            self.name,
            self.inputs.len(),
            self.target
        );
        let code = cmd
            .status()
            .with_context(|| format!("spawning archiver \"{}\"", self.program))?
            .code()
            .unwrap_or(-1);

        if code == 0 {
            let sig = Signature::of_file(&self.target)
                .context("stamping the produced archive")?;
            self.done.complete(vec![OutputEntry {
                path: self.target.clone(),
                sig,
            }]);
        }
        Ok(code)
    }
}

impl crate::BuildTask for ArchiveTask {
    fn name(&self) -> &str {
        self.name()
    }

    fn poll(&mut self) -> Result<Status> {
        ArchiveTask::poll(self)
    }

    fn execute(&mut self) -> Result<i32> {
        ArchiveTask::execute(self)
    }

    fn completion(&self) -> &Arc<Completion> {
        self.completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn producer(outputs: &[(&Path, &str)]) -> Arc<Completion> {
        let handle = Arc::new(Completion::new());
        let entries = outputs
            .iter()
            .map(|(path, contents)| {
                std::fs::write(path, contents).unwrap();
                OutputEntry {
                    path: path.to_path_buf(),
                    sig: Signature::of_file(path).unwrap(),
                }
            })
            .collect();
        handle.complete(entries);
        handle
    }

    #[test]
    fn options_follow_target_suffix() {
        assert_eq!(TarOptions::for_target(Path::new("docs.tar.bz2")).as_str(), "cjf");
        assert_eq!(TarOptions::for_target(Path::new("docs.tar.gz")).as_str(), "czf");
        assert_eq!(TarOptions::for_target(Path::new("docs.tar")).as_str(), "cf");
    }

    #[test]
    fn waits_for_all_producers() {
        let dir = tempdir().unwrap();
        let ready = producer(&[(&dir.path().join("a.xml"), "a")]);
        let unfinished = Arc::new(Completion::new());

        let mut task = ArchiveTask::new(
            "tarball",
            "tar",
            dir.path().join("docs.tar"),
            dir.path().to_path_buf(),
            vec![ready, unfinished.clone()],
        );
        assert_eq!(task.poll().unwrap(), Status::AskLater);
        assert!(task.inputs().is_empty(), "nothing pulled while waiting");

        unfinished.complete(Vec::new());
        assert_eq!(task.poll().unwrap(), Status::Run);
    }

    #[test]
    fn pulls_producer_outputs_exactly_once() {
        let dir = tempdir().unwrap();
        let first = producer(&[
            (&dir.path().join("a.xml"), "a"),
            (&dir.path().join("b.xml"), "b"),
        ]);
        let second = producer(&[(&dir.path().join("c.xml"), "c")]);

        let mut task = ArchiveTask::new(
            "tarball",
            "tar",
            dir.path().join("docs.tar"),
            dir.path().to_path_buf(),
            vec![first, second],
        );

        assert_eq!(task.poll().unwrap(), Status::Run);
        let pulled: Vec<_> = task.inputs().to_vec();
        assert_eq!(pulled.len(), 3);

        // repeated polls must not re-pull or duplicate:
        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.inputs(), &pulled[..]);
    }

    #[test]
    fn empty_input_set_skips_without_running() {
        let first = Arc::new(Completion::new());
        first.complete(Vec::new());

        // an unrunnable archiver program proves the skip never spawns it
        let mut task = ArchiveTask::new(
            "tarball",
            "/nonexistent/archiver",
            PathBuf::from("docs.tar"),
            PathBuf::from("."),
            vec![first],
        );
        assert_eq!(task.poll().unwrap(), Status::Skip);
        assert_eq!(task.poll().unwrap(), Status::Skip);
        assert!(!task.completion().is_complete());
    }

    #[test]
    fn archives_collected_inputs() {
        let dir = tempdir().unwrap();
        let first = producer(&[
            (&dir.path().join("a.xml"), "alpha"),
            (&dir.path().join("b.xml"), "beta"),
        ]);

        let target = dir.path().join("docs.tar.gz");
        let mut task = ArchiveTask::new(
            "tarball",
            "tar",
            target.clone(),
            dir.path().to_path_buf(),
            vec![first],
        );

        assert_eq!(task.options().as_str(), "czf");
        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 0);
        assert!(target.is_file());
        let outputs = task.completion().outputs();
        assert_eq!(outputs.len(), 1, "exactly one artifact");
        assert_eq!(outputs[0].path, target);

        // completed archive is not re-run by later polls:
        assert_eq!(task.poll().unwrap(), Status::Skip);
    }
}
