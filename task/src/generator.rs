use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result};

use doxyfile::ConfigMap;

use crate::{scan, Completion, Error, OutputEntry, SigWriter, Signature, State, Status};

/// Everything the caller decides about a generator run, fixed at
/// construction time.
#[derive(Debug)]
pub struct GeneratorSpec {
    /// The config document driving the run.
    pub doxyfile: PathBuf,
    /// Root of the build tree; the generator runs with this as its cwd.
    pub build_root: PathBuf,
    /// Generator executable.
    pub program: String,
    /// Extra arguments, placed before the trailing `-`.
    pub flags: Vec<String>,
    /// Config keys that take precedence over the parsed document.
    pub overrides: Vec<(String, String)>,
    /// Extra environment entries for the generator process.
    pub env: Vec<(String, String)>,
}

/// One scheduled run of the documentation generator.
///
/// The task configures itself lazily: its true input set can only be
/// determined once every upstream producer has finished, so the config
/// document is read, merged and scanned on the first poll where all
/// upstreams report complete, and never again.
pub struct GeneratorTask {
    name: String,
    spec: GeneratorSpec,
    run_after: Vec<Arc<Completion>>,
    state: State,
    /// Populated by configuration, read-only afterwards.
    pars: Option<ConfigMap>,
    output_dir: Option<PathBuf>,
    input_roots: Vec<PathBuf>,
    inputs: Vec<PathBuf>,
    signature: Option<Signature>,
    /// Signature the last successful run was executed with.
    ran_with: Option<Signature>,
    done: Arc<Completion>,
}

impl GeneratorTask {
    pub fn new(name: &str, spec: GeneratorSpec, run_after: Vec<Arc<Completion>>) -> Self {
        Self {
            name: name.to_owned(),
            spec,
            run_after,
            state: State::Waiting,
            pars: None,
            output_dir: None,
            input_roots: Vec::new(),
            inputs: Vec::new(),
            signature: None,
            ran_with: None,
            done: Arc::new(Completion::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn completion(&self) -> &Arc<Completion> {
        &self.done
    }

    /// Task identity, available once the task has been configured.
    pub fn signature(&self) -> Option<Signature> {
        self.signature
    }

    /// Concrete input files discovered by the scan, for staleness checks
    /// by the surrounding build.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// The single status transition function. A poll while any upstream
    /// is incomplete does no work at all; the first poll after all
    /// upstreams finish runs the one-shot configuration.
    pub fn poll(&mut self) -> Result<Status> {
        if self.run_after.iter().any(|up| !up.is_complete()) {
            self.state = State::Waiting;
            return Ok(Status::AskLater);
        }

        if self.state == State::Waiting {
            self.state = State::NotConfigured;
        }
        if self.state == State::NotConfigured {
            self.configure()
                .with_context(|| format!("while configuring task \"{}\"", self.name))?;
            self.state = State::Ready;
        }

        // re-polls after a completed run are answered without redoing work:
        if self.done.is_complete() && self.ran_with == self.signature {
            return Ok(Status::Skip);
        }
        Ok(Status::Run)
    }

    /// One-shot configuration: parse the config document, layer the
    /// caller's overrides on top, resolve the output directory and input
    /// roots, scan the concrete input files and compute the signature.
    fn configure(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.spec.doxyfile)
            .with_context(|| format!("reading config document {:?}", self.spec.doxyfile))?;
        let mut pars = doxyfile::parse(&text);

        // caller-supplied keys take precedence over the document:
        for (k, v) in &self.spec.overrides {
            pars.set(k, v);
        }

        let source_dir = self.source_dir().canonicalize().with_context(|| {
            format!("resolving directory of config document {:?}", self.spec.doxyfile)
        })?;

        let output_dir = match pars.get("OUTPUT_DIRECTORY") {
            Some(dir) if !dir.is_empty() => {
                let dir = Path::new(dir);
                if dir.is_absolute() {
                    dir.to_path_buf()
                } else {
                    self.spec.build_root.join(dir)
                }
            }
            // no usable key: the build-tree counterpart of the document's dir
            _ => self.spec.build_root.clone(),
        };

        let mut roots = Vec::new();
        match pars.get("INPUT") {
            Some(input) if !input.trim().is_empty() => {
                for entry in input.split_whitespace() {
                    let path = if Path::new(entry).is_absolute() {
                        PathBuf::from(entry)
                    } else {
                        source_dir.join(entry)
                    };
                    let path = path
                        .canonicalize()
                        .map_err(|_| Error::InputNotFound(path))?;
                    roots.push(path);
                }
            }
            _ => roots.push(source_dir),
        }

        self.inputs = scan::scan(&pars, &roots)?;
        log::debug!(
            "task \"{}\": {} input files under {} roots",
            self.name,
            self.inputs.len(),
            roots.len()
        );

        self.signature = Some(self.compute_signature(&self.inputs)?);
        self.pars = Some(pars);
        self.output_dir = Some(output_dir);
        self.input_roots = roots;
        Ok(())
    }

    fn source_dir(&self) -> PathBuf {
        match self.spec.doxyfile.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn compute_signature(&self, inputs: &[PathBuf]) -> Result<Signature> {
        let mut w = SigWriter::new();
        w.write_str(&self.spec.program);
        for flag in &self.spec.flags {
            w.write_str(flag);
        }
        w.write_sig(&Signature::of_file(&self.spec.doxyfile)?);
        for input in inputs {
            w.write_sig(&Signature::of_file(input)?);
        }
        Ok(w.finish())
    }

    /// Serialize the final config and feed it to the generator on its
    /// standard input, with the build root as its working directory.
    /// Returns the process exit code verbatim; on success, harvests the
    /// output directory.
    pub fn execute(&mut self) -> Result<i32> {
        let payload = self.stdin_payload()?;

        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&self.spec.flags)
            .arg("-")
            .current_dir(&self.spec.build_root)
            .stdin(Stdio::piped());
        for (k, v) in &self.spec.env {
            cmd.env(k, v);
        }

        log::info!("task \"{}\": running {}", self.name, self.spec.program);
        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning generator \"{}\"", self.spec.program))?;
        let mut stdin = child.stdin.take().expect("generator stdin is piped");
        if let Err(e) = stdin.write_all(payload.as_bytes()) {
            // a generator that exits without draining its stdin is
            // reported through its exit code, not as a pipe error.
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e).context("writing config to generator stdin");
            }
        }
        drop(stdin);
        let code = child
            .wait()
            .context("waiting for generator")?
            .code()
            .unwrap_or(-1); // terminated by signal

        if code == 0 {
            self.harvest()?;
        }
        Ok(code)
    }

    fn stdin_payload(&self) -> Result<String> {
        let pars = self
            .pars
            .as_ref()
            .ok_or_else(|| Error::NotReady(self.name.clone()))?;
        let mut merged = pars.clone();

        // the generator receives the resolved input roots, quoted:
        let mut joined = String::new();
        for root in &self.input_roots {
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push('"');
            joined.push_str(root.to_str().ok_or(util::PathEncodingError)?);
            joined.push('"');
        }
        merged.set("INPUT", &joined);

        let mut buf = String::with_capacity(1024);
        merged.serialize_into(&mut buf);
        Ok(buf)
    }

    /// Walk the output directory, stamp every discovered file with a
    /// signature and register the set as this task's outputs. Runs once
    /// per successful execution; a missing directory means zero outputs.
    fn harvest(&mut self) -> Result<()> {
        let output_dir = self
            .output_dir
            .clone()
            .ok_or_else(|| Error::NotReady(self.name.clone()))?;

        let mut outputs = Vec::new();
        collect_files(&output_dir, &mut outputs)
            .with_context(|| format!("harvesting outputs under {output_dir:?}"))?;
        log::info!("task \"{}\": harvested {} outputs", self.name, outputs.len());

        self.ran_with = self.signature;
        self.done.complete(outputs);
        Ok(())
    }
}

fn collect_files(dir: &Path, outputs: &mut Vec<OutputEntry>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let path = entry.path();
        if ty.is_dir() {
            collect_files(&path, outputs)?;
        } else if ty.is_file() {
            let sig = Signature::of_file(&path)?;
            outputs.push(OutputEntry { path, sig });
        }
    }
    Ok(())
}

impl crate::BuildTask for GeneratorTask {
    fn name(&self) -> &str {
        self.name()
    }

    fn poll(&mut self) -> Result<Status> {
        GeneratorTask::poll(self)
    }

    fn execute(&mut self) -> Result<i32> {
        GeneratorTask::execute(self)
    }

    fn completion(&self) -> &Arc<Completion> {
        self.completion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const STUB_SCRIPT: &str = "mkdir -p html && cat > html/index.html && echo ok > html/extra.txt";

    fn project(doxyfile: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("a.md"), "# a").unwrap();
        let path = dir.path().join("Doxyfile");
        std::fs::write(&path, doxyfile).unwrap();
        (dir, path)
    }

    fn sh_spec(doxyfile: PathBuf, build_root: PathBuf, script: &str) -> GeneratorSpec {
        GeneratorSpec {
            doxyfile,
            build_root,
            program: String::from("sh"),
            // the trailing "-" added by the executor lands in $0:
            flags: vec![String::from("-c"), String::from(script)],
            overrides: Vec::new(),
            env: Vec::new(),
        }
    }

    #[test]
    fn waiting_task_touches_nothing() {
        let gate = Arc::new(Completion::new());
        // the config document does not exist; a poll that tried to read
        // it would fail loudly.
        let spec = sh_spec(PathBuf::from("/nonexistent/Doxyfile"), PathBuf::from("."), "");
        let mut task = GeneratorTask::new("docs", spec, vec![gate.clone()]);

        assert_eq!(task.poll().unwrap(), Status::AskLater);
        assert_eq!(task.poll().unwrap(), Status::AskLater);
        assert!(task.signature().is_none());
    }

    #[test]
    fn configuration_happens_exactly_once() {
        let (dir, doxyfile) = project("INPUT = src\nFILE_PATTERNS = *.md\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile.clone(), out, "true");
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        let sig = task.signature().unwrap();

        // if a later poll re-read the document, it would now fail:
        std::fs::remove_file(&doxyfile).unwrap();
        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.signature().unwrap(), sig);
    }

    #[test]
    fn gated_task_becomes_runnable_when_upstream_completes() {
        let gate = Arc::new(Completion::new());
        let (dir, doxyfile) = project("INPUT = src\nFILE_PATTERNS = *.md\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile, out, "true");
        let mut task = GeneratorTask::new("docs", spec, vec![gate.clone()]);

        assert_eq!(task.poll().unwrap(), Status::AskLater);
        gate.complete(Vec::new());
        assert_eq!(task.poll().unwrap(), Status::Run);
    }

    #[test]
    fn execute_pipes_config_and_harvests_outputs() {
        let (dir, doxyfile) =
            project("PROJECT_NAME = stub\nINPUT = src\nFILE_PATTERNS = *.md\nRECURSIVE = YES\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile, out.clone(), STUB_SCRIPT);
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 0);

        // the stub copied our stdin payload into its output tree:
        let payload = std::fs::read_to_string(out.join("html/index.html")).unwrap();
        assert!(payload.contains("PROJECT_NAME = stub"));
        assert!(payload.contains("INPUT = \""), "inputs are resolved and quoted");

        let outputs = task.completion().outputs();
        assert_eq!(outputs.len(), 2);
        let sigs: Vec<_> = outputs.iter().map(|o| o.sig).collect();
        assert_ne!(sigs[0], sigs[1], "different contents, different stamps");

        // a completed task with an unchanged signature does not run again:
        assert_eq!(task.poll().unwrap(), Status::Skip);
    }

    #[test]
    fn missing_output_directory_yields_zero_outputs() {
        let (dir, doxyfile) =
            project("INPUT = src\nFILE_PATTERNS = *.md\nOUTPUT_DIRECTORY = never-created\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile, out, "true");
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 0);
        assert!(task.completion().is_complete());
        assert!(task.completion().outputs().is_empty());
    }

    #[test]
    fn nonzero_exit_code_is_returned_verbatim() {
        let (dir, doxyfile) = project("INPUT = src\nFILE_PATTERNS = *.md\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile, out, "exit 3");
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 3);
        assert!(!task.completion().is_complete(), "failed run registers nothing");
    }

    #[test]
    fn env_overrides_reach_the_process() {
        let (dir, doxyfile) = project("INPUT = src\nFILE_PATTERNS = *.md\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let mut spec = sh_spec(doxyfile, out.clone(), "echo \"$DOCS_MARKER\" > marker.txt");
        spec.env.push((String::from("DOCS_MARKER"), String::from("present")));
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 0);
        let marker = std::fs::read_to_string(out.join("marker.txt")).unwrap();
        assert_eq!(marker.trim(), "present");
    }

    #[test]
    fn missing_input_path_is_a_configuration_error() {
        let (dir, doxyfile) = project("INPUT = no-such-dir\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let spec = sh_spec(doxyfile, out, "true");
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        let err = task.poll().unwrap_err();
        assert!(format!("{err:#}").contains("no-such-dir"));
    }

    #[test]
    fn overrides_take_precedence_over_the_document() {
        let (dir, doxyfile) = project("INPUT = src\nFILE_PATTERNS = *.md\nQUIET = NO\n");
        let out = dir.path().join("out");
        std::fs::create_dir_all(&out).unwrap();
        let mut spec = sh_spec(doxyfile, out.clone(), "cat > captured.cfg");
        spec.overrides.push((String::from("QUIET"), String::from("YES")));
        let mut task = GeneratorTask::new("docs", spec, Vec::new());

        assert_eq!(task.poll().unwrap(), Status::Run);
        assert_eq!(task.execute().unwrap(), 0);
        let captured = std::fs::read_to_string(out.join("captured.cfg")).unwrap();
        assert!(captured.contains("QUIET = YES"));
        assert!(!captured.contains("QUIET = NO"));
    }
}
