use anyhow::Result;

use task::{ArchiveTask, BuildTask, GeneratorSpec, GeneratorTask};
use util::PathEncodingError;

use crate::exec::BuildRunner;
use crate::fs::Fs;
use crate::settings::Settings;
use crate::tools::Tools;
use crate::ui::Ui;

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let fs = Fs::new(&settings.output, settings.dry_run);
        let ui = Ui::new(&settings);
        Self { settings, fs, ui }
    }

    /// Run the app: check tools, build the task list, drive it to completion.
    pub fn run(mut self) -> Result<()> {
        if self.settings.verbose > 0 {
            eprintln!("Using output directory {:?}", self.settings.output);
        }
        self.fs.ensure_output_dir_exists(self.settings.verbose > 0)?;

        self.ui.verbose_progress("Checking for external tools");
        let tools = Tools::detect(&self.settings)?;
        self.ui.done();
        log::info!("using generator {:?}", tools.generator);

        let tasks = self.make_tasks(&tools)?;
        let mut runner = BuildRunner::new(self.ui, self.settings.dry_run);
        runner.run(tasks)
    }

    fn make_tasks(&self, tools: &Tools) -> Result<Vec<Box<dyn BuildTask>>> {
        let build_root = self.fs.root().to_path_buf();

        let spec = GeneratorSpec {
            doxyfile: self.settings.doxyfile.clone(),
            build_root: build_root.clone(),
            program: tools.generator.to_str().ok_or(PathEncodingError)?.to_owned(),
            flags: self.settings.flags.clone(),
            overrides: self.settings.overrides.clone(),
            env: Vec::new(),
        };
        let generator = GeneratorTask::new(&self.settings.generator, spec, Vec::new());

        let mut tasks: Vec<Box<dyn BuildTask>> = Vec::with_capacity(2);

        if let (Some(name), Some(archiver)) = (&self.settings.tar, &tools.archiver) {
            let archive = ArchiveTask::new(
                name,
                archiver.to_str().ok_or(PathEncodingError)?,
                build_root.join(name),
                build_root,
                vec![generator.completion().clone()],
            );
            tasks.push(Box::new(generator));
            tasks.push(Box::new(archive));
        } else {
            tasks.push(Box::new(generator));
        }

        Ok(tasks)
    }
}
