use std::path::PathBuf;

use anyhow::Result;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Config document not found: {0:?}")]
    DoxyfileNotFound(PathBuf),
    #[error("Invalid define '{0}' (should be formatted 'KEY=VALUE')")]
    InvalidDefine(String),
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    pub doxyfile: PathBuf,
    pub output: PathBuf,
    pub tar: Option<String>,
    pub overrides: Vec<(String, String)>,
    pub generator: String,
    pub flags: Vec<String>,
    pub tar_cmd: String,
    pub verbose: u8,
    pub dry_run: bool,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let doxyfile = PathBuf::from(&args.doxyfile);
        if !doxyfile.exists() {
            return Err(Error::DoxyfileNotFound(doxyfile).into());
        }
        let doxyfile = doxyfile.canonicalize()?;

        let mut overrides = Vec::with_capacity(args.defines.len());
        for define in &args.defines {
            let (key, value) = define
                .split_once('=')
                .ok_or_else(|| Error::InvalidDefine(define.clone()))?;
            overrides.push((key.trim().to_owned(), value.trim().to_owned()));
        }

        Ok(Self {
            doxyfile,
            output: PathBuf::from(&args.output),
            tar: args.tar,
            overrides,
            generator: args.generator,
            flags: args.flags,
            tar_cmd: args.tar_cmd,
            verbose: args.verbose,
            dry_run: args.dry_run,
        })
    }
}
