use std::path::PathBuf;

use anyhow::Result;

use crate::settings::Settings;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Generator program \"{0}\" not found (set DOXYGEN to override)")]
    GeneratorNotFound(String),
    #[error("Archiver program \"{0}\" not found (set TAR to override)")]
    ArchiverNotFound(String),
}

/// Resolved paths of the external tools a build needs, checked up front
/// so that scheduling never starts with a missing program.
#[derive(Debug)]
pub struct Tools {
    pub generator: PathBuf,
    /// Only resolved when an archive was requested.
    pub archiver: Option<PathBuf>,
}

impl Tools {
    pub fn detect(settings: &Settings) -> Result<Self> {
        let generator = which::which(&settings.generator)
            .map_err(|_| Error::GeneratorNotFound(settings.generator.clone()))?;

        let archiver = match settings.tar {
            Some(_) => Some(
                which::which(&settings.tar_cmd)
                    .map_err(|_| Error::ArchiverNotFound(settings.tar_cmd.clone()))?,
            ),
            None => None,
        };

        Ok(Self { generator, archiver })
    }
}
