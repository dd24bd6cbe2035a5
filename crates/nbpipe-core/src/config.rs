//! Process configuration read from the environment.
//!
//! The environment is read once, in [`EnvConfig::from_env`], and the
//! resulting value is passed to whatever needs it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Notebook the editor should reopen when resuming a pipeline step.
pub const NOTEBOOK_PATH_ENV: &str = "NBPIPE_NOTEBOOK_PATH";

/// Name of the pipeline step the current process runs.
pub const PIPELINE_STEP_ENV: &str = "NBPIPE_PIPELINE_STEP";

/// Environment-derived configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    /// Value of `NBPIPE_NOTEBOOK_PATH`.
    pub notebook_path: Option<PathBuf>,

    /// Value of `NBPIPE_PIPELINE_STEP`.
    pub pipeline_step: Option<String>,

    /// The user's home directory.
    pub home: Option<PathBuf>,
}

impl EnvConfig {
    /// Read configuration from the process environment. Empty values count as unset.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            notebook_path: var(NOTEBOOK_PATH_ENV).map(PathBuf::from),
            pipeline_step: var(PIPELINE_STEP_ENV),
            home: var("HOME").map(PathBuf::from).or_else(dirs::home_dir),
        }
    }

    /// The notebook to reopen, relative to the home directory when inside it.
    ///
    /// Editors are started from the home directory and open files by
    /// relative path, so the home prefix is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configured path is not a file.
    pub fn resume_notebook_path(&self) -> Result<Option<PathBuf>> {
        let Some(path) = &self.notebook_path else {
            return Ok(None);
        };
        if !path.is_file() {
            return Err(Error::Config(format!(
                "env path {}={} is not a file",
                NOTEBOOK_PATH_ENV,
                path.display()
            )));
        }

        let relative = self
            .home
            .as_deref()
            .and_then(|home| path.strip_prefix(home).ok())
            .filter(|rest| !rest.as_os_str().is_empty());
        Ok(Some(relative.map(Path::to_path_buf).unwrap_or_else(|| path.clone())))
    }
}
