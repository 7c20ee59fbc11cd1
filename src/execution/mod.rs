//! Execution engine: one pass of instrument, write, run, collect, clean up.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::{Config, RInterfaceConfig},
    error::{Error, Result},
    grab::{self, Grabbed, GrabTag},
    process,
    value::Value,
};

const SCRIPT_FILE: &str = "script.R";
const GRAB_FILE: &str = "grab_output.txt";

/// Per-call switches.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Pipe and return the interpreter's stdout/stderr instead of inheriting them.
    pub capture: bool,
    /// Honour `# @grab{type}` tags.
    pub grab: bool,
    /// Also write the final script, instrumentation included, to this path.
    pub save: Option<PathBuf>,
}

impl RunOptions {
    pub fn capture() -> Self {
        Self { capture: true, ..Self::default() }
    }

    pub fn grab() -> Self {
        Self { grab: true, ..Self::default() }
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture = capture;
        self
    }

    pub fn with_grab(mut self, grab: bool) -> Self {
        self.grab = grab;
        self
    }

    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutput {
    pub code: Option<i32>,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    /// Grabbed values in tag order.
    pub values: Vec<Grabbed>,
}

impl RunOutput {
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|g| g.name == name).map(|g| &g.value)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values.into_iter().map(|g| g.value).collect()
    }
}

/// Runs R code through an external `Rscript`.
#[derive(Debug, Clone, Default)]
pub struct RInterface {
    config: RInterfaceConfig,
}

impl RInterface {
    pub fn new(config: RInterfaceConfig) -> Self {
        Self { config }
    }

    /// Settings from the rc file and environment.
    pub fn from_env() -> Self {
        Self::new(RInterfaceConfig::from_config(&Config::load()))
    }

    pub fn config(&self) -> &RInterfaceConfig {
        &self.config
    }

    /// Verify the interpreter can be started; returns its version banner.
    pub async fn check(&self) -> Result<String> {
        process::version(&self.config.rscript).await
    }

    pub async fn run_file(&self, path: &Path, options: &RunOptions) -> Result<RunOutput> {
        let code = fs::read_to_string(path)?;
        self.run(&code, options).await
    }

    pub async fn run(&self, code: &str, options: &RunOptions) -> Result<RunOutput> {
        let tags = if options.grab { grab::scan(code)? } else { Vec::new() };
        debug!(tags = tags.len(), capture = options.capture, "preparing R script");

        let dir = tempfile::Builder::new()
            .prefix("rinterface-")
            .tempdir_in(&self.config.temp_root)?;
        let result = self.run_in(dir.path(), code, &tags, options).await;

        if self.config.keep_temp {
            let kept = dir.keep();
            warn!(path = %kept.display(), "keeping temporary files");
        }
        result
    }

    async fn run_in(
        &self,
        dir: &Path,
        code: &str,
        tags: &[GrabTag],
        options: &RunOptions,
    ) -> Result<RunOutput> {
        let script_path = dir.join(SCRIPT_FILE);
        let grab_path = dir.join(GRAB_FILE);
        let script = grab::instrument(code, tags, &grab_path, dir);
        fs::write(&script_path, &script)?;
        if let Some(save) = &options.save {
            fs::write(save, &script)?;
            debug!(path = %save.display(), "saved script");
        }

        let out = process::run_script(&self.config, &script_path, options.capture).await?;
        if !out.status.success() {
            return Err(Error::Execution {
                code: out.status.code(),
                stdout: out.stdout.unwrap_or_default(),
                stderr: out.stderr.unwrap_or_default(),
            });
        }

        let values = if tags.is_empty() {
            Vec::new()
        } else {
            if !grab_path.exists() {
                return Err(Error::MissingGrabOutput(grab_path));
            }
            let text = fs::read_to_string(&grab_path)?;
            grab::parse_output(&text, tags)?
        };

        info!(code = ?out.status.code(), grabbed = values.len(), "R script finished");
        Ok(RunOutput {
            code: out.status.code(),
            stdout: out.stdout,
            stderr: out.stderr,
            values,
        })
    }
}
