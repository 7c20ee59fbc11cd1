//! Interpreter process management: spawning `Rscript` and collecting its output.

use std::{
    path::Path,
    process::{ExitStatus, Stdio},
};

use tokio::{process::Command, time::timeout};
use tracing::debug;

use crate::{
    config::RInterfaceConfig,
    error::{Error, Result},
};

/// Raw result of one interpreter invocation.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Present only when output was captured.
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

fn command(program: &Path) -> Command {
    let mut cmd = Command::new(program);
    // dropping the wait future on timeout must not leave R running
    cmd.kill_on_drop(true);
    cmd
}

fn spawn_error(program: &Path, source: std::io::Error) -> Error {
    if source.kind() == std::io::ErrorKind::NotFound {
        Error::InterpreterNotFound {
            program: program.display().to_string(),
            source,
        }
    } else {
        Error::Io(source)
    }
}

/// Run `script` with the configured interpreter.
///
/// With `capture` the child's stdout/stderr are piped and returned; otherwise
/// they are inherited from the host process.
pub async fn run_script(cfg: &RInterfaceConfig, script: &Path, capture: bool) -> Result<ProcessOutput> {
    let mut cmd = command(&cfg.rscript);
    cmd.arg(script).stdin(Stdio::null());
    if let Some(dir) = &cfg.work_dir {
        cmd.current_dir(dir);
    }
    if capture {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
    }

    debug!(program = %cfg.rscript.display(), script = %script.display(), capture, "spawning interpreter");
    let child = cmd.spawn().map_err(|e| spawn_error(&cfg.rscript, e))?;

    let out = match cfg.timeout {
        Some(limit) => timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| Error::Timeout(limit.as_secs()))??,
        None => child.wait_with_output().await?,
    };

    let (stdout, stderr) = if capture {
        (
            Some(String::from_utf8_lossy(&out.stdout).into_owned()),
            Some(String::from_utf8_lossy(&out.stderr).into_owned()),
        )
    } else {
        (None, None)
    };
    debug!(code = ?out.status.code(), "interpreter exited");
    Ok(ProcessOutput {
        status: out.status,
        stdout,
        stderr,
    })
}

/// Ask the interpreter for its version banner.
///
/// Fails with [`Error::InterpreterNotFound`] when the binary cannot be started.
pub async fn version(program: &Path) -> Result<String> {
    let out = command(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| spawn_error(program, e))?;

    let stdout = String::from_utf8_lossy(&out.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
    if !out.status.success() {
        return Err(Error::Execution {
            code: out.status.code(),
            stdout,
            stderr,
        });
    }
    // older R releases print the banner on stderr
    Ok(if stdout.is_empty() { stderr } else { stdout })
}
