//! Library error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("interpreter '{program}' could not be started: {source}")]
    InterpreterNotFound {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("R script execution failed (exit code={})\n--- R stderr ---\n{stderr}\n--- R stdout ---\n{stdout}", .code.map(|c| c.to_string()).unwrap_or_else(|| "signal".into()))]
    Execution {
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("R script timed out after {0}s")]
    Timeout(u64),

    #[error("invalid @grab tag at line {line}: {reason}")]
    InvalidTag {
        /// 1-based line of the `@grab` tag itself.
        line: usize,
        reason: String,
    },

    #[error("unsupported type '{0}' in @grab annotation")]
    UnsupportedType(String),

    #[error("variable '{0}' is grabbed more than once")]
    DuplicateTag(String),

    #[error("grab output file was not written: {}", .0.display())]
    MissingGrabOutput(PathBuf),

    #[error("no value was written for grabbed variable '{0}'")]
    MissingValue(String),

    #[error("cannot parse value of '{name}': {reason}")]
    Parse { name: String, reason: String },

    #[error("malformed CSV at record {record}: {reason}")]
    Csv { record: usize, reason: String },
}

impl Error {
    pub(crate) fn parse(name: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
