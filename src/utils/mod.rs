//! Script input helpers.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;

/// Read a script from `file`, or from stdin when no file is given.
pub fn read_script(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => read_script_file(path),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                bail!("no script given: pass a FILE or pipe R code on stdin");
            }
            let mut buf = String::new();
            stdin.lock().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn read_script_file(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("Script file '{}' does not exist", path.display());
    }
    if !path.is_file() {
        bail!("'{}' is not a file", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read script '{}'", path.display()))
}
