//! `scan`: list grab tags without running anything.

use std::path::Path;

use anyhow::Result;

use crate::{printer::JsonPrinter, utils::read_script};

pub struct ScanHandler;

impl ScanHandler {
    pub fn run(file: Option<&Path>, json: bool) -> Result<()> {
        let code = read_script(file)?;
        let tags = rinterface::scan(&code)?;
        if json {
            return JsonPrinter.print(&tags);
        }
        for tag in &tags {
            println!("{}\t{}\t{}", tag.line, tag.name, tag.ty);
        }
        Ok(())
    }
}
