//! `check`: make sure the interpreter can be started.

use anyhow::{Context, Result};
use rinterface::{RInterface, RInterfaceConfig};

pub struct CheckHandler;

impl CheckHandler {
    pub async fn run(settings: RInterfaceConfig) -> Result<()> {
        let interface = RInterface::new(settings);
        let banner = interface.check().await.with_context(|| {
            format!(
                "{} is not usable; install R or set RSCRIPT_PATH",
                interface.config().rscript.display()
            )
        })?;
        println!("{}", banner);
        Ok(())
    }
}
