//! `run`: execute a script, print captured output and grabbed values.

use std::{io, time::Duration};

use anyhow::Result;
use is_terminal::IsTerminal;
use rinterface::{RInterface, RInterfaceConfig, RunOptions};

use crate::{
    cli::RunArgs,
    printer::{JsonPrinter, TextPrinter},
    utils::read_script,
};

pub struct RunHandler;

impl RunHandler {
    pub async fn run(mut settings: RInterfaceConfig, args: &RunArgs) -> Result<()> {
        if let Some(secs) = args.timeout {
            settings = settings.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        if args.keep_temp {
            settings = settings.with_keep_temp(true);
        }

        let code = read_script(args.file.as_deref())?;
        let mut options = RunOptions::default()
            .with_capture(args.capture)
            .with_grab(args.grab);
        if let Some(path) = &args.save {
            options = options.save_to(path);
        }

        let out = RInterface::new(settings).run(&code, &options).await?;

        if args.json {
            return JsonPrinter.print(&out);
        }
        if let Some(stdout) = out.stdout.as_deref().filter(|s| !s.is_empty()) {
            print!("{}", stdout);
        }
        if let Some(stderr) = out.stderr.as_deref().filter(|s| !s.is_empty()) {
            eprint!("{}", stderr);
        }
        let printer = TextPrinter {
            color: io::stdout().is_terminal(),
        };
        for grabbed in &out.values {
            printer.print(grabbed);
        }
        Ok(())
    }
}
