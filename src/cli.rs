use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "rinterface", about = "Run R scripts and grab their values", version)]
pub struct Cli {
    /// Verbose logging (repeat for more).
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Interpreter to use instead of RSCRIPT_PATH / `Rscript`.
    #[arg(long, global = true, value_name = "PATH")]
    pub rscript: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that the R interpreter can be started.
    Check,
    /// Run an R script (from FILE or stdin).
    Run(RunArgs),
    /// List the `# @grab{type}` tags in a script without running it.
    Scan {
        /// Script file; read from stdin when omitted.
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
        /// Print tags as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Convert a JSON value to an R literal.
    ///
    /// Numbers, strings, booleans and null map to scalars, flat arrays to
    /// vectors, arrays of arrays to matrices, objects of arrays to data frames.
    #[command(name = "to-r")]
    ToR {
        #[arg(value_name = "JSON")]
        json: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Script file; read from stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Capture stdout/stderr of the script and print them afterwards.
    #[arg(short = 'c', long)]
    pub capture: bool,

    /// Extract variables tagged with `# @grab{type}`.
    #[arg(short = 'g', long)]
    pub grab: bool,

    /// Also save the script to this file.
    #[arg(long, value_name = "PATH")]
    pub save: Option<PathBuf>,

    /// Print captured output and grabbed values as JSON.
    #[arg(long)]
    pub json: bool,

    /// Kill the interpreter after this many seconds (0 disables).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep the temporary script directory for inspection.
    #[arg(long = "keep-temp")]
    pub keep_temp: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
