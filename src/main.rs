mod cli;
mod handlers;
mod printer;
mod utils;

use anyhow::Result;
use rinterface::{Config, RInterfaceConfig};
use tracing_subscriber::EnvFilter;

use cli::Command;
use handlers::{check::CheckHandler, run::RunHandler, scan::ScanHandler, to_r::ToRHandler};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "rinterface=warn",
        1 => "rinterface=debug",
        _ => "rinterface=trace",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);

    // Load config; CLI flags override it
    let cfg = Config::load();
    let mut settings = RInterfaceConfig::from_config(&cfg);
    if let Some(rscript) = args.rscript.clone() {
        settings = settings.with_rscript(rscript);
    }
    tracing::debug!(
        config = %cfg.config_path.display(),
        rscript = %settings.rscript.display(),
        "loaded config"
    );

    match &args.command {
        Command::Check => CheckHandler::run(settings).await,
        Command::Run(run) => RunHandler::run(settings, run).await,
        Command::Scan { file, json } => ScanHandler::run(file.as_deref(), *json),
        Command::ToR { json } => ToRHandler::run(json),
    }
}
