use std::{error::Error, process::ExitCode};

use clap::Parser;
use ekn_convert::{VERSION, cli::model::Cli, config::ConverterConfig};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    debug!("ekn-convert {VERSION}");
    let cfg = ConverterConfig::load(cli.config.as_deref())?;

    if let Some(out) = cli.dispatch(cfg).await? {
        println!("{out}");
    }

    Ok(())
}
