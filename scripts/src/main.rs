use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use voting_deploy::{cli::Cli, constants::DEFAULT_LOG_FILTER, pipeline::exit_status};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).pretty().init();

    let config = cli.pipeline_config();
    let result = cli.command.run(config).await;

    ExitCode::from(exit_status(&result))
}
