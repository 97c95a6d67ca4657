mod adapters;
mod cli;
mod commands;
mod config;
mod domain;
mod output;

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn read_settings(cli: &Cli) -> anyhow::Result<config::Settings> {
    let path = cli.global.config.clone().or_else(config::default_config_path);
    config::read_settings(path.as_deref())
        .with_context(|| match &path {
            Some(path) => format!("failed to read {}", path.display()),
            None => "failed to read settings".to_string(),
        })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match read_settings(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(cli.global.debug || settings.debug);

    match commands::run(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
