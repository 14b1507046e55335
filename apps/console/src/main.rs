mod cli;
mod commands;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use jobassist_console::api::ApiClient;
use jobassist_console::config::Config;
use jobassist_console::guard::{AuthGate, FetchGuard, ReqwestTransport};
use jobassist_console::views::print_error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            print_error(&format!("{error:#}"));
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.clone() {
        config.api_url = url;
    }
    if let Some(token) = cli.token.clone() {
        config.token = Some(token);
    }
    if let Some(path) = cli.token_file.clone() {
        config.token_file = Some(path);
    }
    init_logging(&config, cli.verbose);
    debug!(api_url = %config.api_url, "Using API");

    let transport = ReqwestTransport::new(REQUEST_TIMEOUT).context("Failed to build HTTP client")?;
    let guard = FetchGuard::new(
        transport,
        AuthGate::resolve_in_background(config.token.clone(), config.token_file.clone()),
        config.guard_config(),
    );
    let api = ApiClient::new(guard);

    commands::run(cli.command, &api).await
}

/// Logs go to stderr so tables on stdout stay clean.
fn init_logging(config: &Config, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
