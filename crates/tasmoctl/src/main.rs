mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Settings;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = build_settings(&cli.global);
    tracing::debug!(registry = %settings.registry_path.display(), "dispatching command");
    commands::dispatch(cli.command, &settings, &cli.global).await
}

/// Merge the config file with CLI flag overrides.
fn build_settings(global: &cli::GlobalOpts) -> Settings {
    let cfg = tasmo_config::load_config_or_default();

    let registry_path = global
        .registry
        .clone()
        .unwrap_or_else(|| cfg.registry_path());
    let timeout = global.timeout.unwrap_or(cfg.timeout);

    Settings {
        registry_path,
        poll_interval: std::time::Duration::from_secs(cfg.poll_interval),
        timeout: std::time::Duration::from_secs(timeout),
    }
}
