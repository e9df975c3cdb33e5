// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `teleport-pagerduty` command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tpd_adapters::IncidentAdapter;
use tpd_daemon::config::Config;
use tpd_daemon::{env, listener, logging, pagerduty_bot, AppError};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "teleport-pagerduty", about = "Teleport access requests as PagerDuty incidents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a sample configuration file
    Configure,
    /// Print the version
    Version,
    /// Validate the configuration against PagerDuty
    Check {
        /// Config file (default: $TPD_CONFIG or /etc/teleport-pagerduty.toml)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Configure => {
            print!("{}", Config::example());
            ExitCode::SUCCESS
        }
        Command::Version => {
            println!("teleport-pagerduty v{}", env::VERSION);
            ExitCode::SUCCESS
        }
        Command::Check { config } => match check(env::config_path(config)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn check(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&path)?;
    let _guard = logging::init(&config.log)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        if listener::provision_cert(&config.http)? {
            info!(cert = %config.http.https_cert_file.display(), "generated self-signed certificate");
        }
        let bot = pagerduty_bot(&config)?;
        if let Err(e) = bot.health_check().await {
            error!(error = %e, "pagerduty api health check failed");
            return Err(AppError::HealthCheck(e));
        }
        info!(service_id = bot.service_id(), "configuration ok");
        Ok::<(), AppError>(())
    })?;
    Ok(())
}
