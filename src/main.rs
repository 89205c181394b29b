mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use ngt_installer::command::SystemCommandRunner;
use ngt_installer::config::InstallerConfig;
use ngt_installer::install;
use ngt_installer::logging;

fn main() {
    let args = cli::Args::parse();
    match real_main(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("FATAL: {e:#}");
            std::process::exit(1);
        }
    }
}

fn real_main(args: cli::Args) -> Result<i32> {
    let mut config = InstallerConfig::load(args.config.as_deref())
        .context("Failed to load installer configuration")?;

    match args.sub {
        cli::Cmd::Install { bundle } => {
            if let Some(bundle) = bundle {
                config.bundle_dir = bundle;
            }
            let log_path = logging::init(&config.log_dir, logging::INSTALL_LOG_PREFIX)?;
            info!("Logging to {}", log_path.display());

            let result = install::run_install(&config, &SystemCommandRunner);
            if let Err(e) = &result {
                error!("{e}");
            }
            Ok(install::install_exit_code(&result))
        }
        cli::Cmd::Uninstall { yes } => {
            let log_path = logging::init(&config.log_dir, logging::UNINSTALL_LOG_PREFIX)?;
            info!("Logging to {}", log_path.display());

            let result = install::run_uninstall(&config, &SystemCommandRunner, yes);
            if let Err(e) = &result {
                error!("{e}");
            }
            Ok(install::uninstall_exit_code(&result))
        }
    }
}
