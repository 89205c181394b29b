use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Guest tools installer for Linux guests")]
pub struct Args {
    /// TOML file overriding the default installer layout
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub sub: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Install or upgrade guest tools (Exit 0 = installed, 1 = failed or already current)
    Install {
        /// Bundle directory holding the payload, init script and config/
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
    /// Remove guest tools (Exit 0 = removed, 1 = declined or failed)
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
