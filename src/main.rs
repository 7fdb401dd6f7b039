use clap::Parser;
use std::process::ExitCode;

mod banner;
mod cli;
mod commands;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    // Load environment variables from .env if present (silently ignore if missing)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Some(mode) = cli.color {
        dockhand::set_color_mode(mode);
    }
    dockhand::logging_init(cli.verbose);
    tracing::debug!(command = ?cli.command, dry_run = cli.dry_run, "starting");

    match &cli.command {
        Command::Docker(args) => commands::run_docker(&cli, args),
        Command::Vlan(args) => commands::run_vlan(&cli, args),
        Command::Launch(args) => commands::run_launch(&cli, args),
        Command::Doctor => commands::run_doctor(&cli),
    }
}
