//! sysrgb CLI
//!
//! A command-line interface for per-key RGB keyboards driven through the
//! kernel LED class.

use std::process::ExitCode;

use clap::Parser;
use sysrgb::Config;
use tracing_subscriber::EnvFilter;

// CLI definitions
mod cli;
use cli::{Cli, Commands};

// Command handlers
mod commands;
use commands::animations::AnimateArgs;
use commands::{CommandResult, Session};

fn init_logging(verbose: bool) {
    let default = if verbose { "sysrgb=debug" } else { "sysrgb=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> CommandResult {
    let config = Config::load_or_default(cli.config.as_deref())?;
    let session = Session::new(config, cli.leds_root);

    commands::check_privileges();

    match cli.command {
        // Default: show node status
        None | Some(Commands::Info) => commands::query::info(&session),
        Some(Commands::Keys) => commands::query::keys(&session),

        // === Profiles ===
        Some(Commands::Save { path }) => commands::profile::save(&session, &path),
        Some(Commands::Load { path }) => commands::profile::load(&session, &path),

        // === Direct control ===
        Some(Commands::Set { target, color }) => commands::set::set(&session, &target, &color),
        Some(Commands::Brightness { target, value }) => {
            commands::set::brightness(&session, &target, value)
        }
        Some(Commands::Randomize { keys }) => commands::set::randomize(&session, &keys),

        // === Animations ===
        Some(Commands::Animate {
            kind,
            target,
            key_name,
            color,
            interval_ms,
            keys,
        }) => commands::animations::animate(
            &session,
            &AnimateArgs {
                kind,
                target,
                key_name,
                color,
                interval_ms,
                keys,
            },
        ),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
