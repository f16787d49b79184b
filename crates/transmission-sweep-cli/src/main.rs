mod commands;
mod logging;
mod report;

use std::path::Path;
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use report::ConsoleReporter;
use tracing::{error, info};
use transmission_sweep_core::config::{self, ConfigOverrides};
use transmission_sweep_core::daemon::RpcClient;
use transmission_sweep_core::{AppConfig, CleanupEngine, CleanupResult, Error};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let args = Cli::parse();

    let command = match args.command {
        Some(command) => command,
        None => {
            let _ = Cli::command().print_long_help();
            return Ok(());
        }
    };

    let overrides = ConfigOverrides {
        host: args.host.clone(),
        port: args.port,
        torrents_dir: match &command {
            Commands::CleanupTorrentsdir { dir } => dir.clone(),
            _ => None,
        },
        incomplete_dir: match &command {
            Commands::CleanupIncompletedir { dir } => dir.clone(),
            _ => None,
        },
    };

    let config = match config::load_configuration(&overrides) {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    if let Err(err) = run_command(&command, &config, args.dry_run) {
        error!("Error: {}", err);
        process::exit(1);
    }

    Ok(())
}

fn run_command(command: &Commands, config: &AppConfig, dry_run: bool) -> Result<(), Error> {
    match command {
        Commands::CleanupIncompletedir { .. } => {
            let dir = require_dir(config.incomplete_dir.as_deref(), "incomplete_dir")?;
            let engine = CleanupEngine::new(RpcClient::from_config(config)?);
            let result =
                engine.run_incomplete_cleanup(Path::new(&dir), dry_run, &ConsoleReporter)?;
            print_cleanup_summary(&result);
            Ok(())
        }
        Commands::CleanupTorrentsdir { .. } => {
            let dir = require_dir(config.torrents_dir.as_deref(), "torrents_dir")?;
            let engine = CleanupEngine::new(RpcClient::from_config(config)?);
            let result =
                engine.run_torrents_cleanup(Path::new(&dir), dry_run, &ConsoleReporter)?;
            print_cleanup_summary(&result);
            Ok(())
        }
        Commands::RemoveFinished { delete_data } => {
            let engine = CleanupEngine::new(RpcClient::from_config(config)?);
            let result = engine.run_remove_finished(*delete_data, dry_run, &ConsoleReporter)?;
            println!();
            if result.dry_run {
                info!(
                    "{} tasks inspected, {} finished (dry run, nothing removed)",
                    result.tasks_fetched,
                    format!("{}", result.finished).yellow(),
                );
            } else {
                info!(
                    "{} tasks inspected, {} finished task(s) removed",
                    result.tasks_fetched,
                    format!("{}", result.finished).green(),
                );
            }
            Ok(())
        }
        Commands::PrintConfig => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
    }
}

fn require_dir(value: Option<&str>, key: &str) -> Result<String, Error> {
    value.map(str::to_owned).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "no target directory: pass --dir, set TRANSMISSION_{}, or add '{}' to the config file",
            key.to_uppercase(),
            key
        ))
    })
}

fn print_cleanup_summary(result: &CleanupResult) {
    println!();
    info!(
        "Scan: {}, Query: {}",
        format!("{:.2}s", result.scan_duration.as_secs_f64()).green(),
        format!("{:.2}s", result.query_duration.as_secs_f64()).green(),
    );
    info!(
        "{} artifacts, {} live tasks, {} linked, {} orphaned, {} ambiguous groups",
        result.artifacts_scanned,
        result.tasks_fetched,
        format!("{}", result.linked).green(),
        format!("{}", result.orphaned).yellow(),
        format!("{}", result.ambiguous_groups).red(),
    );
    if result.dry_run {
        info!(
            "{} would be removed (dry run)",
            format!("{}", result.deletion_targets).yellow(),
        );
    } else {
        info!(
            "{} removed, {} already absent, {} denied",
            format!("{}", result.deleted).green(),
            format!("{}", result.already_absent).green(),
            format!("{}", result.denied).red(),
        );
    }
}
