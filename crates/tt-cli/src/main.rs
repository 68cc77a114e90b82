use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tt_cli::commands::{check, entries, session};
use tt_cli::{Cli, Commands, Config, logging};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let logger = logging::build_logger(cli.echo_log);
    let mut client = session::connect(&config, logger)?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Check => check::run(&mut stdout, &mut client)?,
        Commands::Entries { start, end, json } => {
            let (from, to) = entries::resolve_range(start.as_deref(), end.as_deref())?;
            entries::run(&mut stdout, &mut client, &from, &to, *json)?;
        }
    }

    Ok(())
}
