use std::io::{self, IsTerminal, Read};

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};

use sx::app;
use sx::cli::{Cli, Commands, HistoryAction};
use sx::config::Config;
use sx::history::{format_entries, History};
use sx::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before loading config, so the config path is logged
    init_tracing(cli.verbose, cli.debug)?;

    let mut config = Config::load()?;
    app::apply_overrides(&mut config, &cli)?;

    if let Some(Commands::History { limit, action }) = &cli.command {
        return run_history(&config, *limit, action.as_ref());
    }

    let stdin_piped = !io::stdin().is_terminal();
    let query = match cli.query_text() {
        query if !query.is_empty() => query,
        _ if stdin_piped => read_query_from_stdin()?,
        _ => {
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    let options = app::build_options(&config, &cli, &query)?;
    app::check_backend(&config, options.engine.as_deref())?;
    let manager = config.build_manager()?;

    let history = History::from_config(&config);
    if let Some(history) = &history {
        if let Err(e) = history.append(&query) {
            tracing::warn!("Failed to record search history: {:#}", e);
        }
    }

    app::run(&config, options, &manager, history.as_ref(), stdin_piped).await
}

/// Piped input lines joined into one query
fn read_query_from_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Error reading from stdin")?;

    let query = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if query.is_empty() {
        bail!("empty input from stdin");
    }
    Ok(query)
}

fn run_history(config: &Config, limit: usize, action: Option<&HistoryAction>) -> Result<()> {
    let path = History::default_path().context("could not determine the history location")?;
    let history = History::new(path, config.max_history);

    match action {
        Some(HistoryAction::Clear) => {
            history.clear()?;
            println!("History cleared.");
        }
        None => {
            let entries = history.load()?;
            if entries.is_empty() {
                println!("No search history.");
            }
            for line in format_entries(&entries, limit) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
