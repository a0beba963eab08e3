//! Running a search from the command line
//!
//! Flags are merged into the loaded [`Config`], validated into
//! [`SearchOptions`] before any request goes out, and the first page is
//! fetched. What happens next depends on the [`OutputMode`]: render, print
//! JSON or links, open a result, or hand the session to the interactive
//! prompt.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use sx_search::{BackendManager, Category, SafeSearch, SearchOptions, SearchResult, TimeRange};

use crate::cli::args::Cli;
use crate::cli::repl::{Repl, ReplConfig};
use crate::config::Config;
use crate::history::History;
use crate::opener::{SystemOpener, UrlOpener};
use crate::output::format::results_json;
use crate::output::{default_output, OutputEvent, OutputWriter, PlainOutput, ResultPage};
use crate::session::Session;

const NO_RESULTS: &str = "No results found or an error occurred during the search.";

/// What to do with the results of a one-shot search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Render the first page as text
    Results,
    Json,
    LinksOnly,
    /// Open the first result and exit
    First,
    /// Open a random result and exit
    Lucky,
}

impl OutputMode {
    fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputMode::Json
        } else if cli.links_only {
            OutputMode::LinksOnly
        } else if cli.first {
            OutputMode::First
        } else if cli.lucky {
            OutputMode::Lucky
        } else {
            OutputMode::Results
        }
    }
}

/// Everything one run needs, validated
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub search: SearchOptions,
    /// Backend to use exclusively (`--engine`)
    pub engine: Option<String>,
    pub mode: OutputMode,
    /// Results per page
    pub page_size: usize,
    pub expand: bool,
    pub clean: bool,
    pub output_file: Option<PathBuf>,
    /// Show only the top result
    pub top: bool,
    pub interactive: bool,
}

/// Fold command-line flags into the loaded config
pub fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(url) = &cli.searxng_url {
        config.searxng_url = url.clone();
    }
    if let Some(method) = &cli.http_method {
        config.http_method = method.parse()?;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(num) = cli.num {
        config.result_count = num;
    }
    if cli.top {
        config.result_count = 1;
    }

    config.no_verify_ssl |= cli.no_verify_ssl;
    config.no_color |= cli.nocolor;
    config.no_user_agent |= cli.noua;
    config.debug |= cli.debug;
    config.expand |= cli.expand;

    Ok(())
}

/// Validate flags and config into [`RunOptions`]
///
/// Fails on unknown categories, time ranges or safe-search levels, so no
/// request is made with a bad option.
pub fn build_options(config: &Config, cli: &Cli, query: &str) -> Result<RunOptions> {
    let categories: Vec<String> = match cli.shortcut_category() {
        Some(category) => vec![category.to_string()],
        None if !cli.categories.is_empty() => cli.categories.clone(),
        None => config.categories.clone(),
    };
    let categories = categories
        .iter()
        .map(|c| c.parse::<Category>())
        .collect::<Result<Vec<_>, _>>()?;

    let time_range = cli
        .time_range
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::parse::<TimeRange>)
        .transpose()?;

    let safe_search = if cli.allow_unsafe {
        SafeSearch::None
    } else {
        cli.safe_search
            .as_deref()
            .unwrap_or(&config.safe_search)
            .parse()?
    };

    let engines = if cli.engines.is_empty() {
        config.engines.clone()
    } else {
        cli.engines.clone()
    };

    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| config.language.clone());

    let search = SearchOptions {
        query: query.to_string(),
        categories,
        engines,
        language: non_empty(language),
        time_range,
        site: cli.site.clone().and_then(non_empty),
        safe_search: Some(safe_search),
        page_no: 1,
        num_results: config.result_count,
    };

    Ok(RunOptions {
        search,
        engine: cli.engine.clone().and_then(non_empty),
        mode: OutputMode::from_cli(cli),
        page_size: config.result_count,
        expand: config.expand,
        clean: cli.clean,
        output_file: cli.output.clone(),
        top: cli.top,
        interactive: cli.interactive || config.interactive_by_default(),
    })
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Fail early when searxng would be used without a URL and nothing can take
/// over
pub fn check_backend(config: &Config, engine: Option<&str>) -> Result<()> {
    let engine = engine.unwrap_or_else(|| config.primary_engine());
    if engine == "searxng"
        && config.searxng_url.trim().is_empty()
        && config.fallback_engines.is_empty()
    {
        bail!(
            "searxng_url is not set in config and no fallback engines configured\n\
             Set searxng_url in config.toml or use --engine brave/tavily"
        );
    }
    Ok(())
}

/// The interactive prompt needs a terminal on both ends and plain result
/// output
pub fn wants_interactive(
    requested: bool,
    stdout_tty: bool,
    stdin_piped: bool,
    mode: OutputMode,
    top: bool,
) -> bool {
    requested && stdout_tty && !stdin_piped && mode == OutputMode::Results && !top
}

/// Run one search and handle its results
pub async fn run(
    config: &Config,
    options: RunOptions,
    manager: &BackendManager,
    history: Option<&History>,
    stdin_piped: bool,
) -> Result<()> {
    let output = default_output(config.no_color);
    let opener = SystemOpener::new(&config.url_handler);

    let interactive = wants_interactive(
        options.interactive,
        std::io::stdout().is_terminal(),
        stdin_piped,
        options.mode,
        options.top,
    );

    let mut session =
        Session::new(manager, options.search.clone()).pinned(options.engine.clone());
    session
        .ensure_results(0, options.page_size)
        .await
        .context("Search error")?;

    if let Some(backend) = session.used_backend() {
        tracing::info!(backend, results = session.results().len(), "search complete");
    }

    if session.results().is_empty() {
        output.write(OutputEvent::Text(NO_RESULTS.to_string()));
        return Ok(());
    }

    let query = session.query().to_string();

    match options.mode {
        OutputMode::Json => {
            let json = results_json(&query, session.results(), options.clean)?;
            match &options.output_file {
                Some(path) => write_file(path, &json)?,
                None => output.write(OutputEvent::Json(json)),
            }
        }

        OutputMode::LinksOnly => {
            let links = links(session.window(options.page_size));
            match &options.output_file {
                Some(path) => write_file(path, &links)?,
                None => output.write(OutputEvent::Text(links)),
            }
        }

        OutputMode::First => {
            open_result(&opener, session.result(1))?;
        }

        OutputMode::Lucky => {
            let mut rng = rand::thread_rng();
            open_result(&opener, session.results().choose(&mut rng))?;
        }

        OutputMode::Results => {
            let page = ResultPage {
                query,
                start_at: 0,
                results: session.window(options.page_size).to_vec(),
                expand: options.expand,
            };

            match &options.output_file {
                Some(path) => write_file(path, &PlainOutput::render_page(&page).join("\n"))?,
                None if interactive => {}
                None => output.write(OutputEvent::Results(page)),
            }

            if interactive {
                let mut repl = Repl::new(session, &*output, &opener)
                    .with_config(ReplConfig {
                        page_size: options.page_size,
                        expand: options.expand,
                        debug: config.debug,
                        clean_json: options.clean,
                    })
                    .with_history(history);

                if options.output_file.is_none() {
                    repl.render();
                }
                repl.run(std::io::stdin().lock()).await?;
            }
        }
    }

    output.flush();
    Ok(())
}

fn links(results: &[SearchResult]) -> String {
    results
        .iter()
        .filter(|r| r.has_url())
        .map(|r| r.url.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn open_result(opener: &dyn UrlOpener, result: Option<&SearchResult>) -> Result<()> {
    let url = result.map(|r| r.url.as_str()).unwrap_or_default();
    opener.open(url).context("Error opening URL")
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let mut content = content.to_string();
    if !content.ends_with('\n') {
        content.push('\n');
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("Wrote results to {}", path.display());
    Ok(())
}
