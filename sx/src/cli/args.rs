//! CLI argument definitions
//!
//! Contains the main CLI struct and Commands enum for clap parsing. Options
//! left unset fall back to the config file.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Default)]
#[command(name = "sx")]
#[command(about = "Web search from the command line")]
#[command(long_about = "sx searches a SearXNG instance, Brave or Tavily from the command line, \
with automatic fallback between backends.")]
#[command(version, disable_version_flag = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Search query
    pub query: Vec<String>,

    /// SearXNG instance URL
    #[arg(long)]
    pub searxng_url: Option<String>,

    /// Categories to search in (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Output search results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Omit empty and null values in JSON output
    #[arg(short, long)]
    pub clean: bool,

    /// SearXNG engines to use (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub engines: Vec<String>,

    /// Search backend to use exclusively (searxng, brave, tavily)
    #[arg(long)]
    pub engine: Option<String>,

    /// Show complete URLs in search results
    #[arg(short = 'x', long)]
    pub expand: bool,

    /// Open the first result in the web browser and exit
    #[arg(short = 'j', long)]
    pub first: bool,

    /// Open a random result in the web browser and exit
    #[arg(long)]
    pub lucky: bool,

    /// HTTP method for SearXNG requests (GET or POST)
    #[arg(long)]
    pub http_method: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Search results in a specific language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Do not verify SSL certificates
    #[arg(long)]
    pub no_verify_ssl: bool,

    /// Disable colored output
    #[arg(long)]
    pub nocolor: bool,

    /// Disable the user agent header
    #[arg(long)]
    pub noua: bool,

    /// Show N results per page
    #[arg(short, long)]
    pub num: Option<usize>,

    /// Safe search level (none, moderate, strict)
    #[arg(long)]
    pub safe_search: Option<String>,

    /// Restrict results to a site
    #[arg(short = 'w', long)]
    pub site: Option<String>,

    /// Time range (day, week, month, year, or d/w/m/y)
    #[arg(short = 'r', long)]
    pub time_range: Option<String>,

    /// Allow unsafe search results
    #[arg(long = "unsafe")]
    pub allow_unsafe: bool,

    /// Show debug output
    #[arg(long)]
    pub debug: bool,

    /// Output only URLs, one per line
    #[arg(short = 'L', long)]
    pub links_only: bool,

    /// Save output to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show only the top result
    #[arg(long)]
    pub top: bool,

    /// Enter interactive mode after displaying results
    #[arg(short, long)]
    pub interactive: bool,

    /// Deprecated: non-interactive is now the default
    #[arg(short = 'p', long = "np", hide = true)]
    pub no_prompt: bool,

    /// Show results from the files category
    #[arg(short = 'F', long)]
    pub files: bool,

    /// Show results from the music category
    #[arg(short = 'M', long)]
    pub music: bool,

    /// Show results from the news category
    #[arg(short = 'N', long)]
    pub news: bool,

    /// Show results from the social media category
    #[arg(short = 'S', long)]
    pub social: bool,

    /// Show results from the videos category
    #[arg(short = 'V', long)]
    pub videos: bool,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show search history
    History {
        /// Number of history entries to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Clear search history
    Clear,
}

impl Cli {
    /// Query words joined with spaces
    pub fn query_text(&self) -> String {
        self.query.join(" ").trim().to_string()
    }

    /// Category selected by a shortcut flag; the last one given wins
    pub fn shortcut_category(&self) -> Option<&'static str> {
        [
            (self.videos, "videos"),
            (self.social, "social media"),
            (self.news, "news"),
            (self.music, "music"),
            (self.files, "files"),
        ]
        .into_iter()
        .find(|(set, _)| *set)
        .map(|(_, category)| category)
    }
}
