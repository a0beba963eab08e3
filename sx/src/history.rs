//! Search history
//!
//! One `RFC3339<TAB>query` line per search, oldest first, trimmed to the
//! configured maximum after every append.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat};

use crate::config::Config;

/// Environment variable that points at an alternate history file
pub const HISTORY_PATH_ENV: &str = "SX_HISTORY_PATH";

const DEFAULT_MAX_ENTRIES: usize = 100;

/// A recorded search
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub query: String,
}

/// Append-only history file
#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    max_entries: usize,
}

impl History {
    pub fn new(path: impl Into<PathBuf>, max_entries: usize) -> Self {
        Self {
            path: path.into(),
            max_entries: if max_entries == 0 {
                DEFAULT_MAX_ENTRIES
            } else {
                max_entries
            },
        }
    }

    /// History at the default location, or `None` when disabled or no
    /// state directory can be found
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.history_enabled {
            return None;
        }
        Self::default_path().map(|path| Self::new(path, config.max_history))
    }

    /// `$SX_HISTORY_PATH`, else `<state dir>/sx/history`
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(HISTORY_PATH_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|dir| dir.join("sx").join("history"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a query; blank queries are ignored
    pub fn append(&self, query: &str) -> Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        // Queries are single-line; tabs would break the format
        let line = query.replace(['\t', '\n', '\r'], " ");
        let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        writeln!(file, "{}\t{}", timestamp, line)?;

        self.trim()
    }

    /// All parseable entries, oldest first
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .read_lines()?
            .iter()
            .filter_map(|line| parse_line(line))
            .collect())
    }

    /// Delete the history file; returns whether anything was removed
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => {
                Err(e).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }

    fn trim(&self) -> Result<()> {
        let lines = self.read_lines()?;
        if lines.len() <= self.max_entries {
            return Ok(());
        }

        let keep = &lines[lines.len() - self.max_entries..];
        let mut content = keep.join("\n");
        content.push('\n');
        fs::write(&self.path, content)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    fn read_lines(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", self.path.display())),
        }
    }
}

fn parse_line(line: &str) -> Option<HistoryEntry> {
    let (timestamp, query) = line.split_once('\t')?;
    let timestamp = DateTime::parse_from_rfc3339(timestamp).ok()?;
    Some(HistoryEntry {
        timestamp,
        query: query.to_string(),
    })
}

/// Lines for `sx history`: the most recent `limit` entries (0 = all)
pub fn format_entries(entries: &[HistoryEntry], limit: usize) -> Vec<String> {
    let start = if limit > 0 && limit < entries.len() {
        entries.len() - limit
    } else {
        0
    };

    entries[start..]
        .iter()
        .map(|entry| {
            format!(
                "  {}  {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.query
            )
        })
        .collect()
}
