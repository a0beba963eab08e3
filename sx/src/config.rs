//! Configuration loading
//!
//! Settings come from `config.toml` (see [`Config::config_path`]), then
//! environment overrides, then command-line flags (applied in `app`).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sx_search::backends::{BraveBackend, SearxngBackend, TavilyBackend};
use sx_search::config::{BraveConfig, HttpMethod, SearxngConfig, TavilyConfig};
use sx_search::http::DEFAULT_TIMEOUT;
use sx_search::BackendManager;

/// Environment variable that points at an alternate config file
pub const CONFIG_PATH_ENV: &str = "SX_CONFIG_PATH";

/// Top-level configuration (from config.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub searxng_url: String,
    pub searxng_username: String,
    pub searxng_password: String,
    /// Results per page; 0 shows whatever the first page returns
    pub result_count: usize,
    pub categories: Vec<String>,
    pub safe_search: String,
    /// SearXNG engine hints
    pub engines: Vec<String>,
    pub expand: bool,
    pub language: String,
    pub http_method: HttpMethod,
    /// Request timeout in seconds
    pub timeout: f64,
    pub no_verify_ssl: bool,
    pub no_user_agent: bool,
    pub no_color: bool,
    /// Command used to open URLs instead of the platform default
    pub url_handler: String,
    pub debug: bool,
    /// `interactive` starts the interactive prompt by default
    pub default_output: String,
    pub history_enabled: bool,
    pub max_history: usize,

    /// Primary search backend
    pub engine: String,
    /// Backends tried in order when the primary fails
    pub fallback_engines: Vec<String>,
    pub engines_brave: BraveConfig,
    pub engines_tavily: TavilyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            searxng_url: String::new(),
            searxng_username: String::new(),
            searxng_password: String::new(),
            result_count: 10,
            categories: Vec::new(),
            safe_search: "strict".to_string(),
            engines: Vec::new(),
            expand: false,
            language: String::new(),
            http_method: HttpMethod::Get,
            timeout: DEFAULT_TIMEOUT.as_secs_f64(),
            no_verify_ssl: false,
            no_user_agent: false,
            no_color: false,
            url_handler: String::new(),
            debug: false,
            default_output: String::new(),
            history_enabled: true,
            max_history: 100,
            engine: "searxng".to_string(),
            fallback_engines: Vec::new(),
            engines_brave: BraveConfig::default(),
            engines_tavily: TavilyConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the config file, then apply environment overrides
    ///
    /// A missing file is not an error; defaults are used.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_or_default(Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load `path` when it exists, else defaults
    pub fn load_or_default(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => {
                tracing::debug!("Loading config from: {}", path.display());
                Self::load_from_path(&path)
            }
            _ => {
                tracing::debug!("No config.toml found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to load config from {}", path.display()))?;
        Ok(config)
    }

    /// `$SX_CONFIG_PATH`, else `<config dir>/sx/config.toml`
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("sx").join("config.toml"))
    }

    /// Override URL and API keys from the environment
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SEARXNG_URL") {
            self.searxng_url = url;
        }
        if let Some(key) = non_empty("BRAVE_API_KEY") {
            self.engines_brave.api_key = key;
        }
        if let Some(key) = non_empty("TAVILY_API_KEY") {
            self.engines_tavily.api_key = key;
        }
    }

    /// Request timeout, falling back to the default for zero or invalid values
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn searxng_config(&self) -> SearxngConfig {
        SearxngConfig {
            url: self.searxng_url.clone(),
            username: self.searxng_username.clone(),
            password: self.searxng_password.clone(),
            http_method: self.http_method,
            no_verify_ssl: self.no_verify_ssl,
            no_user_agent: self.no_user_agent,
        }
    }

    /// Name of the primary backend, defaulting to searxng
    pub fn primary_engine(&self) -> &str {
        match self.engine.trim() {
            "" => "searxng",
            name => name,
        }
    }

    /// Register every backend and wire up primary and fallbacks
    pub fn build_manager(&self) -> Result<BackendManager> {
        let timeout = self.timeout_duration();
        let mut manager = BackendManager::new();

        manager.register(Arc::new(SearxngBackend::new(self.searxng_config(), timeout)?));
        manager.register(Arc::new(BraveBackend::new(
            self.engines_brave.clone(),
            timeout,
        )?));
        manager.register(Arc::new(TavilyBackend::new(
            self.engines_tavily.clone(),
            timeout,
        )?));

        manager.set_primary(self.primary_engine())?;
        manager.set_fallbacks(self.fallback_engines.as_slice())?;

        tracing::debug!(
            primary = self.primary_engine(),
            fallbacks = ?self.fallback_engines,
            available = ?manager.available_backends(),
            "backend manager ready"
        );

        Ok(manager)
    }

    /// Whether the interactive prompt is the configured default
    pub fn interactive_by_default(&self) -> bool {
        self.default_output.eq_ignore_ascii_case("interactive")
    }
}
