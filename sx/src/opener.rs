//! Opening result URLs

use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

/// Opens a URL outside the terminal
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the configured handler command, or the platform default
/// browser when none is set
#[derive(Debug, Clone, Default)]
pub struct SystemOpener {
    handler: Option<String>,
}

impl SystemOpener {
    pub fn new(handler: &str) -> Self {
        let handler = handler.trim();
        Self {
            handler: (!handler.is_empty()).then(|| handler.to_string()),
        }
    }
}

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        if url.trim().is_empty() {
            bail!("result has no URL");
        }

        tracing::debug!(url, handler = ?self.handler, "opening url");

        match &self.handler {
            Some(handler) => {
                Command::new(handler)
                    .arg(url)
                    .stdin(Stdio::null())
                    .stdout(Stdio::null())
                    .stderr(Stdio::null())
                    .spawn()
                    .with_context(|| format!("failed to run url handler '{}'", handler))?;
            }
            None => {
                open::that_detached(url).context("failed to open browser")?;
            }
        }

        Ok(())
    }
}
