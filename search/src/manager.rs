//! Backend registry and ordered fallback dispatch
//!
//! The manager owns every registered backend by name. A search goes to the
//! primary first; when that fails the fallbacks are tried one at a time in
//! declared order. Nothing runs concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backends::SearchBackend;
use crate::error::{DispatchError, FailedAttempt};
use crate::types::{SearchOptions, SearchResult};

/// Registry of search backends with a primary and ordered fallbacks
#[derive(Default, Clone)]
pub struct BackendManager {
    backends: BTreeMap<String, Arc<dyn SearchBackend>>,
    primary: Option<String>,
    fallbacks: Vec<String>,
}

impl BackendManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own name, replacing any previous one
    pub fn register(&mut self, backend: Arc<dyn SearchBackend>) {
        let name = backend.name().to_string();
        if self.backends.insert(name.clone(), backend).is_some() {
            tracing::debug!(backend = %name, "replaced registered backend");
        }
    }

    /// Set the backend every search tries first
    pub fn set_primary(&mut self, name: &str) -> Result<(), DispatchError> {
        self.ensure_known(name)?;
        self.primary = Some(name.to_string());
        Ok(())
    }

    /// Set the ordered fallback chain
    ///
    /// Every name is checked before anything changes; on an unknown name
    /// the previous chain is kept.
    pub fn set_fallbacks<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), DispatchError> {
        for name in names {
            self.ensure_known(name.as_ref())?;
        }
        self.fallbacks = names.iter().map(|n| n.as_ref().to_string()).collect();
        Ok(())
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    pub fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }

    pub fn get_backend(&self, name: &str) -> Option<Arc<dyn SearchBackend>> {
        self.backends.get(name).cloned()
    }

    /// Names of every registered backend, sorted
    pub fn configured_backends(&self) -> Vec<String> {
        self.backends.keys().cloned().collect()
    }

    /// Names of registered backends that report themselves available, sorted
    pub fn available_backends(&self) -> Vec<String> {
        self.backends
            .iter()
            .filter(|(_, backend)| backend.is_available())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Search with the primary, then each fallback until one succeeds
    ///
    /// Returns the results together with the name of the backend that
    /// produced them. An empty result list counts as success.
    pub async fn search(
        &self,
        options: &SearchOptions,
    ) -> Result<(Vec<SearchResult>, String), DispatchError> {
        let primary = self.primary.as_deref().ok_or(DispatchError::NoPrimary)?;
        let backend = self.lookup(primary)?;

        let mut attempts = Vec::new();

        tracing::debug!(backend = primary, query = %options.query, "trying primary backend");
        match backend.search(options).await {
            Ok(results) => return Ok((results, primary.to_string())),
            Err(err) => {
                tracing::warn!(backend = primary, kind = %err.kind, error = %err, "primary backend failed");
                attempts.push(FailedAttempt::Failed(err));
            }
        }

        for name in &self.fallbacks {
            let backend = self.lookup(name)?;

            if !backend.is_available() {
                tracing::debug!(backend = %name, "skipping unconfigured fallback");
                attempts.push(FailedAttempt::NotConfigured(name.clone()));
                continue;
            }

            tracing::debug!(backend = %name, "trying fallback backend");
            match backend.search(options).await {
                Ok(results) => {
                    tracing::info!(backend = %name, result_count = results.len(), "fallback backend succeeded");
                    return Ok((results, name.clone()));
                }
                Err(err) => {
                    tracing::warn!(backend = %name, kind = %err.kind, error = %err, "fallback backend failed");
                    attempts.push(FailedAttempt::Failed(err));
                }
            }
        }

        Err(DispatchError::AllFailed(attempts))
    }

    /// Search with exactly one backend, bypassing primary and fallbacks
    pub async fn search_explicit(
        &self,
        name: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, DispatchError> {
        let backend = self.lookup(name)?;

        if !backend.is_available() {
            return Err(DispatchError::NotConfigured(name.to_string()));
        }

        tracing::debug!(backend = name, query = %options.query, "explicit backend search");
        Ok(backend.search(options).await?)
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn SearchBackend>, DispatchError> {
        self.get_backend(name)
            .ok_or_else(|| self.unknown(name))
    }

    fn ensure_known(&self, name: &str) -> Result<(), DispatchError> {
        if self.backends.contains_key(name) {
            Ok(())
        } else {
            Err(self.unknown(name))
        }
    }

    fn unknown(&self, name: &str) -> DispatchError {
        DispatchError::UnknownBackend {
            name: name.to_string(),
            available: self.configured_backends().join(", "),
        }
    }
}

impl std::fmt::Debug for BackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendManager")
            .field("backends", &self.configured_backends())
            .field("primary", &self.primary)
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}
