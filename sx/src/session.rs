//! Search session: one query, its filters and the results fetched so far
//!
//! Results are fetched a page at a time and accumulated, so paging forward
//! in the interactive loop only hits the network when the buffer runs out.

use sx_search::{BackendManager, DispatchError, SearchOptions, SearchResult, TimeRange};

pub struct Session<'a> {
    manager: &'a BackendManager,
    options: SearchOptions,
    /// Backend to use exclusively, bypassing fallback
    pinned: Option<String>,
    results: Vec<SearchResult>,
    start_at: usize,
    exhausted: bool,
    used_backend: Option<String>,
}

impl<'a> Session<'a> {
    pub fn new(manager: &'a BackendManager, options: SearchOptions) -> Self {
        Self {
            manager,
            options,
            pinned: None,
            results: Vec::new(),
            start_at: 0,
            exhausted: false,
            used_backend: None,
        }
    }

    /// Send every request of this session to one backend only
    pub fn pinned(mut self, backend: Option<String>) -> Self {
        self.pinned = backend;
        self
    }

    /// Fetch pages until `start_at + count` results are buffered or the
    /// backend runs dry
    ///
    /// With `count == 0` at most one page is fetched, and only when nothing
    /// has been fetched yet. Returns the number of buffered results.
    pub async fn ensure_results(
        &mut self,
        start_at: usize,
        count: usize,
    ) -> Result<usize, DispatchError> {
        if count == 0 {
            if self.results.is_empty() && !self.exhausted {
                self.fetch_page().await?;
            }
            return Ok(self.results.len());
        }

        let wanted = start_at.saturating_add(count);
        while self.results.len() < wanted && !self.exhausted {
            self.fetch_page().await?;
        }

        Ok(self.results.len())
    }

    async fn fetch_page(&mut self) -> Result<(), DispatchError> {
        tracing::debug!(
            query = %self.options.query,
            page = self.options.page_no,
            buffered = self.results.len(),
            "fetching page"
        );

        let (page, backend) = match &self.pinned {
            Some(name) => (
                self.manager.search_explicit(name, &self.options).await?,
                name.clone(),
            ),
            None => self.manager.search(&self.options).await?,
        };

        if self.used_backend.is_none() {
            self.used_backend = Some(backend);
        }

        if page.is_empty() {
            tracing::debug!(page = self.options.page_no, "empty page, no more results");
            self.exhausted = true;
            return Ok(());
        }

        self.results.extend(page);
        self.options.page_no += 1;
        Ok(())
    }

    /// Replace the query; everything fetched so far is dropped
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.options.query = query.into();
        self.reset();
    }

    pub fn set_time_range(&mut self, time_range: Option<TimeRange>) {
        self.options.time_range = time_range;
        self.reset();
    }

    pub fn set_site(&mut self, site: Option<String>) {
        self.options.site = site;
        self.reset();
    }

    /// Forget fetched results and start again from page 1
    pub fn reset(&mut self) {
        self.results.clear();
        self.options.page_no = 1;
        self.start_at = 0;
        self.exhausted = false;
        self.used_backend = None;
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    /// The results shown at the current offset; `count == 0` means all of
    /// them
    pub fn window(&self, count: usize) -> &[SearchResult] {
        let start = self.start_at.min(self.results.len());
        let end = if count == 0 {
            self.results.len()
        } else {
            start.saturating_add(count).min(self.results.len())
        };
        &self.results[start..end]
    }

    /// 1-based result lookup
    pub fn result(&self, index: usize) -> Option<&SearchResult> {
        index.checked_sub(1).and_then(|i| self.results.get(i))
    }

    /// Page number the next fetch will request
    pub fn page_no(&self) -> u32 {
        self.options.page_no
    }

    pub fn start_at(&self) -> usize {
        self.start_at
    }

    pub fn set_start_at(&mut self, start_at: usize) {
        self.start_at = start_at;
    }

    pub fn query(&self) -> &str {
        &self.options.query
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Backend that answered the first request for the current query
    pub fn used_backend(&self) -> Option<&str> {
        self.used_backend.as_deref()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}
