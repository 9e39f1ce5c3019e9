//! Crawl orchestration
//!
//! `GistCrawler` is the run context for one fetch/execute cycle: it owns
//! the run state machine, performs the single listing call, and drives the
//! classifier and writer. One context serves at most one run; a second
//! `initialize` on the same context is rejected without touching state.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::config::Config;
use crate::events::{CrawlObserver, LogObserver};
use crate::filter::FilterCriteria;
use crate::github::{GistFetcher, HttpGistClient};
use crate::model::Gist;
use crate::writer::OutputWriter;

/// What an `execute` call does with the fetched listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Emit the unfiltered listing as pretty-printed JSON on stdout
    Raw,
    /// Filter, group, download and persist files to disk
    Import,
}

/// Lifecycle of a run context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Uninitialized,
    Fetched,
    Executed,
}

/// Run context owning the fetch → filter → classify → download → write
/// pipeline for a single user.
pub struct GistCrawler {
    config: Config,
    fetcher: Box<dyn GistFetcher>,
    observer: Box<dyn CrawlObserver>,
    state: RunState,
    username: String,
    output_root: PathBuf,
    criteria: FilterCriteria,
    data: Option<Vec<Gist>>,
}

impl GistCrawler {
    /// Create a crawler against the live API, logging lifecycle events
    /// through `tracing`
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Box::new(HttpGistClient::new(&config)?);
        Ok(Self::with_parts(config, fetcher, Box::new(LogObserver)))
    }

    /// Create a crawler from explicit collaborators (used by the CLI to
    /// attach its console observer, and by tests to stub the network)
    pub fn with_parts(
        config: Config,
        fetcher: Box<dyn GistFetcher>,
        observer: Box<dyn CrawlObserver>,
    ) -> Self {
        Self {
            config,
            fetcher,
            observer,
            state: RunState::Uninitialized,
            username: String::new(),
            output_root: PathBuf::new(),
            criteria: FilterCriteria::default(),
            data: None,
        }
    }

    /// Record the username and criteria, perform the single listing call,
    /// and move to the fetched state.
    ///
    /// Returns `false` without touching any state when the context has
    /// already been initialized; treat that as a logic error in the
    /// caller, not a runtime fault. A listing failure is not an error
    /// here: the run continues with an empty (network failure) or absent
    /// (unparseable body) listing.
    pub async fn initialize(&mut self, username: &str, criteria: FilterCriteria) -> bool {
        if self.state != RunState::Uninitialized {
            warn!("Run context already initialized, rejecting initialize call");
            return false;
        }

        self.observer.on_initialize(username, &criteria);

        self.username = username.to_string();
        self.output_root = Path::new(&self.config.output_directory).join(username);
        self.criteria = criteria;
        self.data = self.fetch_listing(username).await;
        self.state = RunState::Fetched;

        info!(
            "Fetched listing for {}: {} gists",
            self.username,
            self.data.as_ref().map_or(0, Vec::len)
        );

        true
    }

    /// Run the requested mode against the fetched listing.
    ///
    /// Valid exactly once, after a successful `initialize`; returns `false`
    /// otherwise. Per-file download and write failures are logged and do
    /// not abort the run.
    pub async fn execute(&mut self, mode: Mode) -> bool {
        if self.state != RunState::Fetched {
            warn!("Execute called in state {:?}, rejecting", self.state);
            return false;
        }

        match mode {
            Mode::Raw => {
                let stdout = std::io::stdout();
                if let Err(e) = self.dump_raw(stdout.lock()) {
                    warn!("Failed to emit raw listing: {:#}", e);
                }
            }
            Mode::Import => {
                let observer = self.observer.as_ref();
                let classifier = Classifier::new(&self.criteria, self.fetcher.as_ref(), observer);
                let mut writer = OutputWriter::new(self.output_root.clone(), observer);

                if let Some(gists) = self.data.as_deref() {
                    let groups = classifier.run(gists, true, Some(&mut writer)).await;
                    debug!("Import produced {} group(s)", groups.len());
                }
            }
        }

        self.observer.on_executed(mode);
        self.state = RunState::Executed;

        true
    }

    /// Serialize the fetched listing as pretty-printed JSON.
    ///
    /// An absent listing (unparseable response body) emits the literal
    /// `null`; a listing that fetched as empty emits `[]`.
    pub fn dump_raw<W: Write>(&self, mut out: W) -> Result<()> {
        match &self.data {
            Some(gists) => serde_json::to_writer_pretty(&mut out, gists)
                .context("Failed to serialize gist listing")?,
            None => out
                .write_all(b"null")
                .context("Failed to write raw listing")?,
        }
        out.write_all(b"\n")
            .context("Failed to write raw listing")?;
        Ok(())
    }

    /// Whether `initialize` has already been accepted
    pub fn is_initialized(&self) -> bool {
        self.state != RunState::Uninitialized
    }

    /// The fetched listing, if any
    pub fn data(&self) -> Option<&[Gist]> {
        self.data.as_deref()
    }

    /// The directory this run writes under (`<output root>/<username>/`)
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    async fn fetch_listing(&self, username: &str) -> Option<Vec<Gist>> {
        let body = match self.fetcher.list_gists(username).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Listing fetch failed, continuing with empty listing: {:#}", e);
                return Some(Vec::new());
            }
        };

        self.observer.on_fetched(&body);

        match serde_json::from_str(&body) {
            Ok(gists) => Some(gists),
            Err(e) => {
                warn!("Listing body is not parseable JSON: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullObserver;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use tempfile::TempDir;

    const LISTING: &str = r#"[
        {
            "id": "g1",
            "files": {
                "main.py": {
                    "filename": "main.py",
                    "type": "application/x-python",
                    "language": "Python",
                    "raw_url": "https://gist.example/raw/main.py",
                    "size": 120
                }
            }
        }
    ]"#;

    struct StubFetcher {
        listing: Result<String, String>,
    }

    impl StubFetcher {
        fn ok(listing: &str) -> Self {
            Self {
                listing: Ok(listing.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                listing: Err("connection refused".to_string()),
            }
        }
    }

    #[async_trait]
    impl GistFetcher for StubFetcher {
        async fn list_gists(&self, _username: &str) -> Result<String> {
            self.listing.clone().map_err(|e| anyhow!(e))
        }

        async fn fetch_raw(&self, url: &str) -> Vec<u8> {
            format!("content of {}", url).into_bytes()
        }
    }

    fn crawler(listing: StubFetcher, output_directory: &str) -> GistCrawler {
        let mut config = Config::default();
        config.output_directory = output_directory.to_string();
        GistCrawler::with_parts(config, Box::new(listing), Box::new(NullObserver))
    }

    #[tokio::test]
    async fn test_initialize_is_at_most_once() {
        let mut crawler = crawler(StubFetcher::ok(LISTING), "out");

        assert!(crawler.initialize("alice", FilterCriteria::default()).await);
        assert!(crawler.is_initialized());
        assert_eq!(crawler.data().unwrap().len(), 1);

        // Second call is rejected and leaves the fetched data untouched
        assert!(!crawler.initialize("bob", FilterCriteria::default()).await);
        assert_eq!(crawler.data().unwrap().len(), 1);
        assert_eq!(crawler.output_root(), Path::new("out").join("alice"));
    }

    #[tokio::test]
    async fn test_execute_requires_fetched_state() {
        let mut crawler = crawler(StubFetcher::ok(LISTING), "out");
        assert!(!crawler.execute(Mode::Import).await);

        crawler.initialize("alice", FilterCriteria::default()).await;
        let temp = TempDir::new().unwrap();
        crawler.output_root = temp.path().join("alice");

        assert!(crawler.execute(Mode::Import).await);
        // The run context is single-shot
        assert!(!crawler.execute(Mode::Import).await);
    }

    #[tokio::test]
    async fn test_network_failure_degrades_to_empty_listing() {
        let mut crawler = crawler(StubFetcher::failing(), "out");

        assert!(crawler.initialize("alice", FilterCriteria::default()).await);
        assert_eq!(crawler.data().unwrap().len(), 0);

        let mut out = Vec::new();
        crawler.dump_raw(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "[]");
    }

    #[tokio::test]
    async fn test_unparseable_listing_dumps_null() {
        let mut crawler = crawler(StubFetcher::ok("<html>rate limited</html>"), "out");

        assert!(crawler.initialize("alice", FilterCriteria::default()).await);
        assert!(crawler.data().is_none());

        let mut out = Vec::new();
        crawler.dump_raw(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "null");
    }

    #[tokio::test]
    async fn test_raw_round_trip_preserves_structure() {
        let mut crawler = crawler(StubFetcher::ok(LISTING), "out");
        crawler.initialize("alice", FilterCriteria::default()).await;

        let mut out = Vec::new();
        crawler.dump_raw(&mut out).unwrap();

        let reparsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let original: serde_json::Value = serde_json::from_str(LISTING).unwrap();
        assert_eq!(reparsed, original);
    }

    #[tokio::test]
    async fn test_import_writes_output_tree() {
        let temp = TempDir::new().unwrap();
        let out_dir = temp.path().join("out");
        let mut crawler = crawler(StubFetcher::ok(LISTING), out_dir.to_str().unwrap());

        crawler.initialize("alice", FilterCriteria::default()).await;
        assert!(crawler.execute(Mode::Import).await);

        let written = out_dir.join("alice").join("main").join("main.py");
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("content of "));
    }
}
