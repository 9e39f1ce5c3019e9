/// Common test utilities and helpers for gistcrawl tests

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use gistcrawl::{CrawlObserver, FilterCriteria, GistFetcher, GistFile, Mode};

/// Fetcher that serves a canned listing and canned raw content, so the
/// whole pipeline can run without touching the network
pub struct StubFetcher {
    listing: String,
    content: HashMap<String, Vec<u8>>,
}

impl StubFetcher {
    pub fn new(listing: &str) -> Self {
        Self {
            listing: listing.to_string(),
            content: HashMap::new(),
        }
    }

    /// Register raw content for a content URL. Unregistered URLs behave
    /// like failed fetches and come back empty.
    pub fn with_content(mut self, url: &str, bytes: &[u8]) -> Self {
        self.content.insert(url.to_string(), bytes.to_vec());
        self
    }
}

#[async_trait]
impl GistFetcher for StubFetcher {
    async fn list_gists(&self, _username: &str) -> Result<String> {
        Ok(self.listing.clone())
    }

    async fn fetch_raw(&self, url: &str) -> Vec<u8> {
        self.content.get(url).cloned().unwrap_or_default()
    }
}

/// A lifecycle event as observed by a subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Initialize(String),
    Fetched,
    Downloaded(String, usize),
    DirectoryCreated,
    Written(String),
    Executed(Mode),
}

/// Observer that records every notification in order. Clones share the
/// same event log, so a test can keep one handle and box the other.
#[derive(Default, Clone)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl CrawlObserver for RecordingObserver {
    fn on_initialize(&self, username: &str, _criteria: &FilterCriteria) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Initialize(username.to_string()));
    }

    fn on_fetched(&self, _raw_response: &str) {
        self.events.lock().unwrap().push(Event::Fetched);
    }

    fn on_file_downloaded(&self, file: &GistFile, count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Downloaded(file.filename.clone(), count));
    }

    fn on_directory_created(&self, _path: &Path) {
        self.events.lock().unwrap().push(Event::DirectoryCreated);
    }

    fn on_file_written(&self, file: &GistFile, _directory: &Path) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Written(file.filename.clone()));
    }

    fn on_executed(&self, mode: Mode) {
        self.events.lock().unwrap().push(Event::Executed(mode));
    }
}

/// Listing for the canonical two-gist scenario: one Python gist with two
/// files, one plain-text gist with a single note
pub fn alice_listing() -> String {
    r#"[
        {
            "id": "gist-a",
            "description": "python tools",
            "files": {
                "main.py": {
                    "filename": "main.py",
                    "type": "application/x-python",
                    "language": "Python",
                    "raw_url": "https://gist.example/raw/main.py",
                    "size": 120
                },
                "helper.py": {
                    "filename": "helper.py",
                    "type": "application/x-python",
                    "language": "Python",
                    "raw_url": "https://gist.example/raw/helper.py",
                    "size": 50
                }
            }
        },
        {
            "id": "gist-b",
            "description": "scratch notes",
            "files": {
                "notes.txt": {
                    "filename": "notes.txt",
                    "type": "text/plain",
                    "language": null,
                    "raw_url": "https://gist.example/raw/notes.txt",
                    "size": 10
                }
            }
        }
    ]"#
    .to_string()
}
