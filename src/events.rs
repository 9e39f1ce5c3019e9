//! Lifecycle notification points
//!
//! The crawler reports progress through a `CrawlObserver` rather than
//! printing directly, so the CLI, logging, and tests can each attach their
//! own subscriber. Notifications are invoked synchronously, in documented
//! order, and their return values are never consumed.

use std::path::Path;

use tracing::{debug, info};

use crate::crawler::Mode;
use crate::filter::FilterCriteria;
use crate::model::GistFile;

/// Subscriber for crawler lifecycle events.
///
/// All methods default to no-ops, so an implementation only overrides the
/// events it cares about. Call order for an import run:
/// `on_initialize`, `on_fetched`, then per retained file
/// `on_file_downloaded` (with a strictly increasing, gap-free running
/// count), `on_directory_created` (at most once, the first time a directory
/// is created for the run), `on_file_written`, and finally `on_executed`.
pub trait CrawlObserver: Send + Sync {
    /// A run context accepted a username and criteria
    fn on_initialize(&self, _username: &str, _criteria: &FilterCriteria) {}

    /// The listing endpoint responded (raw body, before parsing)
    fn on_fetched(&self, _raw_response: &str) {}

    /// A file passed the filter and its content fetch completed
    fn on_file_downloaded(&self, _file: &GistFile, _count: usize) {}

    /// The output directory was created for this run
    fn on_directory_created(&self, _path: &Path) {}

    /// A file was persisted into its group directory
    fn on_file_written(&self, _file: &GistFile, _directory: &Path) {}

    /// An execute call finished
    fn on_executed(&self, _mode: Mode) {}
}

/// The absent subscriber
pub struct NullObserver;

impl CrawlObserver for NullObserver {}

/// Routes lifecycle events through `tracing`
pub struct LogObserver;

impl CrawlObserver for LogObserver {
    fn on_initialize(&self, username: &str, criteria: &FilterCriteria) {
        info!("Initialized crawl for user: {} ({:?})", username, criteria);
    }

    fn on_fetched(&self, raw_response: &str) {
        debug!("Fetched gist listing ({} bytes)", raw_response.len());
    }

    fn on_file_downloaded(&self, file: &GistFile, count: usize) {
        info!("Downloaded {} ({} retained so far)", file.filename, count);
    }

    fn on_directory_created(&self, path: &Path) {
        info!("Created output directory: {}", path.display());
    }

    fn on_file_written(&self, file: &GistFile, directory: &Path) {
        debug!("Wrote {} into {}", file.filename, directory.display());
    }

    fn on_executed(&self, mode: Mode) {
        info!("Execution finished: {:?}", mode);
    }
}
