//! gistcrawl - Gist fetching and importing tool
//!
//! gistcrawl retrieves a GitHub user's public gists, filters the files
//! inside them by type, language and size, groups matching files by their
//! originating gist, downloads the raw content of each retained file, and
//! persists the results under a per-user directory tree.
//!
//! ## Core Features
//!
//! - **Raw mode**: dump the unfiltered gist listing as pretty-printed JSON
//! - **Import mode**: filter, group, download and write gist files to disk
//! - **Configurable Filtering**: MIME type, language and size criteria
//! - **Configuration Management**: YAML-based configuration with XDG compliance
//! - **Lifecycle Events**: observer hooks for CLI, logging and tests
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`model`]: Gist and gist-file value types
//! - [`filter`]: Per-file match policy
//! - [`github`]: Gist API access
//! - [`classify`]: Grouping and filtering
//! - [`writer`]: Output tree persistence
//! - [`events`]: Lifecycle notifications
//! - [`crawler`]: Run orchestration

pub mod classify;
pub mod config;
pub mod crawler;
pub mod events;
pub mod filter;
pub mod github;
pub mod model;
pub mod writer;

pub use classify::Classifier;
pub use config::Config;
pub use crawler::{GistCrawler, Mode};
pub use events::{CrawlObserver, LogObserver, NullObserver};
pub use filter::{FilterCriteria, Selection};
pub use github::{GistFetcher, HttpGistClient};
pub use model::{Gist, GistFile};
pub use writer::OutputWriter;
