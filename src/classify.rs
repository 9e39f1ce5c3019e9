//! Grouping and filtering of gist files
//!
//! The classifier walks the fetched listing in response order, derives each
//! gist's group key from its first file, applies the filter criteria per
//! file, optionally downloads the retained files' content, and (during
//! import) drives the output writer as it goes.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::events::CrawlObserver;
use crate::filter::FilterCriteria;
use crate::github::GistFetcher;
use crate::model::{Gist, GistFile};
use crate::writer::OutputWriter;

/// Groups files across all gists into named buckets
pub struct Classifier<'a> {
    criteria: &'a FilterCriteria,
    fetcher: &'a dyn GistFetcher,
    observer: &'a dyn CrawlObserver,
}

impl<'a> Classifier<'a> {
    pub fn new(
        criteria: &'a FilterCriteria,
        fetcher: &'a dyn GistFetcher,
        observer: &'a dyn CrawlObserver,
    ) -> Self {
        Self {
            criteria,
            fetcher,
            observer,
        }
    }

    /// Classify `gists` into group-keyed buckets of retained files.
    ///
    /// The group key is derived from the first file of each gist before any
    /// filtering happens, so a bucket can be named after a file that never
    /// appears in it. Gists with no files are skipped, and gists whose
    /// files all fail the filter contribute no bucket at all.
    ///
    /// With `fetch_content` set, each retained file's content is downloaded
    /// before the file is recorded; with a writer supplied, each retained
    /// file is persisted immediately after its download notification, and a
    /// write failure is logged without aborting the run.
    pub async fn run(
        &self,
        gists: &[Gist],
        fetch_content: bool,
        mut writer: Option<&mut OutputWriter<'_>>,
    ) -> IndexMap<String, Vec<GistFile>> {
        let mut groups: IndexMap<String, Vec<GistFile>> = IndexMap::new();
        let mut retained = 0usize;

        for gist in gists {
            let Some(group_key) = gist.group_key() else {
                debug!("Skipping gist with no files");
                continue;
            };

            for file in gist.files.values() {
                if !self.criteria.matches(file) {
                    debug!("Filtered out: {}", file.filename);
                    continue;
                }

                let mut file = file.clone();
                file.group_key = Some(group_key.clone());

                if fetch_content {
                    file.content = Some(self.fetcher.fetch_raw(&file.raw_url).await);
                }

                retained += 1;
                self.observer.on_file_downloaded(&file, retained);

                if let Some(writer) = writer.as_deref_mut() {
                    if let Err(e) = writer.persist(&file) {
                        warn!("Failed to persist {}: {:#}", file.filename, e);
                    }
                }

                groups.entry(group_key.clone()).or_default().push(file);
            }
        }

        groups
    }
}
