//! Output tree persistence
//!
//! Writes classified files under `out/<username>/<group>/<filename>`.
//! Directory creation is check-then-create and idempotent within a run, and
//! every filesystem failure here is non-fatal: the caller logs it and moves
//! on to the next file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::events::CrawlObserver;
use crate::model::GistFile;

/// Persists classified files into the per-user output tree
pub struct OutputWriter<'a> {
    user_dir: PathBuf,
    dir_notified: bool,
    observer: &'a dyn CrawlObserver,
}

impl<'a> OutputWriter<'a> {
    /// Create a writer rooted at the run's user directory
    /// (`<output root>/<username>/`). Nothing is created until the first
    /// `persist` call.
    pub fn new(user_dir: PathBuf, observer: &'a dyn CrawlObserver) -> Self {
        Self {
            user_dir,
            dir_notified: false,
            observer,
        }
    }

    /// The directory all of this run's groups are written under
    pub fn user_dir(&self) -> &Path {
        &self.user_dir
    }

    fn ensure_user_dir(&mut self) -> Result<()> {
        if !self.user_dir.is_dir() {
            fs::create_dir_all(&self.user_dir)
                .with_context(|| format!("Failed to create output directory: {:?}", self.user_dir))?;

            // One notification per run, the first time a directory is created
            if !self.dir_notified {
                self.observer.on_directory_created(&self.user_dir);
                self.dir_notified = true;
            }
        }
        Ok(())
    }

    /// Write `file` into its group directory, creating directories as
    /// needed and truncating any existing file of the same name. Content is
    /// the fetched bytes, or the literal `"null"` placeholder when the
    /// fetch failed or never happened.
    pub fn persist(&mut self, file: &GistFile) -> Result<PathBuf> {
        self.ensure_user_dir()?;

        let group_dir = self.user_dir.join(file.group_key.as_deref().unwrap_or(""));
        if !group_dir.is_dir() {
            fs::create_dir_all(&group_dir)
                .with_context(|| format!("Failed to create group directory: {:?}", group_dir))?;
        }

        let path = group_dir.join(&file.filename);
        fs::write(&path, file.content_or_placeholder())
            .with_context(|| format!("Failed to write file: {:?}", path))?;

        self.observer.on_file_written(file, &group_dir);

        Ok(path)
    }
}
