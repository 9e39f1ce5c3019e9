//! Wire-level value types for the gist listing API
//!
//! A listing response is a JSON array of gist objects, each carrying a
//! `files` object keyed by filename. Only the fields the pipeline acts on
//! are typed; everything else is retained in an `extra` map so raw mode can
//! reproduce the full response.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One file inside a gist, as declared by the listing response.
///
/// `content` is never part of the listing; it is populated by exactly one
/// raw-content fetch after the file has passed filtering. `group_key` is the
/// classifier's tag linking the file back to its bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    /// File name, including extension if present
    #[serde(default)]
    pub filename: String,

    /// MIME type, e.g. "application/x-python" (empty if absent)
    #[serde(rename = "type", default)]
    pub mime_type: String,

    /// Programming or scripting language label (null for plain files)
    #[serde(default)]
    pub language: Option<String>,

    /// Location of the raw file content (empty if unknown)
    #[serde(default)]
    pub raw_url: String,

    /// Declared size in bytes
    #[serde(default)]
    pub size: u64,

    /// Raw content, present only after a fetch
    #[serde(skip)]
    pub content: Option<Vec<u8>>,

    /// Group this file was classified into
    #[serde(skip)]
    pub group_key: Option<String>,

    /// Listing fields the pipeline does not act on, kept for raw output
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl GistFile {
    /// Language label with the null default applied
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("")
    }

    /// Bytes to persist: the fetched content, or the literal `null`
    /// placeholder when the content is absent or the fetch came back empty
    pub fn content_or_placeholder(&self) -> &[u8] {
        match &self.content {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => b"null",
        }
    }
}

/// One gist: an insertion-ordered mapping of filename to file record.
///
/// Order matters because the first file in the mapping names the group all
/// of the gist's retained files are written under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gist {
    #[serde(default)]
    pub files: IndexMap<String, GistFile>,

    /// Listing fields the pipeline does not act on, kept for raw output
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Gist {
    /// Derive the group key for this gist: the first file's name up to its
    /// first `.`, or the whole name when there is no `.`.
    ///
    /// The key is taken from the first file regardless of whether that file
    /// later passes filtering. Returns `None` for a gist with no files,
    /// which is skipped entirely during classification.
    pub fn group_key(&self) -> Option<String> {
        let first = self.files.values().next()?;
        let stem = first.filename.split('.').next().unwrap_or(&first.filename);
        Some(stem.to_string())
    }
}
