//! Per-file match policy
//!
//! A `FilterCriteria` decides, per file, whether the import pipeline keeps
//! the file. The predicate is pure and deterministic: the logical AND of a
//! type check, a language check and a size check, each of which can be
//! short-circuited by its wildcard/unlimited form.

use crate::model::GistFile;

/// One dimension of the match policy: accept anything, or accept only
/// values from a list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Wildcard: every value passes
    #[default]
    Any,
    /// Only the listed values pass (compared case-insensitively)
    OneOf(Vec<String>),
}

impl Selection {
    /// Build a selection from a user-supplied list. An empty list or a `"*"`
    /// entry means wildcard; this is the only place the null-coalescing
    /// defaults of the config/CLI boundary are applied.
    pub fn from_list(values: &[String]) -> Self {
        if values.is_empty() || values.iter().any(|v| v == "*") {
            Selection::Any
        } else {
            Selection::OneOf(values.to_vec())
        }
    }

    /// Case-insensitive membership test
    pub fn allows(&self, value: &str) -> bool {
        match self {
            Selection::Any => true,
            Selection::OneOf(values) => values.iter().any(|v| v.eq_ignore_ascii_case(value)),
        }
    }
}

/// The match policy applied to every file during import.
///
/// The default criteria pass everything; raw mode and an unconfigured
/// import both run with them.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Allowed MIME types
    pub types: Selection,

    /// Allowed language labels
    pub languages: Selection,

    /// Maximum declared size in bytes (`None` = unlimited)
    pub max_size: Option<u64>,
}

impl FilterCriteria {
    /// Whether `file` passes all three checks.
    ///
    /// Absent fields compare as the empty string / 0 and simply fail a
    /// non-wildcard comparison; there is no error condition.
    pub fn matches(&self, file: &GistFile) -> bool {
        self.types.allows(&file.mime_type)
            && self.languages.allows(file.language_or_default())
            && self.max_size.map_or(true, |max| file.size <= max)
    }
}
