//! Classification and update planning for a single banner document.
//!
//! A banner carries up to three string fields describing its image:
//! `image` (data URI or external URL), `image_file_path` (relative to the
//! uploads root) and `image_filename` (legacy value). Planning picks the
//! first usable candidate, classifies it, and produces the canonical
//! triple; classification never fails, it only yields "no plan".

use mongodb::bson::{Bson, Document};
use std::fmt;

use crate::uploads::{normalize_separators, UploadsRoot};

/// Candidate fields, in precedence order.
pub const FIELDS: [&str; 3] = ["image", "image_file_path", "image_filename"];

/// Why a candidate value was classified the way it was.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    DataUri,
    ExternalUrl,
    PathExists,
    FoundByName,
    UnknownPath,
    NotFound,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reason::DataUri => "data-uri",
            Reason::ExternalUrl => "external-url",
            Reason::PathExists => "path-exists",
            Reason::FoundByName => "found-by-name",
            Reason::UnknownPath => "unknown-path",
            Reason::NotFound => "not-found",
        })
    }
}

/// Canonical field values chosen for a document. At most one of `image`
/// and `image_file_path` is set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
    pub reason: Reason,
    pub image: Option<String>,
    pub image_file_path: Option<String>,
    pub image_filename: Option<String>,
}

impl Plan {
    /// Value kept verbatim in `image` (data URI or external URL).
    fn embedded(reason: Reason, value: &str) -> Self {
        Self {
            reason,
            image: Some(value.to_string()),
            image_file_path: None,
            image_filename: Some(value.to_string()),
        }
    }

    /// File located under the uploads root at `rel`.
    fn located(reason: Reason, rel: String) -> Self {
        Self {
            reason,
            image: None,
            image_file_path: Some(rel.clone()),
            image_filename: Some(rel),
        }
    }

    /// Nothing on disk matched; keep the raw value as legacy filename.
    fn legacy(reason: Reason, value: &str) -> Self {
        Self {
            reason,
            image: None,
            image_file_path: None,
            image_filename: Some(value.to_string()),
        }
    }
}

/// Pick the first non-empty string among the candidate fields. Non-string
/// BSON values are skipped, not errors.
fn candidate(doc: &Document) -> Option<&str> {
    FIELDS.iter().find_map(|key| match doc.get(key) {
        Some(Bson::String(s)) if !s.trim().is_empty() => Some(s.trim()),
        _ => None,
    })
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

fn final_component(s: &str) -> &str {
    s.rsplit(['/', '\\']).next().unwrap_or(s)
}

/// Classify a document's image reference and produce the canonical field
/// triple, or `None` when no candidate field holds a usable string.
pub fn plan_update(doc: &Document, uploads: &UploadsRoot) -> Option<Plan> {
    let value = candidate(doc)?;

    if value.starts_with("data:") {
        return Some(Plan::embedded(Reason::DataUri, value));
    }

    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(Plan::embedded(Reason::ExternalUrl, value));
    }

    if has_separator(value) {
        if uploads.contains(value) {
            return Some(Plan::located(
                Reason::PathExists,
                normalize_separators(value),
            ));
        }
        if let Some(rel) = uploads.find_by_name(final_component(value)) {
            return Some(Plan::located(Reason::FoundByName, rel));
        }
        return Some(Plan::legacy(Reason::UnknownPath, value));
    }

    match uploads.find_by_name(value) {
        Some(rel) => Some(Plan::located(Reason::FoundByName, rel)),
        None => Some(Plan::legacy(Reason::NotFound, value)),
    }
}

/// Compute the `$set` document needed to move `doc` to the planned
/// values. Absent, `null`, and empty-string fields count as already
/// cleared; only differing keys are included.
pub fn diff(doc: &Document, plan: &Plan) -> Document {
    let planned = [
        ("image", plan.image.as_deref()),
        ("image_file_path", plan.image_file_path.as_deref()),
        ("image_filename", plan.image_filename.as_deref()),
    ];

    let mut set = Document::new();
    for (key, target) in planned {
        let current = doc.get(key);
        let unchanged = match target {
            None => is_cleared(current),
            Some(value) => matches!(current, Some(Bson::String(s)) if s == value),
        };
        if !unchanged {
            set.insert(key, target.map_or(Bson::Null, |v| Bson::String(v.to_string())));
        }
    }
    set
}

fn is_cleared(value: Option<&Bson>) -> bool {
    match value {
        None | Some(Bson::Null) => true,
        Some(Bson::String(s)) => s.is_empty(),
        _ => false,
    }
}
