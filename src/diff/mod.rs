// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Revision diff pipeline.
//!
//! ```text
//!  ProjectsDiff.changed
//!        │
//!        ▼   per pair, up to `jobs` at a time, consumed in manifest order
//!  ┌───────────────┐   RefLister      ┌──────────────┐
//!  │ list refs A/B │ ───────────────► │ Resolver     │──► unresolved ──► unreachable
//!  └───────────────┘                  └──────┬───────┘
//!                                            │ RevisionId A, B
//!                                            ▼
//!                                  Comparator.compare(A, B)  forward  → Added
//!                                  Comparator.compare(B, A)  backward → Removed
//!                                            │
//!                                            ▼
//!                                  merge::merge_commits / merge::summarize
//!                                            │
//!                                            ▼
//!                                       MergedReport ──► report::*
//! ```

pub mod compare;
pub mod merge;
pub mod pipeline;
pub mod refmap;

#[cfg(test)]
mod tests;

use chrono::{DateTime, FixedOffset};

use crate::error::ReportError;

pub use compare::{Comparator, Comparison, RefListing, RefLister};
pub use merge::{MergedReport, merge_commits, summarize};
pub use pipeline::{CollectOptions, DiffReport, ProjectDelta, collect_deltas};
pub use refmap::{RefMap, Resolver, RevisionId};

/// Format used to render commit timestamps. The trailing space is part of
/// the column layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S ";

/// Fallback parse format for timestamps that are not strict RFC 3339.
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Which manifest a commit is reachable from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Reachable from the new revision only.
    Added,
    /// Reachable from the old revision only.
    Removed,
}

impl Direction {
    /// `[+]` or `[-]`.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Added => "[+]",
            Self::Removed => "[-]",
        }
    }

    /// Single-letter code used by raw output.
    #[must_use]
    pub const fn raw_code(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Removed => 'R',
        }
    }
}

/// One commit in a revision range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub id: String,
    pub short_id: String,
    /// Manifest name of the project the commit belongs to.
    pub project_name: String,
    pub author_email: String,
    pub author_name: String,
    pub committer_name: String,
    pub title: String,
    pub created_at: DateTime<FixedOffset>,
    /// Committer date as reported by the source, unparsed.
    pub committed_date: String,
    /// Link to the commit (or compare view, for summary records); empty
    /// for local repositories.
    pub web_url: String,
    pub direction: Direction,
    /// Line produced by a user-supplied git pretty format, if any.
    pub formatted: Option<String>,
}

impl CommitRecord {
    /// Copy of this record with a different direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Parse an ISO-8601 timestamp with offset.
///
/// # Errors
///
/// Returns [`ReportError::Timestamp`] if neither RFC 3339 nor
/// `%Y-%m-%dT%H:%M:%S%.f%z` matches.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, ReportError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, TIMESTAMP_PARSE_FORMAT))
        .map_err(|e| ReportError::Timestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Render a timestamp in its own offset using [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
