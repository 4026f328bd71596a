// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Seams to the commit sources.
//!
//! ```text
//!             RefLister + Comparator
//!              |                  |
//!              v                  v
//!      git::LocalGitSource   gitlab::GitlabSource
//!      for-each-ref / log    branches+tags / compare
//! ```

use chrono::{DateTime, FixedOffset};

use super::{CommitRecord, RefMap, RevisionId};
use crate::error::RepoResult;
use crate::manifest::Project;

/// Refs of one project as seen by a commit source.
#[derive(Debug, Clone, Default)]
pub struct RefListing {
    pub refs: RefMap,
    /// Browser URL of the project; empty when the source has none.
    pub web_url: String,
}

/// Result of one directional comparison.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    /// Commits reachable from `to` but not from `from`.
    pub commits: Vec<CommitRecord>,
    /// Creation time of the newest commit of the range.
    pub head: Option<DateTime<FixedOffset>>,
    /// Whether the two revisions differ in content.
    pub has_changes: bool,
}

/// Lists the refs of a project.
#[allow(async_fn_in_trait)]
pub trait RefLister {
    /// # Errors
    ///
    /// Returns an error when the source cannot be queried.
    async fn list_refs(&self, project: &Project) -> RepoResult<RefListing>;
}

/// Computes the commits between two revisions of a project.
#[allow(async_fn_in_trait)]
pub trait Comparator {
    /// Commits in `to` that are not in `from`, attributed to `project`.
    ///
    /// # Errors
    ///
    /// Returns an error when the source rejects the comparison.
    async fn compare(
        &self,
        project: &Project,
        from: &RevisionId,
        to: &RevisionId,
    ) -> RepoResult<Comparison>;
}
