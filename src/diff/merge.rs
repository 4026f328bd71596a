// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit-stream merger.
//!
//! ```text
//! full:    p1.forward ++ p1.backward ++ p2.forward ++ ...  ──► stable sort by created_at
//! summary: per changed pair, one record per author email   ──► stable sort by created_at
//! ```

use std::collections::BTreeSet;

use super::compare::Comparison;
use super::pipeline::ProjectDelta;
use super::{CommitRecord, Direction};

/// Time-ordered commits of every changed project.
#[derive(Debug, Clone, Default)]
pub struct MergedReport {
    pub commits: Vec<CommitRecord>,
    /// Maximum number of commits a size-limited renderer may show.
    pub threshold: usize,
}

impl MergedReport {
    #[must_use]
    pub const fn new(commits: Vec<CommitRecord>, threshold: usize) -> Self {
        Self { commits, threshold }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.commits.len()
    }

    /// Commits within the threshold.
    #[must_use]
    pub fn visible(&self) -> &[CommitRecord] {
        &self.commits[..self.commits.len().min(self.threshold)]
    }

    /// Commits past the threshold.
    #[must_use]
    pub fn overflow(&self) -> &[CommitRecord] {
        &self.commits[self.commits.len().min(self.threshold)..]
    }
}

/// Every commit of every delta, ordered by creation time.
///
/// Commits with equal timestamps keep manifest order, forward before
/// backward.
#[must_use]
pub fn merge_commits(deltas: &[ProjectDelta]) -> Vec<CommitRecord> {
    let mut commits: Vec<CommitRecord> = deltas
        .iter()
        .flat_map(|d| d.forward.commits.iter().chain(d.backward.commits.iter()))
        .cloned()
        .collect();
    commits.sort_by_key(|c| c.created_at);
    commits
}

/// One record per distinct author email of each changed pair, linking the
/// compare view.
///
/// Pairs where neither direction has changes contribute nothing.
#[must_use]
pub fn summarize(deltas: &[ProjectDelta]) -> Vec<CommitRecord> {
    let mut records = Vec::new();

    for delta in deltas.iter().filter(|d| d.has_changes()) {
        let changed: Vec<&Comparison> = [&delta.forward, &delta.backward]
            .into_iter()
            .filter(|c| c.has_changes)
            .collect();

        let emails: BTreeSet<&str> = changed
            .iter()
            .flat_map(|c| c.commits.iter().map(|ci| ci.author_email.as_str()))
            .collect();
        let Some(head) = changed.iter().filter_map(|c| c.head).max() else {
            continue;
        };
        let compare_url = format!(
            "{}/-/compare/{}...{}",
            delta.web_url.trim_end_matches('/'),
            delta.from_id,
            delta.to_id
        );
        let direction = if delta.forward.has_changes {
            Direction::Added
        } else {
            Direction::Removed
        };

        for email in emails {
            let local_part = email.split('@').next().unwrap_or(email);
            records.push(CommitRecord {
                id: String::new(),
                short_id: String::new(),
                project_name: delta.pair.from.name.clone(),
                author_email: email.to_string(),
                author_name: format!("@{local_part}"),
                committer_name: String::new(),
                title: String::new(),
                created_at: head,
                committed_date: head.to_rfc3339(),
                web_url: compare_url.clone(),
                direction,
                formatted: None,
            });
        }
    }

    records.sort_by_key(|c| c.created_at);
    records
}
