// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Group tree traversal.
//!
//! ```text
//! root ─┬─ p1, p2             visit order: root projects (p1 p2)
//!       ├─ sub-a ─┬─ p3                    sub-a projects (p3)
//!       │         └─ sub-c ── p4           sub-c projects (p4)
//!       └─ sub-b ── p5                     sub-b projects (p5)
//! ```
//!
//! The walk only produces the flat project list; whatever is applied to
//! each project happens afterwards.

use std::collections::HashSet;

use tracing::debug;

use super::GitlabClient;
use super::types::{GroupInfo, ProjectInfo};
use crate::error::RepoResult;

/// Read access to a group hierarchy.
#[allow(async_fn_in_trait)]
pub trait GroupSource {
    /// # Errors
    ///
    /// Returns an error if the group cannot be fetched.
    async fn group(&self, full_path: &str) -> RepoResult<GroupInfo>;

    /// Direct subgroups, in server order.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn subgroups(&self, group_id: u64) -> RepoResult<Vec<GroupInfo>>;

    /// Projects owned directly by the group.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    async fn projects(&self, group_id: u64) -> RepoResult<Vec<ProjectInfo>>;
}

impl GroupSource for GitlabClient {
    async fn group(&self, full_path: &str) -> RepoResult<GroupInfo> {
        Self::group(self, full_path).await
    }

    async fn subgroups(&self, group_id: u64) -> RepoResult<Vec<GroupInfo>> {
        Self::subgroups(self, group_id).collect_all().await
    }

    async fn projects(&self, group_id: u64) -> RepoResult<Vec<ProjectInfo>> {
        self.group_projects(group_id).collect_all().await
    }
}

/// Split a `--gitlab-groups` value on commas and whitespace.
#[must_use]
pub fn split_group_list(groups: &str) -> Vec<String> {
    groups
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|g| g.trim_matches('/'))
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every project below `roots`, depth-first, each project once.
///
/// # Errors
///
/// Returns the first error reported by `source`.
pub async fn collect_group_projects<S: GroupSource>(
    source: &S,
    roots: &[String],
) -> RepoResult<Vec<ProjectInfo>> {
    let mut seen = HashSet::new();
    let mut projects = Vec::new();

    for root in roots {
        let mut stack = vec![source.group(root).await?];
        while let Some(group) = stack.pop() {
            debug!(group = %group.full_path, "walking group");
            for project in source.projects(group.id).await? {
                if seen.insert(project.id) {
                    projects.push(project);
                }
            }
            let mut children = source.subgroups(group.id).await?;
            children.reverse();
            stack.extend(children);
        }
    }

    Ok(projects)
}
