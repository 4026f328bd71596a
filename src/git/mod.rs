// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Local git repositories as a commit source.
//!
//! ```text
//!              LocalGitSource { root, pretty_format }
//!               |                          |
//!               v                          v
//!        RefLister::list_refs      Comparator::compare
//!        refs::parse_for_each_ref  log::parse_log
//!               \                          /
//!                v                        v
//!         ShellBackend::git_output (tokio::process)
//!
//!   GixBackend::worktree_exists  ──► missing-project probe
//! ```

pub mod backend;
pub mod log;
pub mod refs;


use std::path::{Path, PathBuf};

use tracing::trace;

use crate::diff::{Comparator, Comparison, RefListing, RefLister, RevisionId};
use crate::error::RepoResult;
use crate::manifest::Project;

use backend::{GixBackend, ShellBackend};

/// Reads refs and history from the worktrees of a repo checkout.
#[derive(Debug, Clone)]
pub struct LocalGitSource {
    root: PathBuf,
    pretty_format: Option<String>,
}

impl LocalGitSource {
    /// `root` is the checkout top; project paths are relative to it.
    #[must_use]
    pub const fn new(root: PathBuf, pretty_format: Option<String>) -> Self {
        Self {
            root,
            pretty_format,
        }
    }

    /// Absolute worktree of a project.
    #[must_use]
    pub fn worktree(&self, project: &Project) -> PathBuf {
        self.root.join(&project.path)
    }

    /// Whether the project has been synced into the checkout.
    #[must_use]
    pub fn exists(&self, project: &Project) -> bool {
        GixBackend::worktree_exists(&self.worktree(project))
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RefLister for LocalGitSource {
    async fn list_refs(&self, project: &Project) -> RepoResult<RefListing> {
        let dir = self.worktree(project);
        let output = ShellBackend::git_output(
            &[
                "for-each-ref",
                refs::FOR_EACH_REF_FORMAT,
                "refs/heads",
                "refs/remotes",
                "refs/tags",
            ],
            &dir,
        )
        .await?;
        let refs = refs::parse_for_each_ref(&output);
        trace!(path = %project.path, refs = refs.len(), "listed local refs");
        Ok(RefListing {
            refs,
            web_url: String::new(),
        })
    }
}

impl Comparator for LocalGitSource {
    async fn compare(
        &self,
        project: &Project,
        from: &RevisionId,
        to: &RevisionId,
    ) -> RepoResult<Comparison> {
        let dir = self.worktree(project);
        let format = log::log_format(self.pretty_format.as_deref());
        let range = format!("{from}..{to}");
        let output =
            ShellBackend::git_output(&["log", "--no-color", &format, &range], &dir).await?;

        let commits = log::parse_log(
            &output,
            &project.name,
            &dir.display().to_string(),
            self.pretty_format.is_some(),
        )?;
        Ok(Comparison {
            head: commits.first().map(|c| c.created_at),
            has_changes: !commits.is_empty(),
            commits,
        })
    }
}
