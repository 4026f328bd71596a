// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use futures_util::future::try_join3;
use tracing::trace;

use super::GitlabClient;
use crate::diff::{Comparator, Comparison, RefListing, RefLister, RefMap, RevisionId, parse_timestamp};
use crate::error::RepoResult;
use crate::manifest::Project;

/// Refs and compare views served by GitLab.
///
/// Manifest projects are located by the path of their remote URL relative
/// to the server URL.
#[derive(Debug, Clone, Copy)]
pub struct GitlabSource<'a> {
    client: &'a GitlabClient,
}

impl<'a> GitlabSource<'a> {
    #[must_use]
    pub const fn new(client: &'a GitlabClient) -> Self {
        Self { client }
    }

    /// GitLab path of a manifest project.
    #[must_use]
    pub fn locate(&self, project: &Project) -> String {
        project.path_with_namespace(self.client.server().as_str())
    }
}

impl RefLister for GitlabSource<'_> {
    async fn list_refs(&self, project: &Project) -> RepoResult<RefListing> {
        let path = self.locate(project);
        let mut tags = self.client.tags(&path);
        let mut branches = self.client.branches(&path);
        let (info, tags, branches) = try_join3(
            self.client.project(&path),
            tags.collect_all(),
            branches.collect_all(),
        )
        .await?;

        let refs: RefMap = tags
            .into_iter()
            .map(|t| (format!("refs/tags/{}", t.name), t.commit.id))
            .chain(
                branches
                    .into_iter()
                    .map(|b| (format!("refs/heads/{}", b.name), b.commit.id)),
            )
            .collect();
        trace!(%path, refs = refs.len(), "listed gitlab refs");

        Ok(RefListing {
            refs,
            web_url: info.web_url,
        })
    }
}

impl Comparator for GitlabSource<'_> {
    async fn compare(
        &self,
        project: &Project,
        from: &RevisionId,
        to: &RevisionId,
    ) -> RepoResult<Comparison> {
        let path = self.locate(project);
        let compare = self
            .client
            .compare(&path, from.as_str(), to.as_str())
            .await?;

        let head = compare
            .commit
            .as_ref()
            .map(|c| parse_timestamp(&c.created_at))
            .transpose()?;
        let commits = compare
            .commits
            .into_iter()
            .map(|c| c.into_record(&project.name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Comparison {
            commits,
            head,
            has_changes: !compare.diffs.is_empty(),
        })
    }
}
