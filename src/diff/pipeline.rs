// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Resolve and compare every changed project.

use futures_util::future::try_join;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info};

use super::compare::{Comparator, Comparison, RefLister};
use super::refmap::{RefMap, Resolver, RevisionId};
use super::{CommitRecord, Direction};
use crate::error::RepoResult;
use crate::manifest::diff::{ProjectPair, ProjectsDiff};

/// Knobs for [`collect_deltas`].
#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Projects examined concurrently.
    pub jobs: usize,
    /// Accept full commit ids without a ref lookup.
    pub accept_commit_ids: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            jobs: 4,
            accept_commit_ids: true,
        }
    }
}

/// Both directions of one changed project.
#[derive(Debug, Clone)]
pub struct ProjectDelta {
    pub pair: ProjectPair,
    pub from_id: RevisionId,
    pub to_id: RevisionId,
    /// Commits of the new revision missing from the old one.
    pub forward: Comparison,
    /// Commits of the old revision missing from the new one.
    pub backward: Comparison,
    /// Browser URL of the new-side project; empty for local sources.
    pub web_url: String,
}

impl ProjectDelta {
    /// Whether either direction reports a difference.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.forward.has_changes || self.backward.has_changes
    }
}

/// The project diff after revision resolution, with one delta per entry
/// of `diff.changed`, in the same order.
#[derive(Debug, Clone, Default)]
pub struct DiffReport {
    pub diff: ProjectsDiff,
    pub deltas: Vec<ProjectDelta>,
}

enum Outcome {
    Delta(Box<ProjectDelta>),
    Unreachable(ProjectPair),
}

/// Resolve both revisions of every changed pair and compare them.
///
/// Pairs whose revisions cannot both be resolved move to `unreachable`
/// without any compare call. Any lister or comparator error aborts the
/// whole collection.
///
/// # Errors
///
/// Returns the first error reported by `lister` or `comparator`.
pub async fn collect_deltas<L, C>(
    mut diff: ProjectsDiff,
    lister: &L,
    comparator: &C,
    options: CollectOptions,
) -> RepoResult<DiffReport>
where
    L: RefLister,
    C: Comparator,
{
    let resolver = Resolver::new(options.accept_commit_ids);
    let changed = std::mem::take(&mut diff.changed);
    info!(projects = changed.len(), jobs = options.jobs, "comparing changed projects");

    let outcomes: Vec<Outcome> = stream::iter(changed)
        .map(|pair| examine(pair, lister, comparator, resolver))
        .buffered(options.jobs.max(1))
        .try_collect()
        .await?;

    let mut deltas = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Outcome::Delta(delta) => {
                diff.changed.push(delta.pair.clone());
                deltas.push(*delta);
            }
            Outcome::Unreachable(pair) => diff.unreachable.push(pair),
        }
    }

    Ok(DiffReport { diff, deltas })
}

async fn examine<L, C>(
    pair: ProjectPair,
    lister: &L,
    comparator: &C,
    resolver: Resolver,
) -> RepoResult<Outcome>
where
    L: RefLister,
    C: Comparator,
{
    let (from_refs, to_refs) =
        try_join(lister.list_refs(&pair.from), lister.list_refs(&pair.to)).await?;

    let from_id = resolver.resolve(&pair.from.revision, &from_refs.refs);
    let to_id = resolver.resolve(&pair.to.revision, &to_refs.refs);
    let (Some(from_id), Some(to_id)) = (from_id, to_id) else {
        debug!(
            path = %pair.from.path,
            from = %pair.from.revision,
            to = %pair.to.revision,
            "revision not found"
        );
        return Ok(Outcome::Unreachable(pair));
    };

    let forward = comparator
        .compare(&pair.from, &from_id, &to_id)
        .await
        .inspect_err(|_| report_compare_failure(&pair, &from_refs.refs, &from_id, &to_id))?;
    let backward = comparator
        .compare(&pair.from, &to_id, &from_id)
        .await
        .inspect_err(|_| report_compare_failure(&pair, &to_refs.refs, &to_id, &from_id))?;

    debug!(
        path = %pair.from.path,
        added = forward.commits.len(),
        removed = backward.commits.len(),
        "compared"
    );

    Ok(Outcome::Delta(Box::new(ProjectDelta {
        forward: directed(forward, Direction::Added),
        backward: directed(backward, Direction::Removed),
        from_id,
        to_id,
        web_url: to_refs.web_url,
        pair,
    })))
}

fn directed(mut comparison: Comparison, direction: Direction) -> Comparison {
    comparison.commits = comparison
        .commits
        .into_iter()
        .map(|c: CommitRecord| c.with_direction(direction))
        .collect();
    comparison
}

fn report_compare_failure(pair: &ProjectPair, refs: &RefMap, from: &RevisionId, to: &RevisionId) {
    error!(
        from_project = %pair.from.name,
        to_project = %pair.to.name,
        refs = ?refs,
        "compare {from} vs {to} failed"
    );
}
