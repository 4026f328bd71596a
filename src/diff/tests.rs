// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    CollectOptions, CommitRecord, Comparator, Comparison, Direction, MergedReport, RefListing,
    RefLister, RefMap, Resolver, RevisionId, collect_deltas, format_timestamp, merge_commits,
    parse_timestamp, summarize,
};
use crate::error::{GitlabError, RepoResult};
use crate::manifest::Project;
use crate::manifest::diff::{ProjectPair, ProjectsDiff};

const SHA_A: &str = "1111111111111111111111111111111111111111";
const SHA_B: &str = "2222222222222222222222222222222222222222";

fn project(name: &str, revision: &str) -> Project {
    Project {
        name: name.to_string(),
        path: name.to_string(),
        revision: revision.to_string(),
        remote: "origin".to_string(),
        remote_url: format!("https://git.example.com/{name}.git"),
        groups: Vec::new(),
    }
}

fn pair(name: &str, from: &str, to: &str) -> ProjectPair {
    ProjectPair {
        from: project(name, from),
        to: project(name, to),
    }
}

fn commit(id: &str, project: &str, email: &str, ts: &str) -> CommitRecord {
    CommitRecord {
        id: id.to_string(),
        short_id: id.chars().take(8).collect(),
        project_name: project.to_string(),
        author_email: email.to_string(),
        author_name: email.split('@').next().unwrap_or_default().to_string(),
        committer_name: "ci".to_string(),
        title: format!("commit {id}"),
        created_at: parse_timestamp(ts).expect("valid timestamp"),
        committed_date: ts.to_string(),
        web_url: format!("https://git.example.com/{project}/-/commit/{id}"),
        direction: Direction::Added,
        formatted: None,
    }
}

/// In-memory commit source keyed by project name and `(from, to)` ids.
#[derive(Default)]
struct FakeSource {
    refs: HashMap<String, RefMap>,
    ranges: HashMap<(String, String), Vec<CommitRecord>>,
    fail_project: Option<String>,
    compare_calls: AtomicUsize,
}

impl FakeSource {
    fn with_refs(mut self, project: &str, refs: &[(&str, &str)]) -> Self {
        self.refs
            .insert(project.to_string(), refs.iter().copied().collect());
        self
    }

    fn with_range(mut self, from: &str, to: &str, commits: Vec<CommitRecord>) -> Self {
        self.ranges
            .insert((from.to_string(), to.to_string()), commits);
        self
    }
}

impl RefLister for FakeSource {
    async fn list_refs(&self, project: &Project) -> RepoResult<RefListing> {
        Ok(RefListing {
            refs: self.refs.get(&project.name).cloned().unwrap_or_default(),
            web_url: format!("https://git.example.com/{}", project.name),
        })
    }
}

impl Comparator for FakeSource {
    async fn compare(
        &self,
        project: &Project,
        from: &RevisionId,
        to: &RevisionId,
    ) -> RepoResult<Comparison> {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_project.as_deref() == Some(project.name.as_str()) {
            return Err(GitlabError::Api {
                status: 500,
                url: format!("compare {from}...{to}"),
                message: "boom".to_string(),
            }
            .into());
        }
        let commits = self
            .ranges
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default();
        Ok(Comparison {
            head: commits.iter().map(|c| c.created_at).max(),
            has_changes: !commits.is_empty(),
            commits,
        })
    }
}

fn diff_of(changed: Vec<ProjectPair>) -> ProjectsDiff {
    ProjectsDiff {
        changed,
        ..ProjectsDiff::default()
    }
}

#[test]
fn test_resolver_order() {
    let refs: RefMap = [
        ("refs/heads/main", SHA_A),
        ("refs/tags/main", SHA_B),
        ("refs/tags/v1", SHA_B),
    ]
    .into_iter()
    .collect();
    let resolver = Resolver::new(true);

    assert_eq!(resolver.resolve("main", &refs), Some(RevisionId::new(SHA_A)));
    assert_eq!(resolver.resolve("v1", &refs), Some(RevisionId::new(SHA_B)));
    assert_eq!(
        resolver.resolve("refs/tags/main", &refs),
        Some(RevisionId::new(SHA_B))
    );
    assert_eq!(resolver.resolve("refs/heads/v1", &refs), None);
    assert_eq!(resolver.resolve("nope", &refs), None);

    let direct = "abcdefabcdefabcdefabcdefabcdefabcdefabcd";
    assert_eq!(resolver.resolve(direct, &refs), Some(RevisionId::new(direct)));
    assert_eq!(Resolver::new(false).resolve(direct, &refs), None);
    assert_eq!(resolver.resolve("abcdef", &refs), None);
}

#[test]
fn test_refmap_last_write_wins() {
    let refs: RefMap = [("refs/heads/x", SHA_A), ("refs/heads/x", SHA_B)]
        .into_iter()
        .collect();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs.get("refs/heads/x"), Some(&RevisionId::new(SHA_B)));
}

#[test]
fn test_timestamps() {
    let ts = parse_timestamp("2024-01-01T10:00:00.000000+08:00").expect("python-style");
    assert_eq!(format_timestamp(&ts), "2024-01-01 10:00:00 ");
    let ts = parse_timestamp("2024-01-01T10:00:00.000+0000").expect("compact offset");
    assert_eq!(format_timestamp(&ts), "2024-01-01 10:00:00 ");
    assert!(parse_timestamp("yesterday").is_err());
}

#[tokio::test]
async fn test_unresolved_revision_is_unreachable_without_compare() {
    let source = FakeSource::default().with_refs("app", &[("refs/heads/main", SHA_A)]);
    let diff = diff_of(vec![pair("app", "missing-branch", "also-missing")]);

    let report = collect_deltas(diff, &source, &source, CollectOptions::default())
        .await
        .expect("resolution failure is recovered");

    assert!(report.diff.changed.is_empty());
    assert_eq!(report.diff.unreachable.len(), 1);
    assert!(report.deltas.is_empty());
    assert_eq!(source.compare_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_one_side_unresolved_is_unreachable() {
    let source = FakeSource::default().with_refs("app", &[("refs/heads/main", SHA_A)]);
    let diff = diff_of(vec![pair("app", "main", "gone")]);

    let report = collect_deltas(diff, &source, &source, CollectOptions::default())
        .await
        .expect("recovered");
    assert_eq!(report.diff.unreachable[0].to.revision, "gone");
    assert_eq!(source.compare_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_equal_ids_stay_changed_with_no_commits() {
    let source = FakeSource::default()
        .with_refs("app", &[("refs/heads/main", SHA_A), ("refs/tags/v1", SHA_A)]);
    let diff = diff_of(vec![pair("app", "main", "v1")]);

    let report = collect_deltas(diff, &source, &source, CollectOptions::default())
        .await
        .expect("collect");

    assert_eq!(report.diff.changed.len(), 1);
    assert_eq!(source.compare_calls.load(Ordering::SeqCst), 2);
    assert!(merge_commits(&report.deltas).is_empty());
    assert!(summarize(&report.deltas).is_empty());
}

#[tokio::test]
async fn test_merge_orders_by_time_then_manifest_order() {
    let tie = "2024-01-01T10:00:00.000000+00:00";
    let source = FakeSource::default()
        .with_refs("one", &[("refs/heads/old", SHA_A), ("refs/heads/new", SHA_B)])
        .with_refs("two", &[("refs/heads/old", SHA_A), ("refs/heads/new", SHA_B)])
        .with_range(
            SHA_A,
            SHA_B,
            vec![
                commit("f-late", "shared", "a@example.com", "2024-01-01T12:00:00+00:00"),
                commit("f-tie", "shared", "a@example.com", tie),
            ],
        )
        .with_range(
            SHA_B,
            SHA_A,
            vec![commit("b-tie", "shared", "b@example.com", tie)],
        );
    let diff = diff_of(vec![pair("one", "old", "new"), pair("two", "old", "new")]);

    let options = CollectOptions {
        jobs: 2,
        accept_commit_ids: true,
    };
    let report = collect_deltas(diff, &source, &source, options)
        .await
        .expect("collect");
    let merged = merge_commits(&report.deltas);

    assert!(merged.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    let order: Vec<_> = merged
        .iter()
        .map(|c| format!("{} {}", c.id, c.direction.marker()))
        .collect();
    insta::assert_debug_snapshot!(order, @r#"
    [
        "f-tie [+]",
        "b-tie [-]",
        "f-tie [+]",
        "b-tie [-]",
        "f-late [+]",
        "f-late [+]",
    ]
    "#);
}

#[tokio::test]
async fn test_compare_failure_aborts() {
    let source = FakeSource {
        fail_project: Some("bad".to_string()),
        ..FakeSource::default()
    }
    .with_refs("bad", &[("refs/heads/old", SHA_A), ("refs/heads/new", SHA_B)]);
    let diff = diff_of(vec![pair("bad", "old", "new")]);

    let err = collect_deltas(diff, &source, &source, CollectOptions::default())
        .await
        .expect_err("compare failure is fatal");
    assert_eq!(err.http_status(), Some(500));
}

#[test]
fn test_summarize_one_record_per_email() {
    let source_commits = vec![
        commit("c1", "app", "bob@example.com", "2024-01-01T09:00:00+00:00"),
        commit("c2", "app", "alice@example.com", "2024-01-01T11:00:00+00:00"),
        commit("c3", "app", "bob@example.com", "2024-01-01T10:00:00+00:00"),
    ];
    let forward = Comparison {
        head: source_commits.iter().map(|c| c.created_at).max(),
        has_changes: true,
        commits: source_commits,
    };
    let delta = super::ProjectDelta {
        pair: pair("app", "old", "new"),
        from_id: RevisionId::new(SHA_A),
        to_id: RevisionId::new(SHA_B),
        forward,
        backward: Comparison::default(),
        web_url: "https://git.example.com/platform/app".to_string(),
    };

    let records = summarize(&[delta]);
    let rows: Vec<_> = records
        .iter()
        .map(|r| {
            format!(
                "{} {} {} {}",
                r.author_email,
                r.author_name,
                format_timestamp(&r.created_at),
                r.web_url
            )
        })
        .collect();
    insta::assert_debug_snapshot!(rows, @r#"
    [
        "alice@example.com @alice 2024-01-01 11:00:00  https://git.example.com/platform/app/-/compare/1111111111111111111111111111111111111111...2222222222222222222222222222222222222222",
        "bob@example.com @bob 2024-01-01 11:00:00  https://git.example.com/platform/app/-/compare/1111111111111111111111111111111111111111...2222222222222222222222222222222222222222",
    ]
    "#);
}

#[test]
fn test_merged_report_split() {
    let commits: Vec<_> = (0..5)
        .map(|i| {
            commit(
                &format!("c{i}"),
                "app",
                "a@example.com",
                &format!("2024-01-01T10:0{i}:00+00:00"),
            )
        })
        .collect();
    let report = MergedReport::new(commits, 3);
    assert_eq!(report.total(), 5);
    assert_eq!(report.visible().len(), 3);
    assert_eq!(report.overflow()[0].id, "c3");

    let small = MergedReport::new(report.commits[..2].to_vec(), 3);
    assert!(small.overflow().is_empty());
}
