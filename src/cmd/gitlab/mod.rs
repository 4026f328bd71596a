// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `gitlab` command: bulk actions on the GitLab projects of a manifest.
//!
//! ```text
//! manifest ──select_projects──┐
//!                             ├──► [Target] ──dry run──► print paths
//! --gitlab-groups ──walk──────┘        |
//!                                      v
//!                           Runner::apply (per target)
//!                      lookup ─► create | branch | tag | (un)protect | mirror
//!                                      |
//!                      Done ─► print     Skipped(404/400/409) ─► report at end
//!
//! --to-manifest: all projects (or --gitlab-groups) ─► export::write_manifest
//! ```

mod select;


pub use select::{ProjectPattern, Selection, select_projects};

use std::io::Write;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use super::{checkout_root, connect};
use crate::cli::gitlab::{GitlabArgs, MergeMethod};
use crate::config::Config;
use crate::config::types::{GitlabConfig, MirrorConfig};
use crate::error::{RepoResult, Result, bail_out};
use crate::git::backend::GixBackend;
use crate::gitlab::GitlabClient;
use crate::gitlab::types::{GroupInfo, ProjectInfo};
use crate::gitlab::walk::collect_group_projects;
use crate::manifest::export::{ExportHeader, write_manifest};
use crate::manifest::{Manifest, Project, current_manifest_path};

/// Bulk action applied to each target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create the project and any missing groups below the root group.
    Create { merge_method: Option<&'static str> },
    CreateBranch { branch: String },
    Unprotect { branch: String },
    Protect {
        branch: String,
        push: u8,
        merge: u8,
        merge_method: Option<&'static str>,
    },
    CreateTag { tag: String },
    /// Add a push mirror, or enable the existing ones.
    Mirror,
}

impl Action {
    /// Pick the action; `--create` wins over `--branch`, which wins over
    /// `--tag`, which wins over `--mirror-push`.
    ///
    /// # Errors
    ///
    /// Returns an error when no action is given.
    pub fn from_args(args: &GitlabArgs, config: &GitlabConfig) -> Result<Self> {
        let merge_method = args.merge_method.map(MergeMethod::as_api_str);
        if args.create {
            return Ok(Self::Create { merge_method });
        }
        if args.branch.is_some() || args.protect || args.unprotect {
            let branch = args
                .branch
                .clone()
                .unwrap_or_else(|| config.protected_branch.clone());
            return Ok(if args.unprotect {
                Self::Unprotect { branch }
            } else if args.protect {
                Self::Protect {
                    branch,
                    push: args.allowed_to_push,
                    merge: args.allowed_to_merge,
                    merge_method,
                }
            } else {
                Self::CreateBranch { branch }
            });
        }
        if let Some(tag) = &args.tag {
            return Ok(Self::CreateTag { tag: tag.clone() });
        }
        if args.mirror_push {
            return Ok(Self::Mirror);
        }
        anyhow::bail!("no action given; use --create, --branch, --tag, --mirror-push or --to-manifest")
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::CreateBranch { .. } => "branch",
            Self::Unprotect { .. } => "unprotect",
            Self::Protect { .. } => "protect",
            Self::CreateTag { .. } => "tag",
            Self::Mirror => "mirror",
        }
    }
}

/// A GitLab project to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub path_with_namespace: String,
    /// Revision pinned by the manifest; group-walk targets have none.
    pub revision: Option<String>,
}

impl Target {
    #[must_use]
    pub fn from_manifest(project: &Project, server: &str) -> Self {
        Self {
            path_with_namespace: project.path_with_namespace(server),
            revision: Some(project.revision.clone()),
        }
    }
}

/// Result of one action on one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// A recoverable condition, reported at the end.
    Skipped(String),
}

/// Map the listed HTTP statuses to [`Outcome::Skipped`].
fn recover<T>(result: RepoResult<T>, statuses: &[u16]) -> RepoResult<Outcome> {
    match result {
        Ok(_) => Ok(Outcome::Done),
        Err(e) if e.http_status().is_some_and(|s| statuses.contains(&s)) => {
            Ok(Outcome::Skipped(e.to_string()))
        }
        Err(e) => Err(e),
    }
}

/// Applies one [`Action`] to targets.
#[derive(Debug)]
pub struct Runner<'a> {
    pub client: &'a GitlabClient,
    /// Start point for new branches and tags, overriding the target's.
    pub from_ref: Option<&'a str>,
    pub mirror: &'a MirrorConfig,
    /// Pause after each create call.
    pub delay: Duration,
    /// Group new projects are created under.
    pub root_group: Option<GroupInfo>,
}

impl Runner<'_> {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    /// Apply `action` to one target.
    ///
    /// # Errors
    ///
    /// Returns the first API error that is not recoverable for `action`.
    pub async fn apply(&self, action: &Action, target: &Target) -> RepoResult<Outcome> {
        let wanted = target.path_with_namespace.as_str();
        if let Action::Create { .. } = action
            && let Some(root) = &self.root_group
            && !wanted.starts_with(&format!("{}/", root.full_path))
        {
            return Ok(Outcome::Skipped(format!("outside {}", root.full_path)));
        }

        let project = match self.client.project(wanted).await {
            Ok(project) => project,
            Err(e) if e.is_not_found() => {
                return match action {
                    Action::Create { merge_method } => self.create(wanted, *merge_method).await,
                    _ => Ok(Outcome::Skipped("not found".to_string())),
                };
            }
            Err(e) => return Err(e),
        };
        let path = project.path_with_namespace.as_str();

        match action {
            Action::Create { .. } => Ok(Outcome::Skipped("exists".to_string())),
            Action::CreateBranch { branch } => match self.start_point(target, &project) {
                Some(from) => recover(self.client.create_branch(path, branch, from).await, &[400]),
                None => Ok(Outcome::Skipped("no revision to branch from".to_string())),
            },
            Action::CreateTag { tag } => match self.start_point(target, &project) {
                Some(from) => recover(self.client.create_tag(path, tag, from).await, &[400]),
                None => Ok(Outcome::Skipped("no revision to tag".to_string())),
            },
            Action::Unprotect { branch } => {
                recover(self.client.unprotect_branch(path, branch).await, &[404])
            }
            Action::Protect {
                branch,
                push,
                merge,
                merge_method,
            } => self.protect(path, branch, *push, *merge, *merge_method).await,
            Action::Mirror => self.mirror(path).await,
        }
    }

    fn start_point<'t>(&'t self, target: &'t Target, project: &'t ProjectInfo) -> Option<&'t str> {
        self.from_ref
            .or(target.revision.as_deref())
            .or(project.default_branch.as_deref())
    }

    async fn protect(
        &self,
        path: &str,
        branch: &str,
        push: u8,
        merge: u8,
        merge_method: Option<&str>,
    ) -> RepoResult<Outcome> {
        if let Some(method) = merge_method {
            self.client.set_merge_method(path, method).await?;
        }
        match self.client.protected_branch(path, branch).await {
            Ok(existing) if existing.grants(push, merge) => {
                return Ok(Outcome::Skipped(format!("{branch} already protected")));
            }
            Ok(_) => self.client.unprotect_branch(path, branch).await?,
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
        recover(
            self.client.protect_branch(path, branch, push, merge).await,
            &[409],
        )
    }

    async fn mirror(&self, path: &str) -> RepoResult<Outcome> {
        let mirrors = match self.client.remote_mirrors(path).collect_all().await {
            Ok(mirrors) => mirrors,
            Err(e) if e.is_not_found() => Vec::new(),
            Err(e) => return Err(e),
        };
        if mirrors.is_empty() {
            let url = self.mirror.mirror_url(path)?;
            self.client.create_remote_mirror(path, &url).await?;
            return Ok(Outcome::Done);
        }
        for mirror in mirrors.iter().filter(|m| !m.enabled) {
            self.client.enable_remote_mirror(path, mirror.id).await?;
        }
        Ok(Outcome::Done)
    }

    async fn create(&self, path: &str, merge_method: Option<&str>) -> RepoResult<Outcome> {
        let Some(root) = &self.root_group else {
            return Err(bail_out("no root group to create projects under"));
        };
        let rest = path
            .strip_prefix(root.full_path.as_str())
            .unwrap_or(path)
            .trim_start_matches('/');
        let mut segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let Some(name) = segments.pop() else {
            return Ok(Outcome::Skipped("empty project path".to_string()));
        };

        let mut group = root.clone();
        for segment in segments {
            group = self.ensure_subgroup(&group, segment).await?;
        }

        let siblings = self.client.group_projects(group.id).collect_all().await?;
        if siblings.iter().any(|p| p.path == name) {
            return Ok(Outcome::Skipped("exists".to_string()));
        }
        let outcome = recover(
            self.client.create_project(name, group.id, merge_method).await,
            &[400],
        )?;
        if outcome == Outcome::Done {
            info!(project = path, "created project");
            self.pause().await;
        }
        Ok(outcome)
    }

    async fn ensure_subgroup(&self, parent: &GroupInfo, segment: &str) -> RepoResult<GroupInfo> {
        let find = |groups: Vec<GroupInfo>| groups.into_iter().find(|g| g.path == segment);
        if let Some(found) = find(self.client.subgroups(parent.id).collect_all().await?) {
            return Ok(found);
        }
        match self.client.create_group(segment, segment, parent.id).await {
            Ok(created) => {
                info!(group = %created.full_path, "created group");
                self.pause().await;
                Ok(created)
            }
            Err(e) if e.http_status() == Some(400) => {
                // Created concurrently; look it up again.
                find(self.client.subgroups(parent.id).collect_all().await?).ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Apply `action` to every target, printing each completed one.
    ///
    /// Returns the skipped targets as sorted `path : reason` lines.
    ///
    /// # Errors
    ///
    /// Stops at the first unrecoverable error.
    pub async fn apply_all(&self, action: &Action, targets: &[Target]) -> Result<Vec<String>> {
        let progress = ProgressBar::new(u64::try_from(targets.len()).unwrap_or(u64::MAX));
        progress.set_style(progress_style());
        let mut skipped = Vec::new();

        for target in targets {
            let path = &target.path_with_namespace;
            progress.set_message(path.clone());
            let outcome = self
                .apply(action, target)
                .await
                .with_context(|| format!("{} failed on {path}", action.name()))?;
            match outcome {
                Outcome::Done => progress.suspend(|| println!("{path}")),
                Outcome::Skipped(reason) => {
                    warn!(project = %path, %reason, "skipped");
                    skipped.push(format!("{path} : {reason}"));
                }
            }
            progress.inc(1);
        }

        progress.finish_and_clear();
        skipped.sort();
        Ok(skipped)
    }
}

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Targets for the manifest projects chosen by `selection`.
///
/// # Errors
///
/// Returns an error if the selection is invalid.
pub fn manifest_targets(
    manifest: &Manifest,
    selection: &Selection<'_>,
    exists: &dyn Fn(&Project) -> bool,
    server: &str,
) -> Result<Vec<Target>> {
    Ok(select_projects(manifest, selection, exists)?
        .into_iter()
        .map(|project| Target::from_manifest(project, server))
        .collect())
}

/// Names for an exported manifest: non-empty projects with `strip_prefix`
/// removed from their path.
#[must_use]
pub fn export_names(projects: &[ProjectInfo], strip_prefix: &str) -> Vec<String> {
    projects
        .iter()
        .filter(|p| {
            if p.empty_repo {
                info!(project = %p.path_with_namespace, "empty project skipped");
            }
            !p.empty_repo
        })
        .map(|p| {
            p.path_with_namespace
                .strip_prefix(strip_prefix)
                .unwrap_or(&p.path_with_namespace)
                .to_string()
        })
        .collect()
}

async fn resolve_targets(
    client: &GitlabClient,
    args: &GitlabArgs,
    config: &Config,
    action: &Action,
) -> Result<Vec<Target>> {
    let groups = args.gitlab_group_list();
    // With --create, --gitlab-groups names the root group instead.
    if !groups.is_empty() && !matches!(action, Action::Create { .. }) {
        let projects = collect_group_projects(client, &groups).await?;
        return Ok(projects
            .into_iter()
            .map(|p| Target {
                path_with_namespace: p.path_with_namespace,
                revision: None,
            })
            .collect());
    }

    let repo_dir = &config.manifest.repo_dir;
    let manifest_path = current_manifest_path(repo_dir);
    let manifest = Manifest::from_file(&manifest_path, &config.manifest.manifest_url)
        .with_context(|| format!("failed to load {}", manifest_path.display()))?;
    let root = checkout_root(repo_dir);
    let selection = Selection {
        args: &args.projects,
        regex: args.regex,
        inverse: args.inverse_regex,
        groups: args.manifest_groups(),
        include_missing: args.all,
    };
    let exists = |project: &Project| GixBackend::worktree_exists(&root.join(&project.path));
    manifest_targets(&manifest, &selection, &exists, client.server().as_str())
}

async fn root_group(client: &GitlabClient, args: &GitlabArgs, config: &Config) -> Result<GroupInfo> {
    let groups = args.gitlab_group_list();
    let root = groups
        .first()
        .map_or(config.gitlab.root_group.as_str(), String::as_str)
        .trim_matches('/');
    if root.is_empty() {
        anyhow::bail!("--create needs a root group (use --gitlab-groups or gitlab/root_group)");
    }
    client
        .group(root)
        .await
        .with_context(|| format!("root group {root} not found"))
}

async fn export_projects(client: &GitlabClient, args: &GitlabArgs, config: &Config) -> Result<()> {
    let groups = args.gitlab_group_list();
    let projects = if groups.is_empty() {
        client.all_projects().collect_all().await?
    } else {
        collect_group_projects(client, &groups).await?
    };
    let names = export_names(&projects, &config.export_strip_prefix());
    info!(projects = names.len(), "exporting manifest");

    let header = ExportHeader {
        remote_name: config.export.remote_name.clone(),
        fetch: config.export.fetch.clone(),
        revision: config.export.revision.clone(),
        sync_jobs: config.export.sync_jobs,
    };
    if let Some(path) = &args.output_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        let mut out = std::io::BufWriter::new(file);
        write_manifest(&mut out, &header, &names)?;
        out.flush()?;
    } else {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        write_manifest(&mut out, &header, &names)?;
        out.flush()?;
    }
    Ok(())
}

/// Run `gitlab`.
///
/// # Errors
///
/// Returns an error if authentication fails, no action is given, targets
/// cannot be resolved, or an action fails unrecoverably.
pub async fn run_gitlab_command(args: &GitlabArgs, config: &Config) -> Result<()> {
    let client = connect(
        &config.gitlab,
        args.gitlab_url.as_deref(),
        args.private_token.as_deref(),
    )
    .await?;

    if args.to_manifest {
        return export_projects(&client, args, config).await;
    }

    let action = Action::from_args(args, &config.gitlab)?;
    let targets = resolve_targets(&client, args, config, &action).await?;
    info!(action = action.name(), targets = targets.len(), "resolved targets");

    if args.dry_run {
        for target in &targets {
            println!("{}", target.path_with_namespace);
        }
        return Ok(());
    }

    let root_group = match action {
        Action::Create { .. } => Some(root_group(&client, args, config).await?),
        _ => None,
    };
    let runner = Runner {
        client: &client,
        from_ref: args.from_ref.as_deref(),
        mirror: &config.mirror,
        delay: Duration::from_millis(config.gitlab.request_delay_ms),
        root_group,
    };
    let skipped = runner.apply_all(&action, &targets).await?;
    if !skipped.is_empty() {
        println!("skipped projects:");
        for line in &skipped {
            println!("{line}");
        }
    }
    Ok(())
}
