// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `diffmanifests` command.
//!
//! ```text
//! manifest A ─┐                       local: LocalGitSource (git for-each-ref / git log)
//!             ├─ projects_diff ─► collect_deltas ◄──┤
//! manifest B ─┘                       --gitlab: GitlabSource (tags, branches, compare)
//!                                         |
//!                                         v
//!                          raw | colorized | csv | chat template
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use super::{checkout_root, connect};
use crate::cli::diff::DiffManifestsArgs;
use crate::config::Config;
use crate::config::types::DiffConfig;
use crate::diff::{
    CollectOptions, DiffReport, MergedReport, collect_deltas, merge_commits, summarize,
};
use crate::error::Result;
use crate::git::LocalGitSource;
use crate::git::backend::ShellBackend;
use crate::gitlab::GitlabSource;
use crate::manifest::diff::projects_diff;
use crate::manifest::{Manifest, Project, current_manifest_path, resolve_manifest_arg};
use crate::report::PrettyFormat;
use crate::report::chat::{ChatOptions, write_chat_payload};
use crate::report::csv::{write_commit_csv, write_summary_csv};
use crate::report::style::Coloring;
use crate::report::text::{CommitLayout, render_colorized, render_raw};

/// How the collected report is written.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub raw: bool,
    pub coloring: Coloring,
    /// Revisions were resolved through GitLab; commits carry links.
    pub hosted: bool,
    pub pretty: Option<PrettyFormat>,
    pub output_dir: PathBuf,
}

impl RenderOptions {
    #[must_use]
    pub fn from_args(args: &DiffManifestsArgs) -> Self {
        let pretty = args
            .pretty_format
            .as_deref()
            .map(|value| PrettyFormat::parse(value, args.gitlab));
        let output_dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(pretty.as_ref()));
        Self {
            raw: args.raw,
            coloring: Coloring::detect(!args.no_color),
            hosted: args.gitlab,
            pretty,
            output_dir,
        }
    }
}

/// Files land next to the chat template unless told otherwise.
fn default_output_dir(pretty: Option<&PrettyFormat>) -> PathBuf {
    match pretty {
        Some(PrettyFormat::Template(template)) => template
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        _ => PathBuf::from("."),
    }
}

/// The two manifests to compare: the first argument, and the second one or
/// the manifest the checkout is synced to.
///
/// # Errors
///
/// Returns an error if a named manifest cannot be found.
pub fn manifest_paths(repo_dir: &Path, manifests: &[String]) -> Result<(PathBuf, PathBuf)> {
    let Some(first) = manifests.first() else {
        anyhow::bail!("no manifest given");
    };
    let from = resolve_manifest_arg(repo_dir, first)?;
    let to = match manifests.get(1) {
        Some(second) => resolve_manifest_arg(repo_dir, second)?,
        None => current_manifest_path(repo_dir),
    };
    Ok((from, to))
}

/// Run `diffmanifests`.
///
/// # Errors
///
/// Returns an error for invalid arguments, unreadable manifests, a missing
/// git executable, GitLab failures, or unwritable report files.
pub async fn run_diffmanifests_command(args: &DiffManifestsArgs, config: &Config) -> Result<()> {
    args.validate()?;
    let repo_dir = &config.manifest.repo_dir;
    let (from_path, to_path) = manifest_paths(repo_dir, &args.manifests)?;
    let manifest_url = &config.manifest.manifest_url;
    let from = Manifest::from_file(&from_path, manifest_url)
        .with_context(|| format!("failed to load {}", from_path.display()))?;
    let to = Manifest::from_file(&to_path, manifest_url)
        .with_context(|| format!("failed to load {}", to_path.display()))?;
    info!(from = %from_path.display(), to = %to_path.display(), "diffing manifests");

    let options = RenderOptions::from_args(args);
    let collect = CollectOptions {
        jobs: args.jobs.map_or(config.diff.jobs, usize::from),
        accept_commit_ids: config.diff.accept_commit_ids,
    };

    let report = if options.hosted {
        let client = connect(
            &config.gitlab,
            args.gitlab_url.as_deref(),
            args.private_token.as_deref(),
        )
        .await?;
        let source = GitlabSource::new(&client);
        let diff = projects_diff(&from, &to, None);
        collect_deltas(diff, &source, &source, collect).await?
    } else {
        let git = ShellBackend::locate_git()?;
        debug!(git = %git.display(), "using git");
        let git_format = options
            .pretty
            .as_ref()
            .and_then(PrettyFormat::git_format)
            .map(str::to_string);
        let source = LocalGitSource::new(checkout_root(repo_dir), git_format);
        let probe: &dyn Fn(&Project) -> bool = &|project| source.exists(project);
        let diff = projects_diff(&from, &to, Some(probe));
        collect_deltas(diff, &source, &source, collect).await?
    };

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    let written = render_report(&report, &options, &config.diff, &mut out)?;
    for path in written {
        writeln!(out, "{}", path.display())?;
    }
    out.flush()?;
    Ok(())
}

/// Write `report` to `out` and any report files; returns the files written.
///
/// # Errors
///
/// Returns an error if writing to `out` or a report file fails.
pub fn render_report(
    report: &DiffReport,
    options: &RenderOptions,
    diff_config: &DiffConfig,
    out: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    if options.raw {
        render_raw(report, out)?;
        return Ok(Vec::new());
    }

    let mut written = Vec::new();
    match (options.hosted, &options.pretty) {
        (true, Some(PrettyFormat::Csv)) => {
            render_colorized(report, CommitLayout::Hidden, options.coloring, out)?;
            std::fs::create_dir_all(&options.output_dir)?;
            let path = options.output_dir.join(&diff_config.csv_name);
            write_summary_csv(&path, &summarize(&report.deltas))?;
            written.push(path);
        }
        (true, Some(PrettyFormat::Template(template))) => {
            render_colorized(report, CommitLayout::Hidden, options.coloring, out)?;
            std::fs::create_dir_all(&options.output_dir)?;
            let merged = MergedReport::new(
                merge_commits(&report.deltas),
                diff_config.overflow_threshold,
            );
            let csv_path = options.output_dir.join(&diff_config.csv_name);
            write_commit_csv(&csv_path, &merged.commits)?;
            written.push(csv_path);

            let chat = ChatOptions {
                content_pointer: &diff_config.content_pointer,
                preview: diff_config.overflow_preview,
                csv_name: &diff_config.csv_name,
            };
            if let Some(payload) = write_chat_payload(
                template,
                &options.output_dir,
                &diff_config.chat_prefix,
                &merged,
                &chat,
            )? {
                written.push(payload);
            }
        }
        (true, _) => {
            let merged = merge_commits(&report.deltas);
            render_colorized(report, CommitLayout::Timeline(&merged), options.coloring, out)?;
        }
        (false, _) => {
            render_colorized(report, CommitLayout::PerProject, options.coloring, out)?;
        }
    }
    Ok(written)
}
