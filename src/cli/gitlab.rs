// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `gitlab` arguments.
//!
//! ```text
//! repolab gitlab [action] [filters] [<project>...]
//!
//! action (first match wins)     targets
//!   --to-manifest                 manifest projects: <project>... by name/path,
//!   --create                        -r/-i patterns, -g groups, -a
//!   --branch B [--protect|        or every project under --gitlab-groups
//!               --unprotect]
//!   --tag T
//!   --mirror-push
//! ```

use clap::{Args, ValueEnum};
use std::path::PathBuf;

use crate::gitlab::types::access;

/// GitLab merge method of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MergeMethod {
    /// Fast-forward merges only.
    Ff,
    /// Merge commits.
    Merge,
    /// Merge commit after a semi-linear rebase.
    #[value(name = "rebase_merge")]
    RebaseMerge,
}

impl MergeMethod {
    /// Value accepted by the GitLab API.
    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::Ff => "ff",
            Self::Merge => "merge",
            Self::RebaseMerge => "rebase_merge",
        }
    }
}

fn parse_access_level(value: &str) -> Result<u8, String> {
    match value.parse::<u8>() {
        Ok(level @ (access::NO_ACCESS | access::DEVELOPER | access::MAINTAINER)) => Ok(level),
        _ => Err(format!(
            "'{value}' is not an access level (0=no one, 30=developers, 40=maintainers)"
        )),
    }
}

/// Arguments for `gitlab`.
#[derive(Debug, Clone, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct GitlabArgs {
    /// Projects by name or path; patterns with -r/-i.
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,

    /// Create the manifest's projects (and missing groups) under the root group.
    #[arg(long)]
    pub create: bool,

    /// Create this tag at each project's revision.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Create this branch at each project's revision, or (un)protect it.
    #[arg(long, value_name = "BRANCH")]
    pub branch: Option<String>,

    /// Remove the protection of --branch.
    #[arg(long, conflicts_with = "protect")]
    pub unprotect: bool,

    /// Protect --branch with the given access levels.
    #[arg(long)]
    pub protect: bool,

    /// Merge method set on protected or created projects.
    #[arg(long = "merge-method", value_enum, value_name = "METHOD")]
    pub merge_method: Option<MergeMethod>,

    /// Who may merge into a protected branch: 40=maintainers, 30=developers, 0=no one.
    #[arg(long = "allowed-to-merge", value_name = "LEVEL", default_value = "40", value_parser = parse_access_level)]
    pub allowed_to_merge: u8,

    /// Who may push to a protected branch: 40=maintainers, 30=developers, 0=no one.
    #[arg(long = "allowed-to-push", value_name = "LEVEL", default_value = "0", value_parser = parse_access_level)]
    pub allowed_to_push: u8,

    /// Configure and enable a push mirror on each project.
    #[arg(long = "mirror-push", visible_alias = "mirror_push")]
    pub mirror_push: bool,

    /// Print a manifest listing the server's (or --gitlab-groups') projects.
    #[arg(long = "to-manifest", visible_alias = "to_manifest")]
    pub to_manifest: bool,

    /// Write the --to-manifest output to FILE instead of stdout.
    #[arg(short = 'o', long = "output-file", value_name = "FILE", requires = "to_manifest")]
    pub output_file: Option<PathBuf>,

    /// Treat <PROJECT> arguments as regular expressions or globs.
    #[arg(short = 'r', long = "regex")]
    pub regex: bool,

    /// Select projects not matching any <PROJECT> pattern.
    #[arg(short = 'i', long = "inverse-regex", conflicts_with = "regex")]
    pub inverse_regex: bool,

    /// Manifest groups to select, e.g. `default,-notdefault`.
    #[arg(short = 'g', long = "groups", value_name = "GROUPS")]
    pub groups: Option<String>,

    /// Don't run any action; just print the targets.
    #[arg(short = 'n', long = "dry-run")]
    pub dry_run: bool,

    /// Include projects that are not checked out.
    #[arg(short = 'a', long = "all")]
    pub all: bool,

    /// Act on every project under these GitLab groups (comma or space
    /// separated full paths) instead of the manifest.
    #[arg(long = "gitlab-groups", value_name = "GROUPS")]
    pub gitlab_groups: Option<String>,

    /// Ref to branch or tag from, overriding the project revision.
    #[arg(long = "ref", value_name = "REF")]
    pub from_ref: Option<String>,

    /// GitLab server URL (overrides gitlab.url).
    #[arg(long = "gitlab-url", value_name = "URL")]
    pub gitlab_url: Option<String>,

    /// GitLab private token (overrides gitlab.private_token).
    #[arg(long = "private-token", value_name = "TOKEN", env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    pub private_token: Option<String>,
}

impl GitlabArgs {
    /// Group paths given to --gitlab-groups.
    #[must_use]
    pub fn gitlab_group_list(&self) -> Vec<String> {
        self.gitlab_groups
            .as_deref()
            .map(crate::gitlab::walk::split_group_list)
            .unwrap_or_default()
    }

    /// Manifest groups given to -g.
    #[must_use]
    pub fn manifest_groups(&self) -> Vec<String> {
        self.groups
            .as_deref()
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
