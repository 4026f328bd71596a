// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `diffmanifests` arguments.
//!
//! ```text
//! repolab diffmanifests <manifest1.xml> [<manifest2.xml>] [options]
//!
//!   one manifest   -> diff against <repo_dir>/manifest.xml (local checkout)
//!   two manifests  -> diff manifest1 against manifest2
//!   --gitlab       -> resolve refs and compares through the GitLab API
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::error::Result;

/// Arguments for `diffmanifests`.
#[derive(Debug, Clone, Args)]
pub struct DiffManifestsArgs {
    /// Manifest to diff from, and optionally the manifest to diff to.
    /// Relative names are looked up under `<repo_dir>/manifests/` first.
    #[arg(value_name = "MANIFEST", required = true, num_args = 1..=2)]
    pub manifests: Vec<String>,

    /// Resolve revisions and commits through the GitLab API instead of the
    /// local checkout.
    #[arg(long)]
    pub gitlab: bool,

    /// Directory receiving the CSV and chat payload files.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// GitLab server URL (overrides gitlab.url).
    #[arg(long = "gitlab-url", value_name = "URL")]
    pub gitlab_url: Option<String>,

    /// GitLab private token (overrides gitlab.private_token).
    #[arg(long = "private-token", value_name = "TOKEN", env = "GITLAB_PRIVATE_TOKEN", hide_env_values = true)]
    pub private_token: Option<String>,

    /// Display the parser-friendly raw diff.
    #[arg(long)]
    pub raw: bool,

    /// Do not color the output.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Git pretty format for local commits; with --gitlab, `csv` or the path
    /// of a chat template JSON file.
    #[arg(long = "pretty-format", value_name = "FORMAT")]
    pub pretty_format: Option<String>,

    /// Number of projects examined concurrently (overrides diff.jobs).
    #[arg(short = 'j', long = "jobs", value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Include sub-manifests. Not supported; kept for command-line
    /// compatibility with repo.
    #[arg(long = "all-manifests", hide = true)]
    pub all_manifests: bool,
}

impl DiffManifestsArgs {
    /// Check constraints clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error for a manifest count outside 1-2 or when
    /// `--all-manifests` is given.
    pub fn validate(&self) -> Result<()> {
        if self.all_manifests {
            anyhow::bail!("`diffmanifests` only supports the current tree");
        }
        if !(1..=2).contains(&self.manifests.len()) {
            anyhow::bail!(
                "expected one or two manifests, got {}",
                self.manifests.len()
            );
        }
        Ok(())
    }
}
