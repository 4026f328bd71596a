// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for repolab using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! repolab [global options] <command>
//! version
//! options
//! inis
//! diffmanifests <manifest1> [<manifest2>] [--gitlab] [--raw] [--pretty-format F]
//! gitlab [action] [filters] [<project>...]
//! ```

pub mod diff;
pub mod gitlab;
pub mod global;

#[cfg(test)]
mod tests;

use crate::cli::diff::DiffManifestsArgs;
use crate::cli::gitlab::GitlabArgs;
use crate::cli::global::GlobalOptions;
use clap::{Parser, Subcommand};

/// Manifest diff and GitLab administration for repo checkouts.
#[derive(Debug, Parser)]
#[command(
    name = "repolab",
    author,
    version,
    about = "Manifest diff and GitLab administration for repo checkouts",
    long_about = "repolab Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Compares two manifests of a repo checkout and reports the\n\
                  commits between the revisions they pin, locally or through\n\
                  the GitLab API, and applies bulk actions to the GitLab\n\
                  projects a manifest names. See `repolab <command> --help`\n\
                  for more information about a command.",
    after_help = "CONFIG FILES:\n\n\
                  By default, repolab loads `repolab.toml` from the current\n\
                  directory if it exists. Additional files can be specified with\n\
                  --ini, those are loaded after it and override its values.\n\
                  REPOLAB_SECTION__KEY environment variables and --set\n\
                  section/key=value override every file. Use --no-default-inis to\n\
                  only use --ini."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Lists all options and their values.
    Options,

    /// Lists the configuration files used by repolab.
    Inis,

    /// Shows the projects and commits that differ between two manifests.
    Diffmanifests(DiffManifestsArgs),

    /// Applies bulk actions to the GitLab projects of the manifest.
    Gitlab(GitlabArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version information
/// was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
