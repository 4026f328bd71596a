// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repo manifest model.
//!
//! ```text
//! manifest.xml ──► xml::load ──► Manifest { remotes, default, projects }
//!   <remote name fetch revision?>          │
//!   <default remote revision sync-j>       ├─► Project::path_with_namespace
//!   <project name path? revision? ...>     ├─► Project::matches_groups
//!   <include name>  (recursive, bounded)   └─► diff::projects_diff
//!   <remove-project name>
//!   <extend-project name revision? groups?>
//! ```
//!
//! Projects keep declaration order; every consumer relies on it.

pub mod diff;
pub mod export;
pub mod xml;


use std::path::{Path, PathBuf};

use crate::error::{ManifestError, RepoResult};

/// A `<remote>` element with its fetch URL already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub fetch: String,
    pub revision: Option<String>,
}

/// The `<default>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Defaults {
    pub remote: Option<String>,
    pub revision: Option<String>,
    pub sync_jobs: Option<u32>,
}

/// A fully resolved `<project>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Repository name relative to the remote's fetch URL.
    pub name: String,
    /// Checkout path relative to the client root; the diff key.
    pub path: String,
    /// Declared revision expression (branch, tag, `refs/...` or commit id).
    pub revision: String,
    /// Name of the remote this project fetches from.
    pub remote: String,
    /// `<fetch>/<name>`.
    pub remote_url: String,
    /// Groups declared in the manifest.
    pub groups: Vec<String>,
}

impl Project {
    /// Path of this project on a GitLab server rooted at `gitlab_base`.
    ///
    /// The base path of the GitLab URL (e.g. `/gitlab`), the leading `/` and
    /// a trailing `.git` are removed from the remote URL's path.
    #[must_use]
    pub fn path_with_namespace(&self, gitlab_base: &str) -> String {
        let url_path = url::Url::parse(&self.remote_url)
            .map_or_else(|_| self.remote_url.clone(), |u| u.path().to_string());
        let base_path = url::Url::parse(gitlab_base)
            .map(|u| u.path().trim_end_matches('/').to_string())
            .unwrap_or_default();

        let mut path = url_path.as_str();
        if !base_path.is_empty()
            && let Some(rest) = path.strip_prefix(base_path.as_str())
            && (rest.is_empty() || rest.starts_with('/'))
        {
            path = rest;
        }
        let path = path.trim_start_matches('/');
        path.strip_suffix(".git").unwrap_or(path).to_string()
    }

    /// Whether the project is selected by a list of manifest groups.
    ///
    /// Every project implicitly belongs to `all`, `name:<name>`,
    /// `path:<path>` and, unless declared `notdefault`, `default`.
    /// A `-group` entry deselects. Later entries win.
    #[must_use]
    pub fn matches_groups(&self, wanted: &[String]) -> bool {
        let mut expanded: Vec<String> = self.groups.clone();
        expanded.push("all".to_string());
        expanded.push(format!("name:{}", self.name));
        expanded.push(format!("path:{}", self.path));
        if !self.groups.iter().any(|g| g == "notdefault") {
            expanded.push("default".to_string());
        }

        let mut matched = false;
        for group in wanted {
            if let Some(excluded) = group.strip_prefix('-') {
                if expanded.iter().any(|g| g == excluded) {
                    matched = false;
                }
            } else if expanded.iter().any(|g| g == group) {
                matched = true;
            }
        }
        matched
    }
}

/// A loaded manifest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub source: PathBuf,
    pub remotes: Vec<Remote>,
    pub defaults: Defaults,
    pub projects: Vec<Project>,
}

impl Manifest {
    /// Load and resolve a manifest file, following includes.
    ///
    /// `manifest_url` is the URL the manifest repository was cloned from;
    /// relative `fetch` attributes resolve against it.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] when the file cannot be read or parsed,
    /// a required attribute is missing, a project names an unknown remote,
    /// or a project has no revision.
    pub fn from_file(path: &Path, manifest_url: &str) -> RepoResult<Self> {
        xml::load(path, manifest_url)
    }

    /// Look up a project by its checkout path.
    #[must_use]
    pub fn project_by_path(&self, path: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.path == path)
    }
}

/// Resolve a `diffmanifests` manifest argument to a file.
///
/// Absolute paths are used as-is. Relative paths are looked up under
/// `<repo_dir>/manifests/` first, then relative to the working directory.
///
/// # Errors
///
/// Returns [`ManifestError::NotFound`] when no candidate exists.
pub fn resolve_manifest_arg(repo_dir: &Path, arg: &str) -> RepoResult<PathBuf> {
    let candidate = Path::new(arg);
    if candidate.is_absolute() {
        return if candidate.is_file() {
            Ok(candidate.to_path_buf())
        } else {
            Err(ManifestError::NotFound(arg.to_string()).into())
        };
    }

    let in_manifests = repo_dir.join("manifests").join(candidate);
    if in_manifests.is_file() {
        return Ok(in_manifests);
    }
    if candidate.is_file() {
        return Ok(candidate.to_path_buf());
    }
    Err(ManifestError::NotFound(arg.to_string()).into())
}

/// The manifest the checkout is currently synced to.
#[must_use]
pub fn current_manifest_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join("manifest.xml")
}
