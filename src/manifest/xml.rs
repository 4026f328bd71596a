// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Manifest XML loading.
//!
//! ```text
//! collect(file, depth)            document order
//!   <remote>          ──► remotes (by name, later wins)
//!   <default>         ──► defaults (later wins)
//!   <project>         ──► raw projects
//!   <remove-project>  ──► drop raw projects by name
//!   <extend-project>  ──► patch raw projects by name
//!   <include name>    ──► collect(dir(file)/name, depth + 1)
//!        |
//!        v
//! resolve(raw, manifest_url) ──► Manifest
//! ```

use std::path::Path;

use xot::{NameId, Node, Xot};

use super::{Defaults, Manifest, Project, Remote};
use crate::error::{ManifestError, RepoResult};

/// Deepest `<include>` chain accepted.
const MAX_INCLUDE_DEPTH: usize = 8;

#[derive(Debug, Default)]
struct RawProject {
    name: String,
    path: Option<String>,
    revision: Option<String>,
    remote: Option<String>,
    groups: Option<String>,
}

#[derive(Debug, Default)]
struct RawManifest {
    remotes: Vec<Remote>,
    defaults: Defaults,
    projects: Vec<RawProject>,
}

/// Interned element and attribute names.
struct Names {
    remote: NameId,
    default: NameId,
    project: NameId,
    include: NameId,
    remove_project: NameId,
    extend_project: NameId,
    name: NameId,
    fetch: NameId,
    revision: NameId,
    path: NameId,
    groups: NameId,
    sync_j: NameId,
}

impl Names {
    fn new(xot: &mut Xot) -> Self {
        Self {
            remote: xot.add_name("remote"),
            default: xot.add_name("default"),
            project: xot.add_name("project"),
            include: xot.add_name("include"),
            remove_project: xot.add_name("remove-project"),
            extend_project: xot.add_name("extend-project"),
            name: xot.add_name("name"),
            fetch: xot.add_name("fetch"),
            revision: xot.add_name("revision"),
            path: xot.add_name("path"),
            groups: xot.add_name("groups"),
            sync_j: xot.add_name("sync-j"),
        }
    }
}

/// Load a manifest file and everything it includes.
pub(crate) fn load(path: &Path, manifest_url: &str) -> RepoResult<Manifest> {
    let mut raw = RawManifest::default();
    collect(path, 0, &mut raw)?;
    resolve(raw, path, manifest_url)
}

/// Parse manifest text. Includes resolve relative to `origin`'s directory.
///
/// # Errors
///
/// Same as [`Manifest::from_file`].
pub fn parse_str(text: &str, origin: &Path, manifest_url: &str) -> RepoResult<Manifest> {
    let mut raw = RawManifest::default();
    parse_into(text, origin, 0, &mut raw)?;
    resolve(raw, origin, manifest_url)
}

fn collect(path: &Path, depth: usize, raw: &mut RawManifest) -> RepoResult<()> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(ManifestError::IncludeDepth {
            path: path.display().to_string(),
        }
        .into());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_into(&text, path, depth, raw)
}

fn parse_error(path: &Path, err: impl std::fmt::Display) -> ManifestError {
    ManifestError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

fn parse_into(text: &str, path: &Path, depth: usize, raw: &mut RawManifest) -> RepoResult<()> {
    let mut xot = Xot::new();
    let names = Names::new(&mut xot);
    let root = xot.parse(text).map_err(|e| parse_error(path, e))?;
    let manifest = xot
        .document_element(root)
        .map_err(|e| parse_error(path, e))?;

    let children: Vec<Node> = xot.children(manifest).collect();
    for node in children {
        let Some(element) = xot.element(node) else {
            continue;
        };
        let tag = element.name();
        let attr = |name: NameId| xot.get_attribute(node, name).map(str::to_string);
        let required = |name: NameId, attribute: &str, element: &str| {
            attr(name).ok_or_else(|| ManifestError::MissingAttribute {
                path: path.display().to_string(),
                element: element.to_string(),
                attribute: attribute.to_string(),
            })
        };

        if tag == names.remote {
            let remote = Remote {
                name: required(names.name, "name", "remote")?,
                fetch: required(names.fetch, "fetch", "remote")?,
                revision: attr(names.revision),
            };
            raw.remotes.retain(|r| r.name != remote.name);
            raw.remotes.push(remote);
        } else if tag == names.default {
            raw.defaults = Defaults {
                remote: attr(names.remote),
                revision: attr(names.revision),
                sync_jobs: attr(names.sync_j).and_then(|v| v.parse().ok()),
            };
        } else if tag == names.project {
            raw.projects.push(RawProject {
                name: required(names.name, "name", "project")?,
                path: attr(names.path),
                revision: attr(names.revision),
                remote: attr(names.remote),
                groups: attr(names.groups),
            });
        } else if tag == names.remove_project {
            let name = required(names.name, "name", "remove-project")?;
            raw.projects.retain(|p| p.name != name);
        } else if tag == names.extend_project {
            let name = required(names.name, "name", "extend-project")?;
            let revision = attr(names.revision);
            let groups = attr(names.groups);
            for project in raw.projects.iter_mut().filter(|p| p.name == name) {
                if let Some(rev) = &revision {
                    project.revision = Some(rev.clone());
                }
                if let Some(extra) = &groups {
                    project.groups = Some(match project.groups.take() {
                        Some(existing) => format!("{existing},{extra}"),
                        None => extra.clone(),
                    });
                }
            }
        } else if tag == names.include {
            let name = required(names.name, "name", "include")?;
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            collect(&base.join(name), depth + 1, raw)?;
        }
    }
    Ok(())
}

fn resolve(raw: RawManifest, source: &Path, manifest_url: &str) -> RepoResult<Manifest> {
    let remotes: Vec<Remote> = raw
        .remotes
        .into_iter()
        .map(|r| Remote {
            fetch: resolve_fetch(manifest_url, &r.fetch),
            ..r
        })
        .collect();

    let mut projects = Vec::with_capacity(raw.projects.len());
    for p in raw.projects {
        let remote_name = p
            .remote
            .or_else(|| raw.defaults.remote.clone())
            .ok_or_else(|| ManifestError::MissingAttribute {
                path: source.display().to_string(),
                element: "project".to_string(),
                attribute: "remote".to_string(),
            })?;
        let remote = remotes
            .iter()
            .find(|r| r.name == remote_name)
            .ok_or_else(|| ManifestError::UnknownRemote {
                project: p.name.clone(),
                remote: remote_name.clone(),
            })?;
        let revision = p
            .revision
            .or_else(|| remote.revision.clone())
            .or_else(|| raw.defaults.revision.clone())
            .ok_or_else(|| ManifestError::NoRevision {
                project: p.name.clone(),
            })?;

        projects.push(Project {
            path: p.path.unwrap_or_else(|| p.name.clone()),
            remote_url: format!("{}/{}", remote.fetch.trim_end_matches('/'), p.name),
            remote: remote_name,
            revision,
            groups: split_groups(p.groups.as_deref()),
            name: p.name,
        });
    }

    Ok(Manifest {
        source: source.to_path_buf(),
        remotes,
        defaults: raw.defaults,
        projects,
    })
}

/// Resolve a `fetch` attribute against the manifest repository URL.
///
/// Absolute URLs are kept. Relative ones (`..`, `../platform`) are joined
/// onto the manifest URL the way `git` resolves relative submodule URLs.
#[must_use]
pub fn resolve_fetch(manifest_url: &str, fetch: &str) -> String {
    if url::Url::parse(fetch).is_ok() || manifest_url.is_empty() {
        return fetch.to_string();
    }
    url::Url::parse(manifest_url.trim_end_matches('/'))
        .and_then(|base| base.join(fetch.trim_end_matches('/')))
        .map_or_else(|_| fetch.to_string(), |u| u.to_string())
}

fn split_groups(groups: Option<&str>) -> Vec<String> {
    groups
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}
