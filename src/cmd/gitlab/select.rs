// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Manifest project selection for `gitlab`.

use regex::{Regex, RegexBuilder};
use tracing::debug;
use wax::{Glob, Program as _};

use crate::error::Result;
use crate::manifest::{Manifest, Project};

/// Filters taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    /// Names, paths, or patterns.
    pub args: &'a [String],
    /// `args` are patterns; keep matches.
    pub regex: bool,
    /// `args` are patterns; keep non-matches.
    pub inverse: bool,
    /// Manifest groups; `default` when empty.
    pub groups: Vec<String>,
    /// Keep projects that are not checked out.
    pub include_missing: bool,
}

/// One `-r`/`-i` pattern: a case-insensitive regex search, or a glob over
/// the whole name or path.
#[derive(Debug)]
pub struct ProjectPattern<'a> {
    regex: Option<Regex>,
    glob: Option<Glob<'a>>,
}

impl<'a> ProjectPattern<'a> {
    /// # Errors
    ///
    /// Returns an error if `pattern` is neither a regex nor a glob.
    pub fn new(pattern: &'a str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build().ok();
        let glob = Glob::new(pattern).ok();
        if regex.is_none() && glob.is_none() {
            anyhow::bail!("invalid project pattern: {pattern}");
        }
        Ok(Self { regex, glob })
    }

    #[must_use]
    pub fn matches(&self, project: &Project) -> bool {
        [project.name.as_str(), project.path.as_str()]
            .into_iter()
            .any(|candidate| {
                self.regex.as_ref().is_some_and(|r| r.is_match(candidate))
                    || self.glob.as_ref().is_some_and(|g| g.is_match(candidate))
            })
    }
}

/// Projects of `manifest` chosen by `selection`, in manifest order.
///
/// Without patterns, each argument must name a project by name or path;
/// without arguments, projects are chosen by manifest group. `exists`
/// reports whether a project is checked out.
///
/// # Errors
///
/// Returns an error for an invalid pattern or an argument that names no
/// project.
pub fn select_projects<'m>(
    manifest: &'m Manifest,
    selection: &Selection<'_>,
    exists: &dyn Fn(&Project) -> bool,
) -> Result<Vec<&'m Project>> {
    let mut chosen: Vec<&Project> = if selection.regex || selection.inverse {
        let patterns = selection
            .args
            .iter()
            .map(|p| ProjectPattern::new(p))
            .collect::<Result<Vec<_>>>()?;
        manifest
            .projects
            .iter()
            .filter(|project| patterns.iter().any(|p| p.matches(project)) != selection.inverse)
            .collect()
    } else if selection.args.is_empty() {
        let default_groups = ["default".to_string()];
        let groups = if selection.groups.is_empty() {
            &default_groups[..]
        } else {
            &selection.groups[..]
        };
        manifest
            .projects
            .iter()
            .filter(|project| project.matches_groups(groups))
            .collect()
    } else {
        let mut named = Vec::with_capacity(selection.args.len());
        for arg in selection.args {
            let arg = arg.trim_end_matches('/');
            let Some(project) = manifest
                .projects
                .iter()
                .find(|p| p.name == arg || p.path == arg)
            else {
                anyhow::bail!("project not found in manifest: {arg}");
            };
            if !named.iter().any(|p: &&Project| p.path == project.path) {
                named.push(project);
            }
        }
        named
    };

    if !selection.include_missing {
        chosen.retain(|project| {
            let keep = exists(project);
            if !keep {
                debug!(path = %project.path, "not checked out, skipped");
            }
            keep
        });
    }
    Ok(chosen)
}
