// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Project-level diff of two manifests.
//!
//! ```text
//!   for p in A (declaration order):
//!     path not in B           → removed
//!     probe(p) == false       → missing   (B's project, local mode only)
//!     revision differs        → changed   (A, B)
//!     otherwise               → unchanged (A, B)
//!   for p in B not seen       → added
//!
//!   unreachable is filled later, when a changed pair cannot be resolved
//! ```

use std::collections::HashMap;

use super::{Manifest, Project};

/// A project present in both manifests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPair {
    pub from: Project,
    pub to: Project,
}

/// Partition of the projects of two manifests.
///
/// Every project path of A ∪ B lands in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectsDiff {
    pub added: Vec<Project>,
    pub removed: Vec<Project>,
    pub missing: Vec<Project>,
    pub changed: Vec<ProjectPair>,
    pub unreachable: Vec<ProjectPair>,
    pub unchanged: Vec<ProjectPair>,
}

impl ProjectsDiff {
    /// Whether nothing differs between the two manifests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.missing.is_empty()
            && self.changed.is_empty()
            && self.unreachable.is_empty()
    }
}

/// Diff manifest `a` against manifest `b`, keyed by project path.
///
/// `probe` reports whether a project's worktree exists. It is only supplied
/// when diffing against a local checkout; without it nothing is `missing`.
#[must_use]
pub fn projects_diff(
    a: &Manifest,
    b: &Manifest,
    probe: Option<&dyn Fn(&Project) -> bool>,
) -> ProjectsDiff {
    let to_by_path: HashMap<&str, &Project> =
        b.projects.iter().map(|p| (p.path.as_str(), p)).collect();
    let mut seen = std::collections::HashSet::new();
    let mut diff = ProjectsDiff::default();

    for from in &a.projects {
        let Some(&to) = to_by_path.get(from.path.as_str()) else {
            diff.removed.push(from.clone());
            continue;
        };
        seen.insert(to.path.as_str());

        if let Some(exists) = probe
            && !exists(from)
        {
            diff.missing.push(to.clone());
            continue;
        }

        let pair = ProjectPair {
            from: from.clone(),
            to: to.clone(),
        };
        if from.revision == to.revision {
            diff.unchanged.push(pair);
        } else {
            diff.changed.push(pair);
        }
    }

    diff.added = b
        .projects
        .iter()
        .filter(|p| !seen.contains(p.path.as_str()))
        .cloned()
        .collect();

    diff
}
