// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ref listing of a local worktree.
//!
//! ```text
//! git for-each-ref --format=%(refname)<TAB>%(objectname)<TAB>%(*objectname)
//!
//! refs/heads/<n>            → refs/heads/<n>
//! refs/remotes/<r>/<n>      → refs/heads/<n>   (written after local heads)
//! refs/remotes/<r>/HEAD     → skipped
//! refs/tags/<n>             → refs/tags/<n>    (annotated tags peeled)
//! ```

use crate::diff::RefMap;

/// `--format` argument matching [`parse_for_each_ref`].
pub const FOR_EACH_REF_FORMAT: &str = "--format=%(refname)%09%(objectname)%09%(*objectname)";

/// Build a [`RefMap`] from `git for-each-ref` output.
///
/// Remote-tracking branches are folded into `refs/heads/` and take
/// precedence over local branches of the same name; a repo checkout tracks
/// the manifest through its remotes.
#[must_use]
pub fn parse_for_each_ref(output: &str) -> RefMap {
    let mut local = Vec::new();
    let mut tracking = Vec::new();
    let mut tags = Vec::new();

    for line in output.lines() {
        let mut fields = line.split('\t');
        let (Some(name), Some(object)) = (fields.next(), fields.next()) else {
            continue;
        };
        let peeled = fields.next().filter(|p| !p.is_empty());
        let id = peeled.unwrap_or(object);
        if id.is_empty() {
            continue;
        }

        if name.starts_with("refs/heads/") {
            local.push((name.to_string(), id));
        } else if let Some(rest) = name.strip_prefix("refs/remotes/") {
            let Some((_remote, branch)) = rest.split_once('/') else {
                continue;
            };
            if branch != "HEAD" {
                tracking.push((format!("refs/heads/{branch}"), id));
            }
        } else if name.starts_with("refs/tags/") {
            tags.push((name.to_string(), id));
        }
    }

    local.into_iter().chain(tracking).chain(tags).collect()
}
