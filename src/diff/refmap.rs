// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ref maps and revision resolution.
//!
//! ```text
//! resolve("v1.0", refs)
//!   1. 40/64 hex + accept_commit_ids  → as-is
//!   2. starts with "refs/"            → refs["v1.0"]
//!   3.                                → refs["refs/heads/v1.0"]
//!   4.                                → refs["refs/tags/v1.0"]
//!   otherwise                         → None (unreachable)
//! ```

use std::collections::BTreeMap;
use std::fmt;

/// An immutable commit id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId(String);

impl RevisionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ref name (`refs/heads/<n>`, `refs/tags/<n>`) to commit id, for one
/// project on one manifest side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefMap(BTreeMap<String, RevisionId>);

impl RefMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ref; an existing entry is replaced.
    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.0.insert(name.into(), RevisionId::new(id));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RevisionId> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RevisionId)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RefMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Maps declared revisions to commit ids.
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    accept_commit_ids: bool,
}

impl Resolver {
    #[must_use]
    pub const fn new(accept_commit_ids: bool) -> Self {
        Self { accept_commit_ids }
    }

    /// Resolve `revision` against `refs`. `None` means unresolvable.
    #[must_use]
    pub fn resolve(&self, revision: &str, refs: &RefMap) -> Option<RevisionId> {
        if self.accept_commit_ids && is_commit_id(revision) {
            return Some(RevisionId::new(revision));
        }
        if revision.starts_with("refs/") {
            return refs.get(revision).cloned();
        }
        refs.get(&format!("refs/heads/{revision}"))
            .or_else(|| refs.get(&format!("refs/tags/{revision}")))
            .cloned()
    }
}

/// A full SHA-1 or SHA-256 object id.
#[must_use]
pub fn is_commit_id(value: &str) -> bool {
    matches!(value.len(), 40 | 64) && value.bytes().all(|b| b.is_ascii_hexdigit())
}
