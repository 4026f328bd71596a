// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! GitLab REST payloads.
//!
//! Only the fields this crate reads are declared; everything else in a
//! response is ignored. Nothing here leaves the `gitlab` module except
//! through [`CommitInfo::into_record`] and the `RefMap` built by
//! [`super::GitlabSource`].

use serde::{Deserialize, Serialize};

use crate::diff::{CommitRecord, Direction, parse_timestamp};
use crate::error::ReportError;

/// `access_level` values of protected branches.
pub mod access {
    pub const NO_ACCESS: u8 = 0;
    pub const DEVELOPER: u8 = 30;
    pub const MAINTAINER: u8 = 40;
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectInfo {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub web_url: String,
    #[serde(default)]
    pub empty_repo: bool,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub full_path: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefCommit {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub commit: RefCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagInfo {
    pub name: String,
    pub commit: RefCommit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub short_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub committer_name: String,
    pub created_at: String,
    #[serde(default)]
    pub committed_date: String,
    #[serde(default)]
    pub web_url: String,
}

impl CommitInfo {
    /// Convert to a [`CommitRecord`] attributed to `project_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Timestamp`] if `created_at` is not ISO-8601.
    pub fn into_record(self, project_name: &str) -> Result<CommitRecord, ReportError> {
        Ok(CommitRecord {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            short_id: self.short_id,
            project_name: project_name.to_string(),
            author_email: self.author_email,
            author_name: self.author_name,
            committer_name: self.committer_name,
            title: self.title,
            committed_date: self.committed_date,
            web_url: self.web_url,
            direction: Direction::Added,
            formatted: None,
        })
    }
}

/// Result of `repository/compare`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompareInfo {
    /// Newest commit of the range, absent when the range is empty.
    #[serde(default)]
    pub commit: Option<CommitInfo>,
    #[serde(default)]
    pub commits: Vec<CommitInfo>,
    #[serde(default)]
    pub diffs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AccessLevel {
    pub access_level: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProtectedBranch {
    pub name: String,
    #[serde(default)]
    pub push_access_levels: Vec<AccessLevel>,
    #[serde(default)]
    pub merge_access_levels: Vec<AccessLevel>,
}

impl ProtectedBranch {
    /// Whether the first push and merge rules carry the given levels.
    #[must_use]
    pub fn grants(&self, push: u8, merge: u8) -> bool {
        self.push_access_levels.first().map(|a| a.access_level) == Some(push)
            && self.merge_access_levels.first().map(|a| a.access_level) == Some(merge)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMirror {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
}

// --- request bodies ---

#[derive(Debug, Serialize)]
pub(crate) struct NewGroup<'a> {
    pub(crate) name: &'a str,
    pub(crate) path: &'a str,
    pub(crate) parent_id: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProject<'a> {
    pub(crate) name: &'a str,
    pub(crate) path: &'a str,
    pub(crate) namespace_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) merge_method: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewBranch<'a> {
    pub(crate) branch: &'a str,
    #[serde(rename = "ref")]
    pub(crate) from: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTag<'a> {
    pub(crate) tag_name: &'a str,
    #[serde(rename = "ref")]
    pub(crate) from: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewProtection<'a> {
    pub(crate) name: &'a str,
    pub(crate) push_access_level: u8,
    pub(crate) merge_access_level: u8,
}

#[derive(Debug, Serialize)]
pub(crate) struct MergeMethodUpdate<'a> {
    pub(crate) merge_method: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewMirror<'a> {
    pub(crate) url: &'a str,
    pub(crate) enabled: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct MirrorUpdate {
    pub(crate) enabled: bool,
}
