// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `git log` record format.
//!
//! ```text
//! %H US %h US %an US %ae US %cn US %cI US %s [US <user format>] RS
//! US = 0x1f, RS = 0x1e
//! ```

use crate::diff::{CommitRecord, Direction, parse_timestamp};
use crate::error::{GitError, RepoResult};

const UNIT: char = '\x1f';
const RECORD: char = '\x1e';
const FIELDS: usize = 7;

/// `--format` argument for [`parse_log`], optionally carrying a user pretty
/// format whose expansion becomes [`CommitRecord::formatted`].
#[must_use]
pub fn log_format(pretty_format: Option<&str>) -> String {
    let mut format = String::from("--format=%H%x1f%h%x1f%an%x1f%ae%x1f%cn%x1f%cI%x1f%s");
    if let Some(user) = pretty_format {
        format.push_str("%x1f");
        format.push_str(user);
    }
    format.push_str("%x1e");
    format
}

/// Parse `git log` output produced with [`log_format`].
///
/// # Errors
///
/// Returns [`GitError::MalformedLog`] for a record with missing fields, or a
/// timestamp error if the committer date is not ISO-8601.
pub fn parse_log(
    output: &str,
    project_name: &str,
    location: &str,
    with_user_format: bool,
) -> RepoResult<Vec<CommitRecord>> {
    let mut commits = Vec::new();

    for record in output.split(RECORD) {
        let record = record.trim_matches(|c| c == '\n' || c == '\r');
        if record.is_empty() {
            continue;
        }
        let limit = if with_user_format { FIELDS + 1 } else { FIELDS };
        let fields: Vec<&str> = record.splitn(limit, UNIT).collect();
        if fields.len() < FIELDS {
            return Err(GitError::MalformedLog {
                path: location.to_string(),
                record: record.to_string(),
            }
            .into());
        }

        commits.push(CommitRecord {
            id: fields[0].to_string(),
            short_id: fields[1].to_string(),
            project_name: project_name.to_string(),
            author_name: fields[2].to_string(),
            author_email: fields[3].to_string(),
            committer_name: fields[4].to_string(),
            created_at: parse_timestamp(fields[5])?,
            committed_date: fields[5].to_string(),
            title: fields[6].to_string(),
            web_url: String::new(),
            direction: Direction::Added,
            formatted: fields.get(FIELDS).map(|s| (*s).to_string()),
        });
    }

    Ok(commits)
}
