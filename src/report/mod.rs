// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Report renderers.
//!
//! ```text
//!                    DiffReport
//!                        |
//!      +-----------------+------------------+-----------------+
//!      v                 v                  v                 v
//!   --raw           (default)      --pretty-format csv   --pretty-format x.json
//!  text::render_raw  text::render_  csv::write_summary_  csv::write_commit_csv
//!                    colorized      csv (summarize)      + chat::write_chat_payload
//!                                                        (merge_commits)
//! ```
//!
//! Exactly one mode is active per invocation.

pub mod chat;
pub mod csv;
pub mod style;
pub mod text;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

/// Meaning of `--pretty-format`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrettyFormat {
    /// Per-author summary CSV.
    Csv,
    /// Chat payload built from a JSON template, plus a per-commit CSV.
    Template(PathBuf),
    /// A `git log --format` string for local repositories.
    Git(String),
}

impl PrettyFormat {
    /// Interpret `value` for a GitLab-backed (`hosted`) or local diff.
    ///
    /// Local diffs pass every value to git; the CSV and template modes need
    /// commit links and exist only for GitLab.
    #[must_use]
    pub fn parse(value: &str, hosted: bool) -> Self {
        if !hosted {
            return Self::Git(value.to_string());
        }
        if value.eq_ignore_ascii_case("csv") {
            Self::Csv
        } else {
            Self::Template(PathBuf::from(value))
        }
    }

    /// Git format to hand to `git log`, if any.
    #[must_use]
    pub fn git_format(&self) -> Option<&str> {
        match self {
            Self::Git(format) => Some(format),
            Self::Csv | Self::Template(_) => None,
        }
    }
}
