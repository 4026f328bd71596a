// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CSV reports. One header row, then one row per record.

use std::io::Write;
use std::path::Path;

use crate::diff::{CommitRecord, format_timestamp};
use crate::error::ReportError;

/// Columns of the per-author summary.
pub const SUMMARY_HEADER: [&str; 5] = [
    "project_name",
    "created_at",
    "web_url",
    "author_email",
    "author_name",
];

/// Columns of the per-commit listing.
pub const COMMIT_HEADER: [&str; 9] = [
    "added",
    "short_id",
    "project_name",
    "created_at",
    "author_email",
    "title",
    "committed_date",
    "web_url",
    "id",
];

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> ReportError + '_ {
    move |source| ReportError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn write_rows<W, const N: usize>(
    writer: W,
    header: [&str; N],
    rows: impl Iterator<Item = [String; N]>,
) -> Result<(), csv::Error>
where
    W: Write,
{
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn summary_row(record: &CommitRecord) -> [String; 5] {
    [
        record.project_name.clone(),
        format_timestamp(&record.created_at),
        record.web_url.clone(),
        record.author_email.clone(),
        record.author_name.clone(),
    ]
}

fn commit_row(record: &CommitRecord) -> [String; 9] {
    [
        record.direction.marker().to_string(),
        record.short_id.clone(),
        record.project_name.clone(),
        format_timestamp(&record.created_at),
        record.author_email.clone(),
        record.title.clone(),
        record.committed_date.clone(),
        record.web_url.clone(),
        record.id.clone(),
    ]
}

/// Write summary records (one per author and project) to `out`.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_summary(out: impl Write, records: &[CommitRecord]) -> Result<(), csv::Error> {
    write_rows(out, SUMMARY_HEADER, records.iter().map(summary_row))
}

/// Write one row per commit to `out`.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_commits(out: impl Write, records: &[CommitRecord]) -> Result<(), csv::Error> {
    write_rows(out, COMMIT_HEADER, records.iter().map(commit_row))
}

/// Write the summary CSV to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the file cannot be written.
pub fn write_summary_csv(path: &Path, records: &[CommitRecord]) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| csv_error(path)(e.into()))?;
    write_summary(std::io::BufWriter::new(file), records).map_err(csv_error(path))
}

/// Write the per-commit CSV to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the file cannot be written.
pub fn write_commit_csv(path: &Path, records: &[CommitRecord]) -> Result<(), ReportError> {
    let file = std::fs::File::create(path).map_err(|e| csv_error(path)(e.into()))?;
    write_commits(std::io::BufWriter::new(file), records).map_err(csv_error(path))
}
