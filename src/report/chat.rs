// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chat-webhook rich-text payload.
//!
//! ```text
//! template.json                       <prefix>template.json
//! { "content": { "post": { ...        { ... same structure ...
//!     "content": [[ header ...          [[ header ...,
//!                                          "[+]" <a short_id> project @author ts title   x <= threshold
//!                                          <a "id,id,id,... There are a total of N. FYI." href=csv>
//!     ]] } } }                          ]] }
//! ```
//!
//! The CSV link is the first template link whose path has a `browse`
//! segment, with that segment replaced by `file` and the CSV file name
//! appended.

use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use url::Url;

use crate::diff::{CommitRecord, MergedReport, format_timestamp};
use crate::error::ReportError;

#[derive(Debug, Clone, Copy)]
pub struct ChatOptions<'a> {
    /// JSON pointer to the rich-text element array to extend.
    pub content_pointer: &'a str,
    /// Number of short ids previewed in the overflow notice.
    pub preview: usize,
    /// File name of the companion CSV.
    pub csv_name: &'a str,
}

/// Elements describing one commit.
#[must_use]
pub fn commit_elements(commit: &CommitRecord) -> [Value; 6] {
    [
        json!({"tag": "text", "text": commit.direction.marker()}),
        json!({"tag": "a", "text": commit.short_id, "href": commit.web_url}),
        json!({"tag": "text", "text": commit.project_name}),
        json!({"tag": "at", "user_id": commit.author_email}),
        json!({"tag": "text", "text": format_timestamp(&commit.created_at)}),
        json!({"tag": "text", "text": format!("{}\n", commit.title)}),
    ]
}

/// Link to the CSV derived from the template's `browse` link, if any.
#[must_use]
pub fn csv_link(elements: &[Value], csv_name: &str) -> Option<String> {
    elements.iter().find_map(|element| {
        let mut href = Url::parse(element.get("href")?.as_str()?).ok()?;
        let segments: Vec<String> = href.path_segments()?.map(str::to_string).collect();
        if !segments.iter().any(|s| s == "browse") {
            return None;
        }
        {
            let mut path = href.path_segments_mut().ok()?;
            path.clear();
            for segment in segments.iter().filter(|s| !s.is_empty()) {
                path.push(if segment == "browse" { "file" } else { segment.as_str() });
            }
            path.push(csv_name);
        }
        Some(href.to_string())
    })
}

/// Closing notice: the next short ids past the threshold, if any, and the
/// total count, linking to the CSV.
fn footer(report: &MergedReport, preview: usize, link: &str) -> Value {
    let total = format!("There are a total of {}. FYI.", report.total());
    let overflow = report.overflow();
    let text = if overflow.is_empty() {
        total
    } else {
        let ids: Vec<&str> = overflow
            .iter()
            .take(preview)
            .map(|c| c.short_id.as_str())
            .collect();
        format!("{},... {total}", ids.join(","))
    };
    json!({"tag": "a", "text": text, "href": link})
}

/// Append the commits of `report` to the template's element array.
///
/// The template is otherwise left as is. `template_name` is only used in
/// error messages.
///
/// # Errors
///
/// Returns [`ReportError::MissingContent`] if `content_pointer` does not
/// name an array in the template.
pub fn render_chat_payload(
    mut template: Value,
    report: &MergedReport,
    options: &ChatOptions<'_>,
    template_name: &str,
) -> Result<Value, ReportError> {
    let missing = || ReportError::MissingContent {
        path: template_name.to_string(),
        pointer: options.content_pointer.to_string(),
    };
    let elements = template
        .pointer_mut(options.content_pointer)
        .and_then(Value::as_array_mut)
        .ok_or_else(missing)?;

    let link = csv_link(elements, options.csv_name).unwrap_or_default();
    for commit in report.visible() {
        elements.extend(commit_elements(commit));
    }
    elements.push(footer(report, options.preview, &link));

    Ok(template)
}

/// Render the payload for `template_path` and write it to
/// `<output_dir>/<prefix><template file name>`.
///
/// Nothing is written for an empty report; the written path is returned
/// otherwise.
///
/// # Errors
///
/// Returns [`ReportError::Json`] if the template is not valid JSON,
/// [`ReportError::MissingContent`] if it lacks the element array, or an
/// I/O error if a file cannot be read or written.
pub fn write_chat_payload(
    template_path: &Path,
    output_dir: &Path,
    prefix: &str,
    report: &MergedReport,
    options: &ChatOptions<'_>,
) -> crate::error::RepoResult<Option<PathBuf>> {
    if report.commits.is_empty() {
        return Ok(None);
    }
    let name = template_path.display().to_string();
    let text = std::fs::read_to_string(template_path)?;
    let template: Value = serde_json::from_str(&text).map_err(|source| ReportError::Json {
        path: name.clone(),
        source,
    })?;
    let payload = render_chat_payload(template, report, options, &name)?;

    let file_name = template_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = output_dir.join(format!("{prefix}{file_name}"));
    let body = serde_json::to_string(&payload).map_err(|source| ReportError::Json {
        path: target.display().to_string(),
        source,
    })?;
    std::fs::write(&target, body)?;
    Ok(Some(target))
}
