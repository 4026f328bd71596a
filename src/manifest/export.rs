// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Manifest writer for `gitlab --to-manifest`.

use std::io::Write;

/// `<remote>` and `<default>` of an exported manifest.
#[derive(Debug, Clone)]
pub struct ExportHeader {
    pub remote_name: String,
    pub fetch: String,
    pub revision: String,
    pub sync_jobs: u32,
}

/// Write a manifest with one `<project name=.../>` per entry.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_manifest<W: Write>(
    out: &mut W,
    header: &ExportHeader,
    project_names: &[String],
) -> std::io::Result<()> {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, "<manifest>")?;
    writeln!(
        out,
        r#"  <remote name="{}" fetch="{}" />"#,
        escape_attr(&header.remote_name),
        escape_attr(&header.fetch)
    )?;
    writeln!(
        out,
        r#"  <default revision="{}" remote="{}" sync-j="{}" />"#,
        escape_attr(&header.revision),
        escape_attr(&header.remote_name),
        header.sync_jobs
    )?;
    for name in project_names {
        writeln!(out, r#"  <project name="{}" />"#, escape_attr(name))?;
    }
    writeln!(out, "</manifest>")
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
