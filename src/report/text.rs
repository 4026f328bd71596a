// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Plain and colorized text reports.
//!
//! ```text
//! raw                              colorized
//! A <path> <rev>                   added projects :
//! R <path> <rev>                   	<path> at revision <rev>
//! C <path> <from> <to>             changed projects :
//!  R <commit line>                 	<path> changed from <from> to <to>
//!  A <commit line>                 		[-] <commit line>
//! U <path> <from> <to>             		[+] <commit line>
//! ```

use std::io::{self, Write};

use super::style::{Channel, Coloring};
use crate::diff::{CommitRecord, DiffReport, Direction, ProjectDelta, format_timestamp};
use crate::manifest::Project;

/// How commits are laid out under `changed projects`.
#[derive(Debug, Clone, Copy)]
pub enum CommitLayout<'a> {
    /// Each project's commits below its own line, removed first.
    PerProject,
    /// One time-ordered list after all changed projects.
    Timeline(&'a [CommitRecord]),
    /// Project lines only.
    Hidden,
}

/// One-line rendering of a commit.
///
/// A user pretty format wins; commits with a web link render as
/// `[short](url):<timestamp> <committer>:<title>`, others as `short title`.
#[must_use]
pub fn commit_line(commit: &CommitRecord) -> String {
    if let Some(formatted) = &commit.formatted {
        return formatted.clone();
    }
    if commit.web_url.is_empty() {
        return format!("{} {}", commit.short_id, commit.title);
    }
    format!(
        "[{}]({}):{} {}:{}",
        commit.short_id,
        commit.web_url,
        format_timestamp(&commit.created_at),
        commit.committer_name,
        commit.title
    )
}

fn removed_then_added(delta: &ProjectDelta) -> impl Iterator<Item = &CommitRecord> {
    delta
        .backward
        .commits
        .iter()
        .chain(delta.forward.commits.iter())
}

/// Parser-friendly report without colors.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_raw(report: &DiffReport, out: &mut impl Write) -> io::Result<()> {
    let diff = &report.diff;
    for project in &diff.added {
        writeln!(out, "A {} {}", project.path, project.revision)?;
    }
    for project in &diff.removed {
        writeln!(out, "R {} {}", project.path, project.revision)?;
    }
    for delta in &report.deltas {
        let (from, to) = (&delta.pair.from, &delta.pair.to);
        writeln!(out, "C {} {} {}", from.path, from.revision, to.revision)?;
        for commit in removed_then_added(delta) {
            let code = commit.direction.raw_code();
            writeln!(out, " {code} {}", commit_line(commit))?;
        }
    }
    for pair in &diff.unreachable {
        writeln!(
            out,
            "U {} {} {}",
            pair.from.path, pair.from.revision, pair.to.revision
        )?;
    }
    Ok(())
}

struct Painter {
    text: Box<dyn Fn(&str) -> String>,
    project: Box<dyn Fn(&str) -> String>,
    added: Box<dyn Fn(&str) -> String>,
    removed: Box<dyn Fn(&str) -> String>,
    revision: Box<dyn Fn(&str) -> String>,
}

impl Painter {
    fn new(coloring: Coloring) -> Self {
        Self {
            text: Box::new(coloring.printer(Channel::Text)),
            project: Box::new(coloring.printer(Channel::Project)),
            added: Box::new(coloring.printer(Channel::Added)),
            removed: Box::new(coloring.printer(Channel::Removed)),
            revision: Box::new(coloring.printer(Channel::Revision)),
        }
    }

    fn marker(&self, direction: Direction) -> String {
        let marker = format!("\t\t{} ", direction.marker());
        match direction {
            Direction::Added => (self.added)(&marker),
            Direction::Removed => (self.removed)(&marker),
        }
    }

    fn section(&self, out: &mut impl Write, title: &str) -> io::Result<()> {
        write!(out, "\n{}\n", (self.text)(&format!("{title} : \n")))
    }

    fn at_revision(&self, out: &mut impl Write, project: &Project) -> io::Result<()> {
        writeln!(
            out,
            "{}{}{}",
            (self.project)(&format!("\t{}", project.path)),
            (self.text)(" at revision "),
            (self.revision)(&project.revision)
        )
    }

    fn changed_from(&self, out: &mut impl Write, from: &Project, to: &Project) -> io::Result<()> {
        writeln!(
            out,
            "{}{}{}{}{}",
            (self.project)(&format!("\t{}", from.path)),
            (self.text)(" changed from "),
            (self.revision)(&from.revision),
            (self.text)(" to "),
            (self.revision)(&to.revision)
        )
    }

    fn commit(&self, out: &mut impl Write, commit: &CommitRecord) -> io::Result<()> {
        writeln!(
            out,
            "{}{}",
            self.marker(commit.direction),
            (self.text)(&commit_line(commit))
        )
    }
}

/// Human-readable report grouped into sections.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render_colorized(
    report: &DiffReport,
    layout: CommitLayout<'_>,
    coloring: Coloring,
    out: &mut impl Write,
) -> io::Result<()> {
    let diff = &report.diff;
    let paint = Painter::new(coloring);

    for (title, projects) in [
        ("added projects", &diff.added),
        ("removed projects", &diff.removed),
        ("missing projects", &diff.missing),
    ] {
        if projects.is_empty() {
            continue;
        }
        paint.section(out, title)?;
        for project in projects {
            paint.at_revision(out, project)?;
        }
    }

    if !report.deltas.is_empty() {
        paint.section(out, "changed projects")?;
        for delta in &report.deltas {
            paint.changed_from(out, &delta.pair.from, &delta.pair.to)?;
            if matches!(layout, CommitLayout::PerProject) {
                for commit in removed_then_added(delta) {
                    paint.commit(out, commit)?;
                }
                writeln!(out)?;
            }
        }
        if let CommitLayout::Timeline(commits) = layout {
            for commit in commits {
                paint.commit(out, commit)?;
            }
            writeln!(out)?;
        }
    }

    if !diff.unreachable.is_empty() {
        paint.section(out, "projects with unreachable revisions")?;
        for pair in &diff.unreachable {
            writeln!(
                out,
                "{}{}{}{}{}",
                (paint.project)(&format!("\t{} ", pair.from.path)),
                (paint.revision)(&pair.from.revision),
                (paint.text)(" or "),
                (paint.revision)(&pair.to.revision),
                (paint.text)(" not found")
            )?;
        }
    }

    Ok(())
}
