// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use serde_json::{Value, json};
use tempfile::TempDir;

use super::PrettyFormat;
use super::chat::{ChatOptions, csv_link, render_chat_payload, write_chat_payload};
use super::csv::{write_commits, write_summary};
use super::style::{Channel, Coloring};
use super::text::{CommitLayout, commit_line, render_colorized, render_raw};
use crate::diff::{
    CommitRecord, Comparison, DiffReport, Direction, MergedReport, ProjectDelta, RevisionId,
    merge_commits, parse_timestamp,
};
use crate::manifest::Project;
use crate::manifest::diff::{ProjectPair, ProjectsDiff};

const POINTER: &str = "/content/post/zh_cn/content/0";

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn project(path: &str, revision: &str) -> Project {
    Project {
        name: format!("platform/{path}"),
        path: path.to_string(),
        revision: revision.to_string(),
        remote: "origin".to_string(),
        remote_url: format!("https://git.example.com/platform/{path}.git"),
        groups: Vec::new(),
    }
}

fn commit(short: &str, ts: &str, direction: Direction) -> CommitRecord {
    CommitRecord {
        id: format!("{short}000000"),
        short_id: short.to_string(),
        project_name: "platform/app".to_string(),
        author_email: "alice@example.com".to_string(),
        author_name: "Alice".to_string(),
        committer_name: "Bob".to_string(),
        title: format!("change {short}"),
        created_at: parse_timestamp(ts).expect("valid timestamp"),
        committed_date: ts.to_string(),
        web_url: format!("https://git.example.com/platform/app/-/commit/{short}"),
        direction,
        formatted: None,
    }
}

fn comparison(commits: Vec<CommitRecord>) -> Comparison {
    Comparison {
        head: commits.iter().map(|c| c.created_at).max(),
        has_changes: !commits.is_empty(),
        commits,
    }
}

fn delta(path: &str, forward: Vec<CommitRecord>, backward: Vec<CommitRecord>) -> ProjectDelta {
    ProjectDelta {
        pair: ProjectPair {
            from: project(path, "v1"),
            to: project(path, "v2"),
        },
        from_id: RevisionId::new("aaaa"),
        to_id: RevisionId::new("bbbb"),
        forward: comparison(forward),
        backward: comparison(backward),
        web_url: format!("https://git.example.com/platform/{path}"),
    }
}

fn two_commit_report() -> DiffReport {
    DiffReport {
        diff: ProjectsDiff {
            added: vec![project("foo", "deadbeef")],
            removed: vec![project("old", "main")],
            unreachable: vec![ProjectPair {
                from: project("lost", "gone"),
                to: project("lost", "also-gone"),
            }],
            ..ProjectsDiff::default()
        },
        deltas: vec![delta(
            "app",
            vec![commit("add1", "2024-01-01T10:00:00.000000+00:00", Direction::Added)],
            vec![commit("rem1", "2024-01-01T09:00:00.000000+00:00", Direction::Removed)],
        )],
    }
}

fn template() -> Value {
    json!({
        "msg_type": "post",
        "content": {"post": {"zh_cn": {
            "title": "nightly",
            "content": [[
                {"tag": "text", "text": "build "},
                {"tag": "a", "text": "browser", "href": "https://files.example.com/nightly/browse/42"}
            ]]
        }}}
    })
}

fn options() -> ChatOptions<'static> {
    ChatOptions {
        content_pointer: POINTER,
        preview: 3,
        csv_name: "commits.csv",
    }
}

fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).expect("render");
    String::from_utf8(out).expect("utf-8")
}

#[test]
fn test_commit_line_variants() {
    let mut c = commit("abc1234", "2024-01-01T10:00:00+08:00", Direction::Added);
    assert_eq!(
        commit_line(&c),
        "[abc1234](https://git.example.com/platform/app/-/commit/abc1234):2024-01-01 10:00:00  Bob:change abc1234"
    );
    c.web_url.clear();
    assert_eq!(commit_line(&c), "abc1234 change abc1234");
    c.formatted = Some("custom".to_string());
    assert_eq!(commit_line(&c), "custom");
}

#[test]
fn test_raw_report_lines() {
    let report = two_commit_report();
    let text = render(|out| render_raw(&report, out));
    assert!(text.lines().any(|l| l == "A foo deadbeef"));
    insta::assert_snapshot!(text, @r"
    A foo deadbeef
    R old main
    C app v1 v2
     R [rem1](https://git.example.com/platform/app/-/commit/rem1):2024-01-01 09:00:00  Bob:change rem1
     A [add1](https://git.example.com/platform/app/-/commit/add1):2024-01-01 10:00:00  Bob:change add1
    U lost gone also-gone
    ");
}

#[test]
fn test_colorized_plain_per_project() {
    let report = two_commit_report();
    let text = render(|out| {
        render_colorized(&report, CommitLayout::PerProject, Coloring::plain(), out)
    });
    assert_eq!(
        text,
        "\nadded projects : \n\n\tfoo at revision deadbeef\n\
         \nremoved projects : \n\n\told at revision main\n\
         \nchanged projects : \n\n\tapp changed from v1 to v2\n\
         \t\t[-] [rem1](https://git.example.com/platform/app/-/commit/rem1):2024-01-01 09:00:00  Bob:change rem1\n\
         \t\t[+] [add1](https://git.example.com/platform/app/-/commit/add1):2024-01-01 10:00:00  Bob:change add1\n\
         \n\
         \nprojects with unreachable revisions : \n\n\tlost gone or also-gone not found\n"
    );
}

#[test]
fn test_colorized_timeline_follows_merge_order() {
    let report = DiffReport {
        diff: ProjectsDiff::default(),
        deltas: vec![
            delta(
                "app",
                vec![commit("late", "2024-01-01T12:00:00+00:00", Direction::Added)],
                Vec::new(),
            ),
            delta(
                "lib",
                vec![commit("early", "2024-01-01T08:00:00+00:00", Direction::Added)],
                Vec::new(),
            ),
        ],
    };
    let merged = merge_commits(&report.deltas);
    let text = render(|out| {
        render_colorized(&report, CommitLayout::Timeline(&merged), Coloring::plain(), out)
    });
    let early = text.find("[early]").expect("early listed");
    let late = text.find("[late]").expect("late listed");
    assert!(early < late);
    assert!(text.contains("\tlib changed from v1 to v2\n"));

    let hidden = render(|out| render_colorized(&report, CommitLayout::Hidden, Coloring::plain(), out));
    assert!(!hidden.contains("[+]"));
}

#[test]
fn test_coloring_only_styles_when_enabled() {
    let plain = Coloring::plain().printer(Channel::Added)("x");
    assert_eq!(plain, "x");
    let colored = Coloring::new(true).printer(Channel::Added)("x");
    assert!(colored.contains("\u{1b}["), "{colored:?}");
    assert_eq!(Coloring::new(true).printer(Channel::Text)("x"), "x");
}

#[test]
fn test_commit_csv_two_commit_scenario() {
    let report = two_commit_report();
    let merged = merge_commits(&report.deltas);
    assert_eq!(merged[0].short_id, "rem1");
    assert_eq!(merged[1].short_id, "add1");

    let mut out = Vec::new();
    write_commits(&mut out, &merged).expect("csv");
    let text = String::from_utf8(out).expect("utf-8");
    assert_eq!(text.lines().count(), 3);
    insta::assert_snapshot!(text, @r"
    added,short_id,project_name,created_at,author_email,title,committed_date,web_url,id
    [-],rem1,platform/app,2024-01-01 09:00:00 ,alice@example.com,change rem1,2024-01-01T09:00:00.000000+00:00,https://git.example.com/platform/app/-/commit/rem1,rem1000000
    [+],add1,platform/app,2024-01-01 10:00:00 ,alice@example.com,change add1,2024-01-01T10:00:00.000000+00:00,https://git.example.com/platform/app/-/commit/add1,add1000000
    ");
}

#[test]
fn test_summary_csv_header_once() {
    let records = vec![
        commit("a", "2024-01-01T10:00:00+00:00", Direction::Added),
        commit("b", "2024-01-01T11:00:00+00:00", Direction::Added),
    ];
    let mut out = Vec::new();
    write_summary(&mut out, &records).expect("csv");
    let text = String::from_utf8(out).expect("utf-8");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "project_name,created_at,web_url,author_email,author_name");
    assert_eq!(lines.iter().filter(|l| l.starts_with("project_name")).count(), 1);
}

#[test]
fn test_csv_link_rewrites_browse_segment() {
    let elements = vec![
        json!({"tag": "a", "text": "docs", "href": "https://docs.example.com/readme"}),
        json!({"tag": "a", "text": "browser", "href": "https://files.example.com/nightly/browse/42/"}),
    ];
    assert_eq!(
        csv_link(&elements, "commits.csv").as_deref(),
        Some("https://files.example.com/nightly/file/42/commits.csv")
    );
    assert_eq!(csv_link(&elements[..1], "commits.csv"), None);
}

#[test]
fn test_chat_payload_small_report() {
    let report = MergedReport::new(
        vec![commit("c1", "2024-01-01T10:00:00+00:00", Direction::Removed)],
        32,
    );
    let payload = render_chat_payload(template(), &report, &options(), "t.json").expect("payload");
    let elements = payload.pointer(POINTER).and_then(Value::as_array).expect("array");
    assert_eq!(elements.len(), 2 + 6 + 1);
    assert_eq!(payload["msg_type"], "post");
    assert_eq!(payload["content"]["post"]["zh_cn"]["title"], "nightly");
    let added = serde_json::to_string_pretty(&elements[2..]).expect("json");
    insta::assert_snapshot!(added, @r#"
    [
      {
        "tag": "text",
        "text": "[-]"
      },
      {
        "href": "https://git.example.com/platform/app/-/commit/c1",
        "tag": "a",
        "text": "c1"
      },
      {
        "tag": "text",
        "text": "platform/app"
      },
      {
        "tag": "at",
        "user_id": "alice@example.com"
      },
      {
        "tag": "text",
        "text": "2024-01-01 10:00:00 "
      },
      {
        "tag": "text",
        "text": "change c1\n"
      },
      {
        "href": "https://files.example.com/nightly/file/42/commits.csv",
        "tag": "a",
        "text": "There are a total of 1. FYI."
      }
    ]
    "#);
}

#[test]
fn test_chat_payload_overflow_of_35_commits() {
    let commits: Vec<CommitRecord> = (1..=35)
        .map(|i| {
            commit(
                &format!("c{i}"),
                &format!("2024-01-01T10:{i:02}:00+00:00"),
                Direction::Added,
            )
        })
        .collect();
    let report = MergedReport::new(commits, 32);
    let payload = render_chat_payload(template(), &report, &options(), "t.json").expect("payload");
    let elements = payload.pointer(POINTER).and_then(Value::as_array).expect("array");

    let commit_entries = elements.iter().filter(|e| e["tag"] == "at").count();
    assert_eq!(commit_entries, 32);
    assert_eq!(elements.len(), 2 + 32 * 6 + 1);

    let footer = elements.last().expect("footer");
    let text = footer["text"].as_str().expect("text");
    assert_eq!(text, "c33,c34,c35,... There are a total of 35. FYI.");
    assert!(text.contains("35"));
    assert_eq!(footer["href"], "https://files.example.com/nightly/file/42/commits.csv");
}

#[test]
fn test_chat_payload_requires_content_array() {
    let report = MergedReport::new(
        vec![commit("c1", "2024-01-01T10:00:00+00:00", Direction::Added)],
        32,
    );
    let err = render_chat_payload(json!({"content": {}}), &report, &options(), "bad.json")
        .expect_err("no array");
    assert!(err.to_string().contains("bad.json"), "{err}");
}

#[test]
fn test_write_chat_payload_file() {
    let temp = temp_dir();
    let template_path = temp.path().join("msg.json");
    std::fs::write(&template_path, template().to_string()).expect("write template");
    let out_dir = temp.path().join("out");
    std::fs::create_dir(&out_dir).expect("mkdir");

    let empty = MergedReport::new(Vec::new(), 32);
    let written = write_chat_payload(&template_path, &out_dir, "feishu_", &empty, &options())
        .expect("empty report");
    assert!(written.is_none());
    assert!(!out_dir.join("feishu_msg.json").exists());

    let report = MergedReport::new(
        vec![commit("c1", "2024-01-01T10:00:00+00:00", Direction::Added)],
        32,
    );
    let written = write_chat_payload(&template_path, &out_dir, "feishu_", &report, &options())
        .expect("payload")
        .expect("written");
    assert_eq!(written, out_dir.join("feishu_msg.json"));
    let parsed: Value =
        serde_json::from_str(&std::fs::read_to_string(&written).expect("read")).expect("json");
    assert_eq!(
        parsed.pointer(POINTER).and_then(Value::as_array).map(Vec::len),
        Some(9)
    );
}

#[test]
fn test_pretty_format_parse() {
    assert_eq!(PrettyFormat::parse("csv", true), PrettyFormat::Csv);
    assert_eq!(
        PrettyFormat::parse("msg.json", true),
        PrettyFormat::Template("msg.json".into())
    );
    let local = PrettyFormat::parse("%h %s", false);
    assert_eq!(local.git_format(), Some("%h %s"));
    assert_eq!(PrettyFormat::Csv.git_format(), None);
}
