// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::gitlab::MergeMethod;
use crate::cli::{Cli, Command};
use clap::Parser;
use clap::error::ErrorKind;

fn diff_args(argv: &[&str]) -> crate::cli::diff::DiffManifestsArgs {
    match Cli::try_parse_from(argv).unwrap().command {
        Some(Command::Diffmanifests(args)) => args,
        other => panic!("unexpected command: {other:?}"),
    }
}

fn gitlab_args(argv: &[&str]) -> crate::cli::gitlab::GitlabArgs {
    match Cli::try_parse_from(argv).unwrap().command {
        Some(Command::Gitlab(args)) => args,
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["repolab", "version"]).unwrap();
    insta::assert_debug_snapshot!(cli.command, @r"
    Some(
        Version,
    )
    ");
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "repolab",
        "-l",
        "5",
        "--set",
        "gitlab/url=https://git.example.com",
        "options",
    ])
    .unwrap();
    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "gitlab/url=https://git.example.com",
        "global/output_log_level=5",
        "global/file_log_level=5",
    ]
    "#);
}

#[test]
fn test_file_log_level_overrides_console_level() {
    let cli = Cli::try_parse_from([
        "repolab",
        "-l",
        "2",
        "--file-log-level",
        "6",
        "--log-file",
        "out.log",
        "inis",
    ])
    .unwrap();
    insta::assert_debug_snapshot!(cli.global.to_config_overrides(), @r#"
    [
        "global/output_log_level=2",
        "global/file_log_level=6",
        "global/log_file=out.log",
    ]
    "#);
}

#[test]
fn test_log_level_out_of_range() {
    let err = Cli::try_parse_from(["repolab", "-l", "7", "version"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_parse_diffmanifests_single_manifest() {
    let args = diff_args(&["repolab", "diffmanifests", "release.xml", "--raw", "-j", "8"]);
    assert_eq!(args.manifests, ["release.xml"]);
    assert!(args.raw);
    assert!(!args.gitlab);
    assert_eq!(args.jobs, Some(8));
    args.validate().unwrap();
}

#[test]
fn test_parse_diffmanifests_gitlab() {
    let args = diff_args(&[
        "repolab",
        "diffmanifests",
        "--gitlab",
        "a.xml",
        "b.xml",
        "--pretty-format",
        "csv",
        "-o",
        "out",
        "--gitlab-url",
        "https://git.example.com",
    ]);
    assert_eq!(args.manifests, ["a.xml", "b.xml"]);
    assert!(args.gitlab);
    assert_eq!(args.pretty_format.as_deref(), Some("csv"));
    assert_eq!(args.output_dir.as_deref(), Some(std::path::Path::new("out")));
    assert_eq!(args.gitlab_url.as_deref(), Some("https://git.example.com"));
}

#[test]
fn test_diffmanifests_requires_a_manifest() {
    let err = Cli::try_parse_from(["repolab", "diffmanifests"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_diffmanifests_rejects_three_manifests() {
    assert!(Cli::try_parse_from(["repolab", "diffmanifests", "a", "b", "c"]).is_err());
}

#[test]
fn test_diffmanifests_current_tree_only() {
    let args = diff_args(&["repolab", "diffmanifests", "a.xml", "--all-manifests"]);
    let err = args.validate().unwrap_err();
    insta::assert_snapshot!(err, @"`diffmanifests` only supports the current tree");
}

#[test]
fn test_parse_gitlab_protect() {
    let args = gitlab_args(&[
        "repolab",
        "gitlab",
        "--branch",
        "release",
        "--protect",
        "--allowed-to-merge",
        "30",
        "--merge-method",
        "rebase_merge",
        "-g",
        "default, -notdefault",
        "platform/build",
    ]);
    assert_eq!(args.branch.as_deref(), Some("release"));
    assert!(args.protect);
    assert_eq!(args.allowed_to_merge, 30);
    assert_eq!(args.allowed_to_push, 0);
    assert_eq!(args.merge_method, Some(MergeMethod::RebaseMerge));
    assert_eq!(args.manifest_groups(), ["default", "-notdefault"]);
    assert_eq!(args.projects, ["platform/build"]);
}

#[test]
fn test_gitlab_protect_conflicts_with_unprotect() {
    let err = Cli::try_parse_from([
        "repolab",
        "gitlab",
        "--branch",
        "main",
        "--protect",
        "--unprotect",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn test_gitlab_rejects_unknown_access_level() {
    let err = Cli::try_parse_from(["repolab", "gitlab", "--allowed-to-push", "20"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
}

#[test]
fn test_gitlab_underscore_aliases() {
    let args = gitlab_args(&[
        "repolab",
        "gitlab",
        "--to_manifest",
        "--gitlab-groups",
        "platform, tools/",
    ]);
    assert!(args.to_manifest);
    assert_eq!(args.gitlab_group_list(), ["platform", "tools"]);

    let args = gitlab_args(&["repolab", "gitlab", "--mirror_push", "-n"]);
    assert!(args.mirror_push);
    assert!(args.dry_run);
}

#[test]
fn test_merge_method_api_values() {
    let values: Vec<&str> = [MergeMethod::Ff, MergeMethod::Merge, MergeMethod::RebaseMerge]
        .into_iter()
        .map(MergeMethod::as_api_str)
        .collect();
    assert_eq!(values, ["ff", "merge", "rebase_merge"]);
}
