// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML configurations.

use std::path::PathBuf;

use repolab::config::Config;
use repolab::config::loader::ConfigLoader;

const SITE: &str = r#"
[gitlab]
url = "https://git.example.com/gitlab"
private_token = "glpat-secret"
root_group = "platform"
protected_branch = "main"

[diff]
jobs = 2
chat_prefix = "weekly_"

[manifest]
repo_dir = "/work/aosp/.repo"

[mirror]
url_template = "ssh://mirror.example.com/{path}.git"
"#;

// =============================================================================
// Loading from TOML
// =============================================================================

#[test]
fn config_defaults() {
    let config = Config::default();
    assert_eq!(config.gitlab.protected_branch, "master");
    assert_eq!(config.gitlab.per_page, 100);
    assert_eq!(config.diff.jobs, 4);
    assert_eq!(config.diff.csv_name, "commits.csv");
    assert_eq!(config.diff.overflow_threshold, 32);
    assert_eq!(config.manifest.repo_dir, PathBuf::from(".repo"));
    assert_eq!(config.export.remote_name, "origin");
}

#[test]
fn config_parse_site_file() {
    let config = Config::parse(SITE).unwrap();
    assert_eq!(config.gitlab.url, "https://git.example.com/gitlab");
    assert_eq!(config.gitlab.root_group, "platform");
    assert_eq!(config.diff.jobs, 2);
    assert_eq!(config.diff.chat_prefix, "weekly_");
    assert_eq!(config.diff.csv_name, "commits.csv");
    assert_eq!(config.manifest.repo_dir, PathBuf::from("/work/aosp/.repo"));
    assert_eq!(
        config.mirror.mirror_url("platform/app").unwrap(),
        "ssh://mirror.example.com/platform/app.git"
    );
    assert_eq!(config.export_strip_prefix(), "platform/");
}

#[test]
fn config_unknown_key_rejected() {
    let result = Config::parse("[gitlab]\nurll = \"https://typo.example.com\"\n");
    assert!(result.is_err());
}

#[test]
fn config_invalid_per_page_rejected() {
    let err = Config::parse("[gitlab]\nper_page = 500\n").unwrap_err();
    assert!(format!("{err:#}").contains("per_page"), "{err:#}");
}

#[test]
fn config_zero_jobs_rejected() {
    assert!(Config::parse("[diff]\njobs = 0\n").is_err());
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_file_then_overrides() {
    let temp = tempfile::tempdir().unwrap();
    let site = temp.path().join("repolab.toml");
    std::fs::write(&site, SITE).unwrap();
    let local = temp.path().join("local.toml");
    std::fs::write(&local, "[gitlab]\nprotected_branch = \"release\"\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file(&site)
        .add_toml_file_optional(&local)
        .add_toml_file_optional(temp.path().join("absent.toml"))
        .apply_overrides(&["diff/jobs=8".to_string(), "gitlab/root_group=vendor".to_string()])
        .unwrap();
    assert_eq!(loader.loaded_files().len(), 2);
    assert_eq!(
        loader.format_loaded_files(),
        vec![
            format!("1. [file] {}", site.display()),
            format!("2. [optional] {}", local.display()),
            "3. [set] diff.jobs".to_string(),
            "4. [set] gitlab.root_group".to_string(),
        ]
    );

    let config = loader.build().unwrap();
    assert_eq!(config.gitlab.protected_branch, "release");
    assert_eq!(config.gitlab.root_group, "vendor");
    assert_eq!(config.diff.jobs, 8);
    assert_eq!(config.export_strip_prefix(), "vendor/");
}

#[test]
fn config_missing_required_file() {
    let result = ConfigLoader::new()
        .add_toml_file("/nonexistent/repolab.toml")
        .build();
    assert!(result.is_err());
}

#[test]
fn config_malformed_override() {
    let result = ConfigLoader::new().apply_overrides(&["gitlab.url".to_string()]);
    assert!(result.is_err());
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn config_format_options_hides_token() {
    let config = Config::parse(SITE).unwrap();
    let options = config.format_options();

    let token = options
        .iter()
        .find(|line| line.starts_with("gitlab.private_token"))
        .expect("token line");
    assert!(token.ends_with("= [hidden]"), "{token}");
    assert!(options.iter().all(|line| !line.contains("glpat-secret")));
    assert!(
        options
            .iter()
            .any(|line| line.starts_with("gitlab.url") && line.ends_with("= https://git.example.com/gitlab"))
    );

    let mut sorted = options.clone();
    sorted.sort();
    assert_eq!(options, sorted);
}
