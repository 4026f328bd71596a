// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration section types.
//!
//! # Config Structure
//!
//! ```text
//! Config
//!   global    log levels, log file
//!   gitlab    server url, token, root group, paging, timeouts
//!   diff      worker count, resolver mode, report file names, chat caps
//!   manifest  repo dir, manifest url (relative fetch base)
//!   mirror    push-mirror url template
//!   export    <remote>/<default> header for --to-manifest
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::{LogFormat, LogLevel};

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Encoding of the log file (`text` or `json`).
    pub log_format: LogFormat,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            log_format: LogFormat::Text,
        }
    }
}

/// GitLab server settings shared by `diffmanifests --gitlab` and `gitlab`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitlabConfig {
    /// Server base URL, e.g. `https://git.example.com/gitlab`.
    pub url: String,
    /// Personal access token.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub private_token: String,
    /// Top-level group that owns every mirrored project.
    pub root_group: String,
    /// Default branch for `--protect`/`--unprotect`.
    pub protected_branch: String,
    /// Page size for list endpoints.
    pub per_page: u32,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Pause after each create call.
    pub request_delay_ms: u64,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            private_token: String::new(),
            root_group: String::new(),
            protected_branch: "master".to_string(),
            per_page: 100,
            timeout_secs: 30,
            request_delay_ms: 1000,
        }
    }
}

impl GitlabConfig {
    /// Validate settings that cannot be checked by deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `per_page` is outside the
    /// range accepted by the GitLab API.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(1..=100).contains(&self.per_page) {
            return Err(ConfigError::InvalidValue {
                section: "gitlab".to_string(),
                key: "per_page".to_string(),
                message: format!("must be 1-100, got {}", self.per_page),
            });
        }
        Ok(())
    }
}

/// `diffmanifests` settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Number of projects whose refs and compares are fetched concurrently.
    pub jobs: usize,
    /// Accept 40/64-hex revisions without a ref lookup.
    pub accept_commit_ids: bool,
    /// File name of the CSV report inside the output directory.
    pub csv_name: String,
    /// Prefix of the rendered chat payload file name.
    pub chat_prefix: String,
    /// Maximum number of commits rendered into a chat payload.
    pub overflow_threshold: usize,
    /// Number of short ids previewed in the overflow notice.
    pub overflow_preview: usize,
    /// JSON pointer of the content block array inside a chat template.
    pub content_pointer: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            accept_commit_ids: true,
            csv_name: "commits.csv".to_string(),
            chat_prefix: "feishu_".to_string(),
            overflow_threshold: 32,
            overflow_preview: 3,
            content_pointer: "/content/post/zh_cn/content/0".to_string(),
        }
    }
}

impl DiffConfig {
    /// Validate settings that cannot be checked by deserialization alone.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a zero worker count or a
    /// content pointer that is not a JSON pointer.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.jobs == 0 {
            return Err(ConfigError::InvalidValue {
                section: "diff".to_string(),
                key: "jobs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if !self.content_pointer.is_empty() && !self.content_pointer.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                section: "diff".to_string(),
                key: "content_pointer".to_string(),
                message: format!("'{}' is not a JSON pointer", self.content_pointer),
            });
        }
        Ok(())
    }
}

/// Location of the repo checkout metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestConfig {
    /// The `.repo` directory; `manifests/` and `manifest.xml` live below it.
    pub repo_dir: PathBuf,
    /// URL the manifest repository was cloned from; relative `fetch`
    /// attributes resolve against it.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub manifest_url: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            repo_dir: PathBuf::from(".repo"),
            manifest_url: String::new(),
        }
    }
}

/// Push-mirror settings for `gitlab --mirror-push`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Target URL with a `{path}` placeholder for the project's
    /// `path_with_namespace`. Credentials, if any, belong here.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url_template: String,
}

impl MirrorConfig {
    /// Expand the template for one project.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingKey` when no template is configured, or
    /// `ConfigError::InvalidValue` when it lacks the `{path}` placeholder.
    pub fn mirror_url(&self, path_with_namespace: &str) -> std::result::Result<String, ConfigError> {
        if self.url_template.is_empty() {
            return Err(ConfigError::MissingKey {
                section: "mirror".to_string(),
                key: "url_template".to_string(),
            });
        }
        if !self.url_template.contains("{path}") {
            return Err(ConfigError::InvalidValue {
                section: "mirror".to_string(),
                key: "url_template".to_string(),
                message: "missing '{path}' placeholder".to_string(),
            });
        }
        Ok(self.url_template.replace("{path}", path_with_namespace))
    }
}

/// Header written by `gitlab --to-manifest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Name of the single `<remote>`.
    pub remote_name: String,
    /// `fetch` attribute of that remote.
    pub fetch: String,
    /// `<default revision>`.
    pub revision: String,
    /// `<default sync-j>`.
    pub sync_jobs: u32,
    /// Prefix stripped from each `path_with_namespace`; defaults to
    /// `<gitlab.root_group>/` when empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub strip_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            remote_name: "origin".to_string(),
            fetch: "../..".to_string(),
            revision: "master".to_string(),
            sync_jobs: 4,
            strip_prefix: String::new(),
        }
    }
}
