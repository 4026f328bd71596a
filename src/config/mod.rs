// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for repolab.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. repolab.toml (cwd, optional)
//! 3. --ini FILE (repeatable)
//! 4. REPOLAB_* env vars
//! 5. --set section/key=value and dedicated CLI flags
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! REPOLAB_GITLAB__URL=https://git.example.com   → gitlab.url
//! REPOLAB_GITLAB__PRIVATE_TOKEN=...             → gitlab.private_token
//! REPOLAB_DIFF__JOBS=8                          → diff.jobs
//! ```
//!
//! Section and key are separated by a double underscore so that keys
//! containing `_` survive the mapping.

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::logging::LogFormat;

use loader::ConfigLoader;
use types::{DiffConfig, ExportConfig, GitlabConfig, GlobalConfig, ManifestConfig, MirrorConfig};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Global options.
    pub global: GlobalConfig,
    /// GitLab server.
    pub gitlab: GitlabConfig,
    /// `diffmanifests` settings.
    pub diff: DiffConfig,
    /// Repo checkout layout.
    pub manifest: ManifestConfig,
    /// Push mirrors.
    pub mirror: MirrorConfig,
    /// `--to-manifest` header.
    pub export: ExportConfig,
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use repolab::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("repolab.toml")
    ///     .with_env_prefix("REPOLAB")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Validate cross-field constraints after loading.
    ///
    /// # Errors
    ///
    /// Returns the first section that fails validation.
    pub fn validate(&self) -> Result<()> {
        self.gitlab.validate()?;
        self.diff.validate()?;
        Ok(())
    }

    /// Prefix removed from exported project paths.
    #[must_use]
    pub fn export_strip_prefix(&self) -> String {
        if !self.export.strip_prefix.is_empty() {
            return self.export.strip_prefix.clone();
        }
        if self.gitlab.root_group.is_empty() {
            String::new()
        } else {
            format!("{}/", self.gitlab.root_group.trim_end_matches('/'))
        }
    }

    /// Format configuration options for display.
    ///
    /// Secrets are shown as `[hidden]`. Output is sorted by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_gitlab_options(&mut options);
        self.format_diff_options(&mut options);
        self.format_manifest_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        let log_format = match self.global.log_format {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        };
        options.insert("global.log_format".into(), log_format.into());
    }

    fn format_gitlab_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("gitlab.url".into(), self.gitlab.url.clone());
        if !self.gitlab.private_token.is_empty() {
            options.insert("gitlab.private_token".into(), "[hidden]".into());
        }
        options.insert("gitlab.root_group".into(), self.gitlab.root_group.clone());
        options.insert(
            "gitlab.protected_branch".into(),
            self.gitlab.protected_branch.clone(),
        );
        options.insert("gitlab.per_page".into(), self.gitlab.per_page.to_string());
        options.insert(
            "gitlab.timeout_secs".into(),
            self.gitlab.timeout_secs.to_string(),
        );
        options.insert(
            "gitlab.request_delay_ms".into(),
            self.gitlab.request_delay_ms.to_string(),
        );
    }

    fn format_diff_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("diff.jobs".into(), self.diff.jobs.to_string());
        options.insert(
            "diff.accept_commit_ids".into(),
            self.diff.accept_commit_ids.to_string(),
        );
        options.insert("diff.csv_name".into(), self.diff.csv_name.clone());
        options.insert("diff.chat_prefix".into(), self.diff.chat_prefix.clone());
        options.insert(
            "diff.overflow_threshold".into(),
            self.diff.overflow_threshold.to_string(),
        );
        options.insert(
            "diff.overflow_preview".into(),
            self.diff.overflow_preview.to_string(),
        );
        options.insert(
            "diff.content_pointer".into(),
            self.diff.content_pointer.clone(),
        );
    }

    fn format_manifest_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "manifest.repo_dir".into(),
            self.manifest.repo_dir.display().to_string(),
        );
        if !self.manifest.manifest_url.is_empty() {
            options.insert(
                "manifest.manifest_url".into(),
                self.manifest.manifest_url.clone(),
            );
        }
        // Mirror templates usually embed credentials.
        if !self.mirror.url_template.is_empty() {
            options.insert("mirror.url_template".into(), "[hidden]".into());
        }
        options.insert(
            "export.remote_name".into(),
            self.export.remote_name.clone(),
        );
        options.insert("export.fetch".into(), self.export.fetch.clone());
        options.insert("export.revision".into(), self.export.revision.clone());
        options.insert("export.sync_jobs".into(), self.export.sync_jobs.to_string());
        options.insert("export.strip_prefix".into(), self.export_strip_prefix());
    }
}
