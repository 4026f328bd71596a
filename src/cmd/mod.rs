// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   config (options, inis), diffmanifests, gitlab
//!                 |               |
//!                 +--> connect() -+--> GitlabClient (authenticated)
//! ```

pub mod config;
pub mod diffmanifests;
pub mod gitlab;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use crate::config::types::GitlabConfig;
use crate::error::{ConfigError, Result};
use crate::gitlab::{ClientContext, GitlabClient};

/// Build an authenticated client; CLI values win over `[gitlab]`.
pub(crate) async fn connect(
    config: &GitlabConfig,
    url: Option<&str>,
    private_token: Option<&str>,
) -> Result<GitlabClient> {
    let url = url.unwrap_or(&config.url);
    if url.is_empty() {
        return Err(ConfigError::MissingKey {
            section: "gitlab".to_string(),
            key: "url".to_string(),
        })
        .context("no GitLab server given (use --gitlab-url or gitlab/url)");
    }
    let token = private_token.unwrap_or(&config.private_token);
    if token.is_empty() {
        return Err(ConfigError::MissingKey {
            section: "gitlab".to_string(),
            key: "private_token".to_string(),
        })
        .context("no GitLab token given (use --private-token or GITLAB_PRIVATE_TOKEN)");
    }

    let ctx = ClientContext::builder()
        .url(url)
        .private_token(token)
        .timeout(Duration::from_secs(config.timeout_secs))
        .per_page(config.per_page)
        .build();
    let client = GitlabClient::new(&ctx)?;
    let user = client
        .authenticate()
        .await
        .with_context(|| format!("failed to authenticate against {url}"))?;
    info!(user = %user.username, server = %client.server(), "authenticated");
    Ok(client)
}

/// Top of the checkout: the directory holding `repo_dir`.
pub(crate) fn checkout_root(repo_dir: &Path) -> PathBuf {
    match repo_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
