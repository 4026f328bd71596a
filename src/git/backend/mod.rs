// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitQuery::is_git_repo  --> GixBackend (pure Rust gix, no subprocess)
//! ShellBackend::git_output --> git for-each-ref, git log (tokio::process)
//! ```

use crate::error::{GitError, ProcessError, RepoResult};
use std::path::{Path, PathBuf};
use std::process::Output;

/// Read-only repository probes.
pub trait GitQuery {
    /// Check if path is inside a git work tree.
    fn is_git_repo(path: &Path) -> bool;
}

/// Pure Rust git backend using gix.
pub struct GixBackend;

impl GitQuery for GixBackend {
    fn is_git_repo(path: &Path) -> bool {
        gix::discover(path).is_ok()
    }
}

impl GixBackend {
    /// Whether a project worktree is present on disk.
    #[must_use]
    pub fn worktree_exists(path: &Path) -> bool {
        path.is_dir() && Self::is_git_repo(path)
    }
}

/// Shell-based git backend using the git CLI.
///
/// Used for history queries (`for-each-ref`, `log`) whose output format
/// is stable across git versions.
pub struct ShellBackend;

impl ShellBackend {
    /// Locate the `git` executable on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::ExecutableNotFound`] if git is not installed.
    pub fn locate_git() -> RepoResult<PathBuf> {
        which::which("git").map_err(|_| {
            ProcessError::ExecutableNotFound {
                name: "git".to_string(),
            }
            .into()
        })
    }

    /// Run git in `cwd` and return its trimmed stdout. Sets
    /// `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) async fn git_output(args: &[&str], cwd: &Path) -> RepoResult<String> {
        use tokio::process::Command;

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to execute git: {e}")))?;

        Self::stdout_of(args, &output)
    }

    fn stdout_of(args: &[&str], output: &Output) -> RepoResult<String> {
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: format!("git {}", args.join(" ")),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
