// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              RepoLabError (~24 bytes)
//!                     |
//!   +-------+------+------+------+------+------+------+
//!   |       |      |      |      |      |      |      |
//!   v       v      v      v      v      v      v      v
//! Bail     Git    Net   GitLab  Cfg  Manifest Report Proc   Io
//! Box<str> Box    Box    Box    Box    Box     Box    Box   Box
//!
//! Sub-errors (unboxed internally):
//!   Git      CommandFailed, MalformedLog
//!   Network  Reqwest, InvalidUrl, Timeout
//!   Gitlab   Api (status + body), Malformed
//!   Config   MissingKey, InvalidValue
//!   Manifest Read, Parse, MissingAttribute, UnknownRemote, NoRevision,
//!            NotFound, IncludeDepth
//!   Report   Timestamp, MissingContent, Csv, Json
//!   Process  ExecutableNotFound
//!
//! All variants boxed => RepoLabError fits in 24 bytes.
//! ```

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`RepoLabError`].
pub type RepoResult<T> = std::result::Result<T, RepoLabError>;

/// Top-level application error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum RepoLabError {
    /// Fatal error that should terminate the application.
    #[error("fatal error: {0}")]
    Bailed(Box<str>),

    /// Git operation failed.
    #[error("git error: {0}")]
    Git(#[from] Box<GitError>),

    /// Network operation failed.
    #[error("network error: {0}")]
    Network(#[from] Box<NetworkError>),

    /// GitLab API returned an error.
    #[error("gitlab error: {0}")]
    Gitlab(#[from] Box<GitlabError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Manifest loading error.
    #[error("manifest error: {0}")]
    Manifest(#[from] Box<ManifestError>),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(#[from] Box<ReportError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

impl RepoLabError {
    /// HTTP status of a failed GitLab call, if this error carries one.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Gitlab(err) => match err.as_ref() {
                GitlabError::Api { status, .. } => Some(*status),
                GitlabError::Malformed { .. } => None,
            },
            _ => None,
        }
    }

    /// Whether this is a GitLab "404 Not Found" response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }
}

/// Create a fatal [`RepoLabError::Bailed`] that terminates the application.
pub fn bail_out(message: impl Into<String>) -> RepoLabError {
    RepoLabError::Bailed(message.into().into_boxed_str())
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for RepoLabError {
                fn from(err: $error) -> Self {
                    RepoLabError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    GitError => Git,
    NetworkError => Network,
    GitlabError => Gitlab,
    ConfigError => Config,
    ManifestError => Manifest,
    ReportError => Report,
    ProcessError => Process,
    std::io::Error => Io,
}

// --- Git Errors ---

/// Git operation errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Git command execution failed.
    #[error("git command failed: {command} - {message}")]
    CommandFailed { command: String, message: String },

    /// `git log` produced a record that could not be split into fields.
    #[error("unexpected git log record in {path}: {record}")]
    MalformedLog { path: String, record: String },
}

// --- Network Errors ---

/// Network operation errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Error from reqwest library.
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Connection timeout.
    #[error("connection timeout: {url}")]
    Timeout { url: String },
}

// --- GitLab Errors ---

/// GitLab REST API errors.
#[derive(Debug, Error)]
pub enum GitlabError {
    /// Non-success HTTP response.
    #[error("http error {status}: {url} ({message})")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("malformed response from {url}: {message}")]
    Malformed { url: String, message: String },
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Manifest Errors ---

/// Manifest loading errors.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file could not be read.
    #[error("failed to read manifest '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest is not well-formed XML.
    #[error("failed to parse manifest '{path}': {message}")]
    Parse { path: String, message: String },

    /// A required attribute is absent.
    #[error("<{element}> in '{path}' is missing attribute '{attribute}'")]
    MissingAttribute {
        path: String,
        element: String,
        attribute: String,
    },

    /// A project references a remote that is not declared.
    #[error("project '{project}' references unknown remote '{remote}'")]
    UnknownRemote { project: String, remote: String },

    /// No revision could be determined for a project.
    #[error("project '{project}' has no revision and no default revision")]
    NoRevision { project: String },

    /// Manifest argument did not point at an existing file.
    #[error("manifest not found: {0}")]
    NotFound(String),

    /// Includes nest deeper than allowed.
    #[error("manifest includes nested too deeply at '{path}'")]
    IncludeDepth { path: String },
}

// --- Report Errors ---

/// Report rendering errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Commit timestamp is not ISO-8601 with offset.
    #[error("invalid commit timestamp '{value}': {message}")]
    Timestamp { value: String, message: String },

    /// Chat template lacks the expected content block array.
    #[error("template '{path}' has no content array at '{pointer}'")]
    MissingContent { path: String, pointer: String },

    /// CSV writer failure.
    #[error("failed to write csv '{path}': {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Template JSON could not be parsed.
    #[error("failed to parse template '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },
}
