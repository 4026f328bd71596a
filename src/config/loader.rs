// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading from multiple sources.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new()
//!   .add_toml_file_optional("repolab.toml")
//!   .add_toml_file(--ini)
//!   .with_env_prefix("REPOLAB")
//!   .apply_overrides(--set)
//!        |
//!        v
//!    build() --> Config (validated)
//!
//! Later sources win: files in order, then the environment
//! (`REPOLAB_SECTION__KEY`), then `--set`.
//! ```

use std::path::PathBuf;

use super::Config;
use crate::error::{ConfigError, Result};

/// Builder for loading configuration from multiple sources.
pub struct ConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: Option<String>,
    files: Vec<(String, PathBuf)>,
    overrides: Vec<String>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            files: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Adds a TOML configuration file to the loader.
    ///
    /// The file is read by `build()`; a missing or malformed file makes
    /// `build()` fail.
    #[must_use]
    pub fn add_toml_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(true));
        self.files.push(("file".to_string(), p.to_path_buf()));
        self
    }

    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        use config::{File, FileFormat};
        let p = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(p).format(FileFormat::Toml).required(false));
        if p.exists() {
            self.files.push(("optional".to_string(), p.to_path_buf()));
        }
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        use config::{File, FileFormat};
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.files
            .push(("string".to_string(), PathBuf::from("<string>")));
        self
    }

    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Sets a configuration override using a dotted key (`gitlab.url`).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or if the value cannot be converted
    /// to a configuration value.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
        Ok(self)
    }

    /// Applies `section/key=value` overrides in order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an entry that is not of the
    /// form `section/key=value`.
    pub fn apply_overrides(mut self, overrides: &[String]) -> Result<Self> {
        for entry in overrides {
            let (key, value) = parse_override(entry)?;
            self = self.set(&key, value)?;
            self.overrides.push(key);
        }
        Ok(self)
    }

    /// Builds the configuration from all added sources.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required configuration files are missing.
    /// - Configuration files have invalid TOML syntax or unknown keys.
    /// - Environment variables cannot be parsed.
    /// - The merged configuration fails validation.
    pub fn build(self) -> Result<Config> {
        let builder = match &self.env_prefix {
            Some(prefix) => self.builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
            None => self.builder,
        };
        let cfg = builder.build()?;
        let config: Config = cfg.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn loaded_files(&self) -> Vec<(String, PathBuf)> {
        self.files.clone()
    }

    /// Environment variables picked up by the env source, sorted.
    #[must_use]
    pub fn env_keys(&self) -> Vec<String> {
        let Some(prefix) = &self.env_prefix else {
            return Vec::new();
        };
        let prefix = format!("{}_", prefix.to_uppercase());
        let mut keys: Vec<String> = std::env::vars_os()
            .filter_map(|(key, _)| key.into_string().ok())
            .filter(|key| key.to_uppercase().starts_with(&prefix) && key.contains("__"))
            .collect();
        keys.sort();
        keys
    }

    /// Every source in precedence order, lowest first: files, then
    /// environment variables, then `--set` keys. Values are not shown.
    #[must_use]
    pub fn format_loaded_files(&self) -> Vec<String> {
        let files = self
            .files
            .iter()
            .map(|(source, path)| format!("[{source}] {}", path.display()));
        let env = self.env_keys().into_iter().map(|key| format!("[env] {key}"));
        let set = self.overrides.iter().map(|key| format!("[set] {key}"));
        files
            .chain(env)
            .chain(set)
            .enumerate()
            .map(|(i, line)| format!("{}. {line}", i + 1))
            .collect()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `section/key=value` into a dotted key and its value.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` when the separator `/` or `=` is
/// missing or either side of `/` is empty.
pub fn parse_override(entry: &str) -> std::result::Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        section: "cli".to_string(),
        key: "set".to_string(),
        message: format!("expected 'section/key=value', got '{entry}'"),
    };

    let (path, value) = entry.split_once('=').ok_or_else(invalid)?;
    let (section, key) = path.split_once('/').ok_or_else(invalid)?;
    let (section, key) = (section.trim(), key.trim());
    if section.is_empty() || key.is_empty() {
        return Err(invalid());
    }
    Ok((format!("{section}.{key}"), value.to_string()))
}
