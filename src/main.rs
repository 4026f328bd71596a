// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Options | Inis | Diffmanifests | Gitlab
//! ```

use std::process::ExitCode;

use repolab::cli::global::GlobalOptions;
use repolab::cli::{self, Command};
use repolab::cmd::config::{run_inis_command, run_options_command};
use repolab::cmd::diffmanifests::run_diffmanifests_command;
use repolab::cmd::gitlab::run_gitlab_command;
use repolab::config::Config;
use repolab::config::loader::ConfigLoader;
use repolab::logging::init_logging;
use repolab::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Prefix of `REPOLAB_SECTION__KEY` environment overrides.
const ENV_PREFIX: &str = "REPOLAB";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    // Fall back to CLI-only logging when the configuration is broken so the
    // load error itself is still reported.
    let config = load_config(&cli.global);
    let log_config = config
        .as_ref()
        .map_or_else(|_| build_log_config(&cli.global), log_config_from);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli, config).await
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(|level| LogLevel::new(level).ok())
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(|level| LogLevel::new(level).ok())
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .with_show_target(console_level >= LogLevel::DEBUG)
        .build()
}

fn log_config_from(config: &Config) -> LogConfig {
    let global = &config.global;
    LogConfig::builder()
        .with_console_level(global.output_log_level)
        .with_file_level(global.file_log_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .with_file_format(global.log_format)
        .with_show_target(global.output_log_level >= LogLevel::DEBUG)
        .build()
}

async fn dispatch_command(cli: &cli::Cli, config: repolab::error::Result<Config>) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Options) => config.map(|config| run_options_command(&config)),
        Some(Command::Inis) => build_config_loader(&cli.global).map(|loader| {
            run_inis_command(&loader.format_loaded_files());
        }),
        Some(Command::Diffmanifests(args)) => match config {
            Ok(config) => run_diffmanifests_command(args, &config).await,
            Err(e) => Err(e),
        },
        Some(Command::Gitlab(args)) => match config {
            Ok(config) => run_gitlab_command(args, &config).await,
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> repolab::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new();
    if !global.no_default_inis {
        loader = loader.add_toml_file_optional("repolab.toml");
    }
    for ini_path in &global.inis {
        loader = loader.add_toml_file(ini_path);
    }
    loader
        .with_env_prefix(ENV_PREFIX)
        .apply_overrides(&global.to_config_overrides())
}

fn load_config(global: &GlobalOptions) -> repolab::error::Result<Config> {
    build_config_loader(global)?.build()
}
