// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |         diffmanifests / gitlab
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '--+-----------+--------+---'
//!                 |           |        |
//!                 v           v        v
//!             manifest       diff     report
//!           xml, diff,   resolve,    text, csv,
//!             export     compare,    chat JSON
//!                         merge
//!                           |
//!                +----------+----------+
//!                v                     v
//!               git                 gitlab
//!         for-each-ref, log      REST client, walk
//!
//!   +-----------------------------------------+
//!   |  foundation        error, logging       |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod gitlab;
pub mod logging;
pub mod manifest;
pub mod report;
