// repolab: manifest diff and GitLab administration for repo checkouts
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Terminal styling for text reports.
//!
//! ```text
//! Channel    style
//! Text       plain
//! Project    bold
//! Added      green bold
//! Removed    red bold
//! Revision   yellow
//! ```
//!
//! Colors are off when `--no-color` is given, `NO_COLOR` is set,
//! `CLICOLOR=0`, `TERM=dumb`, or stdout is not a color terminal.
//! `CLICOLOR_FORCE` overrides terminal detection.

use std::env;

use console::Style;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Text,
    Project,
    Added,
    Removed,
    Revision,
}

/// Maps output channels to printers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coloring {
    enabled: bool,
}

impl Coloring {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self::new(false)
    }

    /// Colors if `requested` and the environment allows them.
    #[must_use]
    pub fn detect(requested: bool) -> Self {
        Self::new(requested && env_allows_color())
    }

    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Style applied to `channel`; unstyled when colors are off.
    #[must_use]
    pub fn style(&self, channel: Channel) -> Style {
        if !self.enabled {
            return Style::new();
        }
        let style = match channel {
            Channel::Text => return Style::new(),
            Channel::Project => Style::new().bold(),
            Channel::Added => Style::new().green().bold(),
            Channel::Removed => Style::new().red().bold(),
            Channel::Revision => Style::new().yellow(),
        };
        style.force_styling(true)
    }

    /// Printer for `channel`: renders a fragment with the channel's style.
    pub fn printer(&self, channel: Channel) -> impl Fn(&str) -> String + use<> {
        let style = self.style(channel);
        move |text: &str| style.apply_to(text).to_string()
    }
}

fn env_allows_color() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}
