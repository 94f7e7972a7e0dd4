// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Multiplexer-agnostic trait and shared types.
//!
//! Everything tmux-noc does to the terminal goes through [`Multiplexer`]:
//! opening panes, titling them, rendering menus and prompts, typing keys and
//! scraping pane contents. Backends live in `noc-mux`.

pub mod menu;

pub use menu::{menu_shortcut, shorten_label, Menu, MenuEntry, Prompt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Target addressing "the active pane of the current window"
pub const CURRENT_PANE: &str = ":";

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("multiplexer not available: {0}")]
    NotAvailable(&'static str),
    #[error("multiplexer command failed: {0}")]
    CommandFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected multiplexer output: {0}")]
    Parse(String),
    #[error("{0}")]
    Other(String),
}

/// Where a new pane is placed relative to the current one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Split the current pane top/bottom
    Vertical,
    /// Split the current pane left/right
    Horizontal,
    /// Open a new window instead of splitting
    #[default]
    New,
}

impl SplitDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitDirection::Vertical => "vertical",
            SplitDirection::Horizontal => "horizontal",
            SplitDirection::New => "new",
        }
    }

    /// Name shown in menu titles
    pub fn display_name(&self) -> &'static str {
        match self {
            SplitDirection::Vertical => "Vertical",
            SplitDirection::Horizontal => "Horizontal",
            SplitDirection::New => "New Window",
        }
    }
}

impl std::fmt::Display for SplitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SplitDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vertical" => Ok(SplitDirection::Vertical),
            "horizontal" => Ok(SplitDirection::Horizontal),
            "new" => Ok(SplitDirection::New),
            _ => Err(format!(
                "Invalid split direction: {}. Use 'vertical', 'horizontal' or 'new'",
                s
            )),
        }
    }
}

/// Options for scraping pane contents
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureOptions<'a> {
    /// Pane to capture; `None` captures the active pane
    pub target: Option<&'a str>,
    /// Join wrapped lines
    pub join_wrapped: bool,
    /// Number of scrollback lines to include above the visible area
    pub history_lines: Option<usize>,
}

/// Low-level multiplexer operations used by tmux-noc
pub trait Multiplexer {
    /// Backend identifier, e.g. "tmux"
    fn id(&self) -> &'static str;

    fn is_available(&self) -> bool;

    /// Open a new pane or window running `shell_cmd` (the default shell when `None`)
    fn open_pane(&self, dir: SplitDirection, shell_cmd: Option<&str>) -> Result<(), MuxError>;

    /// Set the title of the active pane
    fn set_pane_title(&self, title: &str) -> Result<(), MuxError>;

    /// Titles of all panes in the current window, in pane order
    fn pane_titles(&self) -> Result<Vec<String>, MuxError>;

    fn rename_window(&self, name: &str) -> Result<(), MuxError>;

    /// Hand window naming back to the multiplexer
    fn enable_automatic_rename(&self) -> Result<(), MuxError>;

    /// Width of the current window in cells
    fn window_width(&self) -> Result<usize, MuxError>;

    /// Show a transient status-line message
    fn display_message(&self, message: &str) -> Result<(), MuxError>;

    fn display_menu(&self, menu: &Menu) -> Result<(), MuxError>;

    fn command_prompt(&self, prompt: &Prompt) -> Result<(), MuxError>;

    /// Pipe the active pane's output into `shell_cmd`; no-op when a pipe is already open
    fn pipe_pane(&self, shell_cmd: &str) -> Result<(), MuxError>;

    /// Type `text` literally into `target`
    fn send_text(&self, target: &str, text: &str) -> Result<(), MuxError>;

    /// Press Enter in `target`
    fn send_enter(&self, target: &str) -> Result<(), MuxError>;

    /// Return pane contents, untrimmed
    fn capture_pane(&self, opts: &CaptureOptions<'_>) -> Result<String, MuxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_direction_parses_case_insensitively() {
        assert_eq!("Vertical".parse::<SplitDirection>(), Ok(SplitDirection::Vertical));
        assert_eq!("horizontal".parse::<SplitDirection>(), Ok(SplitDirection::Horizontal));
        assert_eq!("NEW".parse::<SplitDirection>(), Ok(SplitDirection::New));
        assert!("diagonal".parse::<SplitDirection>().is_err());
    }

    #[test]
    fn split_direction_defaults_to_new_window() {
        assert_eq!(SplitDirection::default(), SplitDirection::New);
        assert_eq!(SplitDirection::New.display_name(), "New Window");
    }

    #[test]
    fn split_direction_display_round_trips_through_from_str() {
        for dir in [SplitDirection::Vertical, SplitDirection::Horizontal, SplitDirection::New] {
            assert_eq!(dir.to_string().parse::<SplitDirection>(), Ok(dir));
        }
    }
}
