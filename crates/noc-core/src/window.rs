// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Window naming from pane titles

use crate::error::Result;
use noc_mux_core::Multiplexer;
use tracing::debug;

/// Separator between pane titles in a window name
pub const TITLE_SEPARATOR: &str = "\u{2503}";

/// Title shown for panes tmux-noc never titled
pub const LOCAL_TITLE: &str = "local";

/// Window name for the given pane titles, or `None` when no pane was titled
pub fn window_name<S: AsRef<str>>(pane_titles: &[S]) -> Option<String> {
    if pane_titles.iter().all(|t| t.as_ref().is_empty()) {
        return None;
    }
    let parts: Vec<&str> = pane_titles
        .iter()
        .map(|t| match t.as_ref() {
            "" => LOCAL_TITLE,
            title => title,
        })
        .collect();
    Some(parts.join(TITLE_SEPARATOR))
}

/// Name the current window after its panes, or hand naming back to tmux
pub fn rename_window(mux: &dyn Multiplexer) -> Result<()> {
    let titles = mux.pane_titles()?;
    match window_name(&titles) {
        Some(name) => {
            debug!(name = %name, "Renaming window");
            mux.rename_window(&name)?;
        }
        None => {
            debug!("No titled panes; enabling automatic rename");
            mux.enable_automatic_rename()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingMux};

    #[test]
    fn untitled_panes_become_local() {
        assert_eq!(
            window_name(&["s/core1", "", "Log:2024/x.log"]),
            Some("s/core1\u{2503}local\u{2503}Log:2024/x.log".to_string())
        );
    }

    #[test]
    fn no_titles_means_no_name() {
        assert_eq!(window_name(&["", ""]), None);
        assert_eq!(window_name::<&str>(&[]), None);
    }

    #[test]
    fn rename_window_sets_joined_name() {
        let mux = RecordingMux::new().with_pane_titles(&["t/10.0.0.1", ""]);
        rename_window(&mux).unwrap();
        assert_eq!(
            mux.calls(),
            vec![
                Call::PaneTitles,
                Call::RenameWindow("t/10.0.0.1\u{2503}local".into())
            ]
        );
    }

    #[test]
    fn rename_window_restores_automatic_rename() {
        let mux = RecordingMux::new().with_pane_titles(&[""]);
        rename_window(&mux).unwrap();
        assert_eq!(mux.calls(), vec![Call::PaneTitles, Call::AutomaticRename]);
    }
}
