// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment detection for the tmux backend.

use tracing::{debug, instrument};

/// Whether this process runs inside a tmux client (directly or via `run-shell`)
#[instrument(fields(component = "noc_mux", operation = "is_in_tmux"))]
pub fn is_in_tmux() -> bool {
    let inside = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
    debug!(inside, "Checked TMUX environment variable");
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn detects_tmux_from_environment() {
        let saved = std::env::var_os("TMUX");

        std::env::set_var("TMUX", "/tmp/tmux-1000/default,1234,0");
        assert!(is_in_tmux());

        std::env::set_var("TMUX", "");
        assert!(!is_in_tmux());

        std::env::remove_var("TMUX");
        assert!(!is_in_tmux());

        if let Some(v) = saved {
            std::env::set_var("TMUX", v);
        }
    }
}
