// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Clipboard access through a configurable paste command

use std::process::Command;
use tracing::{debug, warn};

/// First word on the first line of `text`
pub fn first_word(text: &str) -> Option<&str> {
    text.lines().next()?.split_whitespace().next()
}

/// Run `paste_command` through `sh -c` and return its first word.
///
/// A failing paste command is reported as an empty clipboard.
pub fn clipboard_first_word(paste_command: &str) -> Option<String> {
    let output = match Command::new("sh").arg("-c").arg(paste_command).output() {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, command = paste_command, "Paste command could not be started");
            return None;
        }
    };
    if !output.status.success() {
        warn!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "Paste command failed"
        );
        return None;
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let word = first_word(&text).map(str::to_string);
    debug!(found = word.is_some(), "Read clipboard");
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_word_of_first_line() {
        assert_eq!(first_word("  10.1.1.1  uplink\nsecond line"), Some("10.1.1.1"));
        assert_eq!(first_word("core1\tGi0/1"), Some("core1"));
    }

    #[test]
    fn blank_first_line_is_empty() {
        assert_eq!(first_word("   \nhost-on-line-two"), None);
        assert_eq!(first_word(""), None);
    }

    #[test]
    fn runs_paste_command_through_shell() {
        assert_eq!(
            clipboard_first_word("printf 'edge7 site A\\nmore\\n'").as_deref(),
            Some("edge7")
        );
    }

    #[test]
    fn failing_paste_command_is_empty_clipboard() {
        assert_eq!(clipboard_first_word("echo host; exit 3"), None);
    }
}
