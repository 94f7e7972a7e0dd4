// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Popup menus and command prompts

/// Longest label shown untouched in a menu
const MAX_LABEL_CHARS: usize = 53;
/// Length a too-long label is cut to before the ellipsis
const CUT_LABEL_CHARS: usize = 50;
/// Room kept for the menu frame and shortcut column on narrow windows
const WINDOW_MARGIN: usize = 20;

/// A single menu line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    Item {
        label: String,
        /// Shortcut key in multiplexer key syntax; empty for none
        key: String,
        /// Multiplexer command executed on selection
        command: String,
    },
    Separator,
}

/// Popup menu anchored at the active pane
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            entries: Vec::new(),
        }
    }

    pub fn item(
        mut self,
        label: impl Into<String>,
        key: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        self.push_item(label, key, command);
        self
    }

    pub fn separator(mut self) -> Self {
        self.entries.push(MenuEntry::Separator);
        self
    }

    pub fn push_item(
        &mut self,
        label: impl Into<String>,
        key: impl Into<String>,
        command: impl Into<String>,
    ) {
        self.entries.push(MenuEntry::Item {
            label: label.into(),
            key: key.into(),
            command: command.into(),
        });
    }

    pub fn push_separator(&mut self) {
        self.entries.push(MenuEntry::Separator);
    }

    /// Labels of all items, separators skipped
    pub fn labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Item { label, .. } => Some(label.as_str()),
                MenuEntry::Separator => None,
            })
            .collect()
    }

    /// Find an item by its shortcut key
    pub fn find_by_key(&self, wanted: &str) -> Option<&MenuEntry> {
        self.entries
            .iter()
            .find(|e| matches!(e, MenuEntry::Item { key, .. } if key == wanted))
    }
}

/// Interactive one-line prompt; `%1` in the template is replaced by the answer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub label: String,
    pub initial: Option<String>,
    pub template: String,
}

/// Shortcut key for the 1-based `position` of an item in a long menu.
///
/// Digits cover the first ten items, then Meta-digits and Ctrl-digits, with
/// `0` standing for the tenth of each group. Items past thirty get no key.
pub fn menu_shortcut(position: usize) -> String {
    let digit = |n: usize| (n % 10).to_string();
    match position {
        1..=10 => digit(position),
        11..=20 => format!("M-{}", digit(position - 10)),
        21..=30 => format!("C-{}", digit(position - 20)),
        _ => String::new(),
    }
}

/// Shorten `word` so it fits a menu drawn in a window `window_width` cells wide
pub fn shorten_label(word: &str, window_width: usize) -> String {
    let mut short = if word.chars().count() > MAX_LABEL_CHARS {
        let mut cut: String = word.chars().take(CUT_LABEL_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        word.to_string()
    };

    if short.chars().count() >= window_width {
        let keep = window_width.saturating_sub(WINDOW_MARGIN);
        short = short.chars().take(keep).collect();
        short.push_str("...");
    }

    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_follow_digit_meta_ctrl_groups() {
        assert_eq!(menu_shortcut(1), "1");
        assert_eq!(menu_shortcut(9), "9");
        assert_eq!(menu_shortcut(10), "0");
        assert_eq!(menu_shortcut(11), "M-1");
        assert_eq!(menu_shortcut(20), "M-0");
        assert_eq!(menu_shortcut(21), "C-1");
        assert_eq!(menu_shortcut(29), "C-9");
        assert_eq!(menu_shortcut(30), "C-0");
        assert_eq!(menu_shortcut(31), "");
        assert_eq!(menu_shortcut(0), "");
    }

    #[test]
    fn short_labels_are_untouched() {
        assert_eq!(shorten_label("core-rtr-01", 200), "core-rtr-01");
    }

    #[test]
    fn long_labels_are_cut_to_fifty_chars() {
        let word = "x".repeat(60);
        let short = shorten_label(&word, 200);
        assert_eq!(short.len(), 53);
        assert!(short.ends_with("..."));
        assert!(short.starts_with(&"x".repeat(50)));
    }

    #[test]
    fn fifty_three_chars_still_fit() {
        let word = "y".repeat(53);
        assert_eq!(shorten_label(&word, 200), word);
    }

    #[test]
    fn narrow_windows_cut_harder() {
        let short = shorten_label("abcdefghijklmnopqrstuvwxyz0123", 30);
        assert_eq!(short, "abcdefghij...");
    }

    #[test]
    fn tiny_windows_do_not_underflow() {
        assert_eq!(shorten_label("router", 4), "...");
    }

    #[test]
    fn menu_builder_keeps_order_and_separators() {
        let menu = Menu::new("NOC")
            .item("New SSH", "s", "run true")
            .separator()
            .item("New Telnet", "q", "run false");

        assert_eq!(menu.entries.len(), 3);
        assert_eq!(menu.entries[1], MenuEntry::Separator);
        assert_eq!(menu.labels(), vec!["New SSH", "New Telnet"]);
        assert!(matches!(
            menu.find_by_key("q"),
            Some(MenuEntry::Item { command, .. }) if command == "run false"
        ));
        assert!(menu.find_by_key("x").is_none());
    }
}
