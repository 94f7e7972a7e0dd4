// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Popup menus and prompts
//!
//! Every item re-invokes tmux-noc through `run "..."`, carrying the split
//! direction along so the eventual pane opens where the operator asked.

use crate::clipboard::clipboard_first_word;
use crate::config::expand;
use crate::connect::validate_host;
use crate::error::Result;
use crate::sessions::{ConnectionType, SessionMetadata};
use crate::ssh_config::ssh_config_hosts;
use crate::NocContext;
use noc_mux_core::{menu_shortcut, shorten_label, Menu, Multiplexer, Prompt, SplitDirection};
use tracing::{debug, instrument, warn};

/// Placeholder offered when no host was used before
pub const DEFAULT_PROMPT_HOST: &str = "hostname";

pub const EMPTY_CLIPBOARD: &str = "No content in clipboard.";

/// tmux command that opens a pane the way `dir` asks
fn split_verb(dir: SplitDirection) -> &'static str {
    match dir {
        SplitDirection::Vertical => "split-window -v",
        SplitDirection::Horizontal => "split-window -h",
        SplitDirection::New => "new-window",
    }
}

/// `run "<binary> <args>"`
fn run_self(binary: &str, args: &str) -> String {
    format!("run \"{} {}\"", binary, args)
}

fn connect_command(binary: &str, ct: ConnectionType, host: &str, dir: SplitDirection) -> String {
    run_self(
        binary,
        &format!("connect-{} --host '{}' --split-direction {}", ct, host, dir),
    )
}

/// Main menu for opening panes in direction `dir`
pub fn build_noc_menu(
    ctx: &NocContext,
    dir: SplitDirection,
    sessions: &SessionMetadata,
    has_ssh_hosts: bool,
    window_width: usize,
) -> Menu {
    let bin = ctx.binary_word();
    let split = split_verb(dir);
    let mut menu = Menu::new(format!("NOC {}", dir.display_name()));

    let variants = [
        (SplitDirection::Vertical, "Split Vertical", "_"),
        (SplitDirection::Horizontal, "Split Horizontal", "|"),
        (SplitDirection::New, "Open in New Window", "n"),
    ];
    for (other, label, key) in variants.into_iter().filter(|(d, _, _)| *d != dir) {
        menu.push_item(
            label,
            key,
            run_self(&bin, &format!("noc-menu --split-direction {}", other)),
        );
    }
    menu.push_separator();

    menu.push_item(
        "Show Sessions History",
        "h",
        format!(
            "{} \"less +G '{}'\"; select-pane -T \"Sessions History\"; {}",
            split,
            ctx.paths.history_file.display(),
            run_self(&bin, "rename-window")
        ),
    );
    menu.push_item(
        "Open Log File",
        "l",
        format!(
            "command-prompt -p \"Open Log Number:\" \"run \\\"{} open-log --history-index %1 --split-direction {}\\\"\"",
            bin, dir
        ),
    );
    menu.push_item(
        "Search in Logs",
        "L",
        format!(
            "{} \"{} search-logs\"; select-pane -T \"grep in logs\"",
            split, bin
        ),
    );

    if dir == SplitDirection::New {
        menu.push_separator();
        menu.push_item(
            "Send Commands with Delay",
            "d",
            format!(
                "split-window -h \"{} send-with-delay --pane-id $(tmux display -pt - '#{{pane_id}}')\"",
                bin
            ),
        );
    }

    menu.push_separator();
    menu.push_item(
        "Connect from Clipboard",
        "v",
        run_self(&bin, &format!("clipboard-menu --split-direction {}", dir)),
    );
    for (ct, label, key) in [
        (ConnectionType::Telnet, "New Telnet", "q"),
        (ConnectionType::Ssh, "New SSH", "s"),
    ] {
        menu.push_item(
            label,
            key,
            run_self(
                &bin,
                &format!(
                    "setup-connection --connection-type {} --split-direction {}",
                    ct, dir
                ),
            ),
        );
    }
    if has_ssh_hosts {
        menu.push_item(
            "SSH Config Hosts",
            "S",
            run_self(&bin, &format!("ssh-menu --split-direction {}", dir)),
        );
    }

    let recent: Vec<_> = sessions
        .recent()
        .iter()
        .filter(|s| validate_host(&s.host).is_ok())
        .collect();
    if !recent.is_empty() {
        menu.push_separator();
        for (i, session) in recent.iter().enumerate() {
            menu.push_item(
                format!(
                    "{} {}",
                    session.connection_type,
                    shorten_label(&session.host, window_width)
                ),
                (i + 1).to_string(),
                connect_command(&bin, session.connection_type, &session.host, dir),
            );
        }
    }

    menu
}

/// Show the main menu
#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "noc_menu"))]
pub fn noc_menu(ctx: &NocContext, mux: &dyn Multiplexer, dir: SplitDirection) -> Result<()> {
    let sessions = ctx.session_store().load()?;
    let has_ssh_hosts = ssh_config_hosts(&ctx.paths.ssh_config)?.is_some();
    let width = mux.window_width()?;
    let menu = build_noc_menu(ctx, dir, &sessions, has_ssh_hosts, width);
    debug!(items = menu.labels().len(), "Showing NOC menu");
    mux.display_menu(&menu)?;
    Ok(())
}

/// Menu with one SSH item per configured host
pub fn build_ssh_menu<S: AsRef<str>>(
    ctx: &NocContext,
    dir: SplitDirection,
    hosts: &[S],
    window_width: usize,
) -> Menu {
    let bin = ctx.binary_word();
    let mut menu = Menu::new("SSH Config Hosts");
    for (i, host) in hosts.iter().enumerate() {
        let host = host.as_ref();
        menu.push_item(
            shorten_label(host, window_width),
            menu_shortcut(i + 1),
            connect_command(&bin, ConnectionType::Ssh, host, dir),
        );
    }
    menu
}

#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "ssh_menu"))]
pub fn ssh_menu(ctx: &NocContext, mux: &dyn Multiplexer, dir: SplitDirection) -> Result<()> {
    let hosts: Vec<String> = ssh_config_hosts(&ctx.paths.ssh_config)?
        .unwrap_or_default()
        .into_iter()
        .filter(|h| validate_host(h).is_ok())
        .collect();
    let width = mux.window_width()?;
    mux.display_menu(&build_ssh_menu(ctx, dir, &hosts, width))?;
    Ok(())
}

/// Telnet and SSH items for a word taken from the clipboard
pub fn build_clipboard_menu(
    ctx: &NocContext,
    dir: SplitDirection,
    word: &str,
    window_width: usize,
) -> Menu {
    let bin = ctx.binary_word();
    let short = shorten_label(word, window_width);
    Menu::new("Clipboard")
        .item(
            format!("telnet {}", short),
            "v",
            connect_command(&bin, ConnectionType::Telnet, word, dir),
        )
        .item(
            format!("ssh {}", short),
            "V",
            connect_command(&bin, ConnectionType::Ssh, word, dir),
        )
}

#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "clipboard_menu"))]
pub fn clipboard_menu(ctx: &NocContext, mux: &dyn Multiplexer, dir: SplitDirection) -> Result<()> {
    let paste = expand(&ctx.config.clipboard.paste_command, &ctx.paths, None);
    let Some(word) = clipboard_first_word(&paste) else {
        mux.display_message(EMPTY_CLIPBOARD)?;
        return Ok(());
    };
    if let Err(e) = validate_host(&word) {
        warn!(error = %e, "Clipboard does not hold a usable host");
        mux.display_message(&e.to_string())?;
        return Ok(());
    }

    let width = mux.window_width()?;
    mux.display_menu(&build_clipboard_menu(ctx, dir, &word, width))?;
    Ok(())
}

/// Host prompt pre-filled with the last host of `connection_type`
pub fn build_connection_prompt(
    ctx: &NocContext,
    connection_type: ConnectionType,
    dir: SplitDirection,
    sessions: &SessionMetadata,
) -> Prompt {
    let initial = sessions
        .last_host(connection_type)
        .unwrap_or(DEFAULT_PROMPT_HOST);
    Prompt {
        label: format!("{}:", connection_type),
        initial: Some(initial.to_string()),
        template: connect_command(&ctx.binary_word(), connection_type, "%1", dir),
    }
}

#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "setup_connection"))]
pub fn setup_connection(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    connection_type: ConnectionType,
    dir: SplitDirection,
) -> Result<()> {
    let sessions = ctx.session_store().load()?;
    mux.command_prompt(&build_connection_prompt(ctx, connection_type, dir, &sessions))?;
    Ok(())
}
