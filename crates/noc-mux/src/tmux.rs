// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! tmux multiplexer implementation
//!
//! Implements the Multiplexer trait for tmux using its command-line interface.
//! Commands without an explicit target act on the client tmux considers
//! current, which is the one that invoked the key binding or menu.

use noc_mux_core::*;
use std::process::{Command, Stdio};
use tracing::{debug, trace};

/// tmux multiplexer implementation
#[derive(Debug, Clone, Default)]
pub struct TmuxMultiplexer {
    /// Private server socket (`tmux -L`); `None` talks to the default server
    socket_name: Option<String>,
}

impl TmuxMultiplexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to a private tmux server (useful for tests)
    pub fn with_socket_name(socket_name: impl Into<String>) -> Self {
        Self {
            socket_name: Some(socket_name.into()),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("tmux");
        if let Some(socket) = &self.socket_name {
            cmd.args(["-L", socket.as_str()]);
        }
        cmd
    }

    /// Run a tmux command and return its raw stdout
    pub fn run_tmux_command_raw<S: AsRef<str>>(&self, args: &[S]) -> Result<String, MuxError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        trace!(args = ?args, "Running tmux command");

        let output = self.command().args(&args).output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MuxError::NotAvailable("tmux")
            } else {
                MuxError::Io(e)
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(MuxError::CommandFailed(format!(
                "tmux {} failed: {}",
                args.join(" "),
                stderr.trim()
            )))
        }
    }

    /// Run a tmux command and return its trimmed output
    pub fn run_tmux_command<S: AsRef<str>>(&self, args: &[S]) -> Result<String, MuxError> {
        Ok(self.run_tmux_command_raw(args)?.trim().to_string())
    }
}

/// Double `#` so tmux shows `message` as written instead of expanding formats
pub fn escape_format(message: &str) -> String {
    message.replace('#', "##")
}

/// Arguments opening a pane or window running `shell_cmd`
pub fn open_pane_args(dir: SplitDirection, shell_cmd: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = match dir {
        SplitDirection::Vertical => vec!["split-window".into(), "-v".into()],
        SplitDirection::Horizontal => vec!["split-window".into(), "-h".into()],
        SplitDirection::New => vec!["new-window".into()],
    };
    if let Some(cmd) = shell_cmd {
        args.push(cmd.to_string());
    }
    args
}

/// Arguments for `display-menu`, anchored at the active pane
pub fn menu_args(menu: &Menu) -> Vec<String> {
    let mut args = vec![
        "display-menu".to_string(),
        "-T".to_string(),
        format!("#[align=centre]{}", menu.title),
        "-x".to_string(),
        "P".to_string(),
        "-y".to_string(),
        "S".to_string(),
    ];
    for entry in &menu.entries {
        match entry {
            MenuEntry::Item {
                label,
                key,
                command,
            } => {
                args.push(label.clone());
                args.push(key.clone());
                args.push(command.clone());
            }
            MenuEntry::Separator => args.push(String::new()),
        }
    }
    args
}

/// Arguments for `command-prompt`
pub fn prompt_args(prompt: &Prompt) -> Vec<String> {
    let mut args = vec![
        "command-prompt".to_string(),
        "-p".to_string(),
        prompt.label.clone(),
    ];
    if let Some(initial) = &prompt.initial {
        args.push("-I".to_string());
        args.push(initial.clone());
    }
    args.push(prompt.template.clone());
    args
}

/// Arguments for `capture-pane`
pub fn capture_args(opts: &CaptureOptions<'_>) -> Vec<String> {
    let mut args = vec!["capture-pane".to_string()];
    if opts.join_wrapped {
        args.push("-J".to_string());
    }
    args.push("-p".to_string());
    if let Some(n) = opts.history_lines {
        args.push("-S".to_string());
        args.push(format!("-{}", n));
    }
    if let Some(target) = opts.target {
        args.push("-t".to_string());
        args.push(target.to_string());
    }
    args
}

impl Multiplexer for TmuxMultiplexer {
    fn id(&self) -> &'static str {
        "tmux"
    }

    fn is_available(&self) -> bool {
        Command::new("tmux")
            .arg("-V")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn open_pane(&self, dir: SplitDirection, shell_cmd: Option<&str>) -> Result<(), MuxError> {
        debug!(direction = %dir, "Opening pane");
        self.run_tmux_command(open_pane_args(dir, shell_cmd).as_slice())?;
        Ok(())
    }

    fn set_pane_title(&self, title: &str) -> Result<(), MuxError> {
        self.run_tmux_command(&["select-pane", "-T", title])?;
        Ok(())
    }

    fn pane_titles(&self) -> Result<Vec<String>, MuxError> {
        let output = self.run_tmux_command_raw(&["list-panes", "-F", "#{pane_title}"])?;
        Ok(output.lines().map(|l| l.to_string()).collect())
    }

    fn rename_window(&self, name: &str) -> Result<(), MuxError> {
        self.run_tmux_command(&["rename-window", name])?;
        Ok(())
    }

    fn enable_automatic_rename(&self) -> Result<(), MuxError> {
        self.run_tmux_command(&["set", "-w", "automatic-rename"])?;
        Ok(())
    }

    fn window_width(&self) -> Result<usize, MuxError> {
        let output = self.run_tmux_command(&["display-message", "-p", "#{window_width}"])?;
        output
            .parse()
            .map_err(|_| MuxError::Parse(format!("window width '{}'", output)))
    }

    fn display_message(&self, message: &str) -> Result<(), MuxError> {
        self.run_tmux_command(&["display-message", &escape_format(message)])?;
        Ok(())
    }

    fn display_menu(&self, menu: &Menu) -> Result<(), MuxError> {
        debug!(title = %menu.title, entries = menu.entries.len(), "Displaying menu");
        self.run_tmux_command(menu_args(menu).as_slice())?;
        Ok(())
    }

    fn command_prompt(&self, prompt: &Prompt) -> Result<(), MuxError> {
        self.run_tmux_command(prompt_args(prompt).as_slice())?;
        Ok(())
    }

    fn pipe_pane(&self, shell_cmd: &str) -> Result<(), MuxError> {
        self.run_tmux_command(&["pipe-pane", "-o", shell_cmd])?;
        Ok(())
    }

    fn send_text(&self, target: &str, text: &str) -> Result<(), MuxError> {
        if text.is_empty() {
            return Ok(());
        }
        self.run_tmux_command(&["send-keys", "-t", target, "-l", text])?;
        Ok(())
    }

    fn send_enter(&self, target: &str) -> Result<(), MuxError> {
        self.run_tmux_command(&["send-keys", "-t", target, "Enter"])?;
        Ok(())
    }

    fn capture_pane(&self, opts: &CaptureOptions<'_>) -> Result<String, MuxError> {
        self.run_tmux_command_raw(capture_args(opts).as_slice())
    }
}
