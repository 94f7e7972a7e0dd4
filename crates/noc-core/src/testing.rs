// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory multiplexer that records calls and replays scripted captures

use noc_mux_core::{CaptureOptions, Menu, Multiplexer, MuxError, Prompt, SplitDirection};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded multiplexer call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    OpenPane(SplitDirection, Option<String>),
    SetPaneTitle(String),
    PaneTitles,
    RenameWindow(String),
    AutomaticRename,
    WindowWidth,
    DisplayMessage(String),
    DisplayMenu(Menu),
    CommandPrompt(Prompt),
    PipePane(String),
    SendText(String, String),
    SendEnter(String),
    Capture {
        target: Option<String>,
        join_wrapped: bool,
        history_lines: Option<usize>,
    },
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    captures: VecDeque<String>,
    last_capture: String,
    failing_captures: usize,
}

#[derive(Debug)]
pub struct RecordingMux {
    state: Mutex<State>,
    pane_titles: Vec<String>,
    window_width: usize,
}

impl Default for RecordingMux {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingMux {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            pane_titles: Vec::new(),
            window_width: 200,
        }
    }

    pub fn with_pane_titles(mut self, titles: &[&str]) -> Self {
        self.pane_titles = titles.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_window_width(mut self, width: usize) -> Self {
        self.window_width = width;
        self
    }

    /// Queue pane contents; the last one keeps being returned once the queue drains
    pub fn with_captures(self, captures: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.captures.extend(captures.iter().map(|c| c.to_string()));
        }
        self
    }

    /// Make the next `n` captures fail as if the pane were gone
    pub fn with_failing_captures(self, n: usize) -> Self {
        self.state.lock().unwrap().failing_captures = n;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Only the calls matching `pred`
    pub fn calls_where(&self, pred: impl Fn(&Call) -> bool) -> Vec<Call> {
        self.calls().into_iter().filter(|c| pred(c)).collect()
    }

    /// Text typed into panes, in order, with Enter shown as `\n`
    pub fn typed(&self) -> String {
        let mut out = String::new();
        for call in self.calls() {
            match call {
                Call::SendText(_, text) => out.push_str(&text),
                Call::SendEnter(_) => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Multiplexer for RecordingMux {
    fn id(&self) -> &'static str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn open_pane(&self, dir: SplitDirection, shell_cmd: Option<&str>) -> Result<(), MuxError> {
        self.record(Call::OpenPane(dir, shell_cmd.map(str::to_string)));
        Ok(())
    }

    fn set_pane_title(&self, title: &str) -> Result<(), MuxError> {
        self.record(Call::SetPaneTitle(title.to_string()));
        Ok(())
    }

    fn pane_titles(&self) -> Result<Vec<String>, MuxError> {
        self.record(Call::PaneTitles);
        Ok(self.pane_titles.clone())
    }

    fn rename_window(&self, name: &str) -> Result<(), MuxError> {
        self.record(Call::RenameWindow(name.to_string()));
        Ok(())
    }

    fn enable_automatic_rename(&self) -> Result<(), MuxError> {
        self.record(Call::AutomaticRename);
        Ok(())
    }

    fn window_width(&self) -> Result<usize, MuxError> {
        self.record(Call::WindowWidth);
        Ok(self.window_width)
    }

    fn display_message(&self, message: &str) -> Result<(), MuxError> {
        self.record(Call::DisplayMessage(message.to_string()));
        Ok(())
    }

    fn display_menu(&self, menu: &Menu) -> Result<(), MuxError> {
        self.record(Call::DisplayMenu(menu.clone()));
        Ok(())
    }

    fn command_prompt(&self, prompt: &Prompt) -> Result<(), MuxError> {
        self.record(Call::CommandPrompt(prompt.clone()));
        Ok(())
    }

    fn pipe_pane(&self, shell_cmd: &str) -> Result<(), MuxError> {
        self.record(Call::PipePane(shell_cmd.to_string()));
        Ok(())
    }

    fn send_text(&self, target: &str, text: &str) -> Result<(), MuxError> {
        self.record(Call::SendText(target.to_string(), text.to_string()));
        Ok(())
    }

    fn send_enter(&self, target: &str) -> Result<(), MuxError> {
        self.record(Call::SendEnter(target.to_string()));
        Ok(())
    }

    fn capture_pane(&self, opts: &CaptureOptions<'_>) -> Result<String, MuxError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Capture {
            target: opts.target.map(str::to_string),
            join_wrapped: opts.join_wrapped,
            history_lines: opts.history_lines,
        });
        if state.failing_captures > 0 {
            state.failing_captures -= 1;
            return Err(MuxError::CommandFailed("can't find pane".into()));
        }
        if let Some(next) = state.captures.pop_front() {
            state.last_capture = next;
        }
        Ok(state.last_capture.clone())
    }
}
