// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Finding, opening and searching pane logs

use crate::error::{Error, Result};
use crate::window::rename_window;
use crate::NocContext;
use crossterm::style::Stylize;
use noc_mux_core::{Multiplexer, SplitDirection};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Most recent log file of session `index` under `log_dir`
pub fn find_log(log_dir: &Path, index: &str) -> Option<PathBuf> {
    let marker = format!("---!{}_", index);
    WalkDir::new(log_dir)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(error = %e, "Skipping unreadable log entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.file_name().to_string_lossy().contains(&marker))
        .map(|entry| entry.into_path())
        .max()
}

/// Pane title for a log: its path relative to the log directory
pub fn log_title(log_dir: &Path, log_file: &Path) -> String {
    let relative = log_file.strip_prefix(log_dir).unwrap_or(log_file);
    format!("Log:{}", relative.display())
}

/// Pager command shown in the log pane
pub fn pager_command(log_file: &Path) -> String {
    format!("less -m \"{}\"", log_file.display())
}

/// Open the log of session `index` in a new pane
#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "open_log"))]
pub fn open_log(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    index: &str,
    dir: SplitDirection,
) -> Result<Option<PathBuf>> {
    let Some(log_file) = find_log(&ctx.paths.log_dir, index) else {
        warn!(index, "No log for session");
        mux.display_message(&format!("{}.", Error::LogNotFound(index.to_string())))?;
        return Ok(None);
    };

    mux.open_pane(dir, Some(&pager_command(&log_file)))?;
    mux.set_pane_title(&log_title(&ctx.paths.log_dir, &log_file))?;
    rename_window(mux)?;
    info!(log_file = %log_file.display(), "Opened log");
    Ok(Some(log_file))
}

/// Recursive grep over the log directory
pub fn grep_command(log_dir: &Path, query: &str) -> Command {
    let mut cmd = Command::new("grep");
    cmd.args(["--color=always", "-n", "-r", query, "."])
        .current_dir(log_dir);
    cmd
}

/// Interactive grep prompt; returns when `input` reaches end of file
#[instrument(skip_all, fields(component = "noc_core", operation = "search_logs"))]
pub fn search_logs<R, W>(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    mut input: R,
    out: &mut W,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    rename_window(mux)?;

    loop {
        write!(out, "{} ", "grep in logs:".yellow())?;
        out.flush()?;

        let mut query = String::new();
        if input.read_line(&mut query)? == 0 {
            writeln!(out)?;
            return Ok(());
        }
        let query = query.trim_end_matches(['\r', '\n']);
        if query.trim().is_empty() {
            writeln!(out, "{}", "Empty query.".red())?;
            continue;
        }

        debug!(query, "Searching logs");
        let output = grep_command(&ctx.paths.log_dir, query).output()?;
        out.write_all(&output.stdout)?;
        out.write_all(&output.stderr)?;
        out.flush()?;
    }
}
