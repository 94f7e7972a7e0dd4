// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Paced keystroke playback into another pane
//!
//! The operator pastes a list of lines, ends it with a single `.`, picks a
//! delay between lines and optionally between characters, then watches the
//! lines being typed into the target pane with the current one highlighted.

use crate::error::{Error, Result};
use crate::window::rename_window;
use crate::NocContext;
use crossterm::cursor::MoveTo;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use noc_mux_core::Multiplexer;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const PANE_TITLE: &str = "Send with delay";

/// Line that ends the command list
const END_OF_LIST: &str = ".";

/// Lines kept above the current one once the preview scrolls
const CONTEXT_ABOVE: usize = 5;

/// Terminal height assumed when it cannot be queried
const FALLBACK_ROWS: u16 = 24;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DelayError {
    #[error("Enter an integer.")]
    NotInteger,
    #[error("Enter a positive integer or 0.")]
    Negative,
}

/// Parse a delay answer in milliseconds; an empty answer takes `default`
pub fn parse_delay(answer: &str, default: u64) -> std::result::Result<u64, DelayError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    let value: i64 = answer.parse().map_err(|_| DelayError::NotInteger)?;
    u64::try_from(value).map_err(|_| DelayError::Negative)
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

/// Lines up to the terminating `.`; end of input also ends the list
pub fn read_commands<R: BufRead>(input: &mut R) -> Result<Vec<String>> {
    let mut commands = Vec::new();
    while let Some(line) = read_line(input)? {
        if line == END_OF_LIST {
            break;
        }
        commands.push(line);
    }
    Ok(commands)
}

/// Ask for a delay until a valid answer is given
pub fn prompt_delay<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    what: &str,
    default: u64,
) -> Result<u64> {
    loop {
        write!(
            out,
            "{}",
            format!("Enter {} delay in milliseconds [{}]: ", what, default).yellow()
        )?;
        out.flush()?;

        let Some(answer) = read_line(input)? else {
            return Err(Error::Input(format!("no {} delay given", what)));
        };
        match parse_delay(&answer, default) {
            Ok(delay) => return Ok(delay),
            Err(e) => writeln!(out, "{}", e.to_string().red())?,
        }
    }
}

/// Range of `commands` shown while line `index` is sent on a screen of `rows` usable rows.
///
/// Returns `(first, end)`: lines `first..index` are shown above the current
/// one and `index + 1..end` below it.
pub fn preview_window(len: usize, index: usize, rows: usize) -> (usize, usize) {
    let offset = if len > rows && index > CONTEXT_ABOVE {
        index - CONTEXT_ABOVE
    } else {
        0
    };
    let end = (rows + offset).min(len).max(index + 1);
    (offset, end)
}

/// Redraw the preview with line `index` highlighted
pub fn render_preview<W: Write>(
    out: &mut W,
    commands: &[String],
    index: usize,
    rows: usize,
) -> Result<()> {
    let (first, end) = preview_window(commands.len(), index, rows);

    out.queue(Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
    for line in &commands[first..index] {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "{}", commands[index].as_str().green().bold())?;
    for line in &commands[index + 1..end] {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

/// Pacing for [`play`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub line_delay: Duration,
    pub char_delay: Duration,
}

/// Type `commands` into `pane`, redrawing the preview before each line
#[instrument(skip(mux, commands, out), fields(component = "noc_core", operation = "play", lines = commands.len()))]
pub async fn play<W: Write>(
    mux: &dyn Multiplexer,
    pane: &str,
    commands: &[String],
    pacing: Pacing,
    rows: usize,
    out: &mut W,
) -> Result<()> {
    for (index, command) in commands.iter().enumerate() {
        render_preview(out, commands, index, rows)?;

        if pacing.char_delay.is_zero() {
            mux.send_text(pane, command)?;
        } else {
            let mut buf = [0u8; 4];
            for ch in command.chars() {
                mux.send_text(pane, ch.encode_utf8(&mut buf))?;
                tokio::time::sleep(pacing.char_delay).await;
            }
        }
        mux.send_enter(pane)?;

        if index + 1 < commands.len() {
            tokio::time::sleep(pacing.line_delay).await;
        }
    }
    Ok(())
}

/// Usable preview rows of the controlling terminal
pub fn preview_rows() -> usize {
    let rows = crossterm::terminal::size()
        .map(|(_, rows)| rows)
        .unwrap_or(FALLBACK_ROWS);
    usize::from(rows).saturating_sub(2)
}

/// Interactive session run in its own pane, typing into `pane`
#[instrument(skip(ctx, mux, input, out), fields(component = "noc_core", operation = "send_with_delay"))]
pub async fn send_with_delay<R, W>(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    pane: &str,
    mut input: R,
    out: &mut W,
    rows: usize,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    mux.set_pane_title(PANE_TITLE)?;
    rename_window(mux)?;

    writeln!(
        out,
        "{}\n.",
        "What to send? To end list enter a single dot".yellow()
    )?;
    let commands = read_commands(&mut input)?;
    if commands.is_empty() {
        debug!("Nothing to send");
        return Ok(0);
    }

    let defaults = &ctx.config.send;
    let line_delay = prompt_delay(&mut input, out, "LINE", defaults.line_delay_ms)?;
    let char_delay = prompt_delay(&mut input, out, "CHARACTER", defaults.char_delay_ms)?;
    let pacing = Pacing {
        line_delay: Duration::from_millis(line_delay),
        char_delay: Duration::from_millis(char_delay),
    };

    play(mux, pane, &commands, pacing, rows, out).await?;
    info!(lines = commands.len(), line_delay, char_delay, "Playback finished");
    Ok(commands.len())
}
