// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pane output logging
//!
//! A log is started by piping the pane (`pipe-pane -o`) into
//! `tmux-noc save-pane-history`. The piped bytes are only a change signal:
//! each time output arrives, the pane's whole scrollback is captured with
//! wrapped lines joined and written over the log file. The file therefore
//! reads like the screen did, without raw escape sequences.

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::sessions::ConnectionType;
use crate::{shell_word, NocContext};
use chrono::{DateTime, Local};
use noc_mux_core::{CaptureOptions, Multiplexer};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// Tag and index label used for the pane the user is sitting in
pub const LOCAL_TAG: char = 'l';
pub const LOCAL_HOST: &str = "local";
pub const LOCAL_INDEX: &str = "--";

/// What a log file belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogSource {
    Session {
        index: u64,
        connection_type: ConnectionType,
    },
    Local,
}

impl LogSource {
    fn index_label(&self) -> String {
        match self {
            LogSource::Session { index, .. } => index.to_string(),
            LogSource::Local => LOCAL_INDEX.to_string(),
        }
    }

    fn tag(&self) -> char {
        match self {
            LogSource::Session {
                connection_type, ..
            } => connection_type.tag(),
            LogSource::Local => LOCAL_TAG,
        }
    }
}

/// `<log_dir>/YYYY/MM/DD/HH_MM_SS---!<index>_<tag>_<host>.log`
pub fn log_file_path(
    log_dir: &Path,
    now: &DateTime<Local>,
    source: LogSource,
    host: &str,
) -> PathBuf {
    log_dir
        .join(now.format("%Y").to_string())
        .join(now.format("%m").to_string())
        .join(now.format("%d").to_string())
        .join(format!(
            "{}---!{}_{}_{}.log",
            now.format("%H_%M_%S"),
            source.index_label(),
            source.tag(),
            host
        ))
}

/// Shell command tmux runs with the pane output on stdin
pub fn pipe_command(binary: &str, log_file: &Path) -> String {
    format!(
        "{} save-pane-history --file-name {} --pane-id '#{{pane_id}}'",
        binary,
        shell_word(&log_file.display().to_string())
    )
}

/// Start logging the active pane; returns the log file path
#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "start_pane_log"))]
pub fn start_pane_log(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    source: LogSource,
    host: &str,
    now: &DateTime<Local>,
) -> Result<PathBuf> {
    let path = log_file_path(&ctx.paths.log_dir, now, source, host);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    mux.pipe_pane(&pipe_command(&ctx.binary_word(), &path))?;
    info!(log_file = %path.display(), "Pane logging started");
    Ok(path)
}

/// Log the current, unconnected pane
pub fn toggle_local_log(ctx: &NocContext, mux: &dyn Multiplexer) -> Result<PathBuf> {
    start_pane_log(ctx, mux, LogSource::Local, LOCAL_HOST, &Local::now())
}

/// Capture `pane` once and overwrite `file`; returns false for an empty capture
pub fn write_snapshot(
    mux: &dyn Multiplexer,
    settings: &CaptureConfig,
    file: &Path,
    pane: &str,
) -> Result<bool> {
    let contents = mux.capture_pane(&CaptureOptions {
        target: Some(pane),
        join_wrapped: true,
        history_lines: Some(settings.history_lines),
    })?;
    if contents.is_empty() {
        return Ok(false);
    }
    fs::write(file, contents)?;
    Ok(true)
}

fn snapshot_or_warn(
    mux: &dyn Multiplexer,
    settings: &CaptureConfig,
    file: &Path,
    pane: &str,
) -> bool {
    match write_snapshot(mux, settings, file, pane) {
        Ok(written) => written,
        Err(e) => {
            warn!(error = %e, pane, "Pane snapshot failed");
            false
        }
    }
}

/// Keep `file` in sync with `pane` while output keeps arriving on `input`.
///
/// Bursts of output are coalesced into at most one snapshot per
/// `settings.interval_ms`; a last snapshot is taken when the input closes.
/// Returns the number of snapshots written.
#[instrument(skip(mux, settings, input), fields(component = "noc_core", operation = "save_pane_history"))]
pub async fn save_pane_history<R>(
    mux: &dyn Multiplexer,
    settings: &CaptureConfig,
    file: &Path,
    pane: &str,
    mut input: R,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut ticker = tokio::time::interval(settings.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut buf = [0u8; 8192];
    let mut pending = false;
    let mut written = 0;

    loop {
        tokio::select! {
            read = input.read(&mut buf) => {
                if read? == 0 {
                    break;
                }
                pending = true;
            }
            _ = ticker.tick(), if pending => {
                pending = false;
                if snapshot_or_warn(mux, settings, file, pane) {
                    written += 1;
                }
            }
        }
    }

    if pending && snapshot_or_warn(mux, settings, file, pane) {
        written += 1;
    }

    debug!(written, "Pane output closed");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingMux};
    use chrono::TimeZone;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 1, 5, h, m, s).unwrap()
    }

    #[test]
    fn session_log_path_carries_index_tag_and_host() {
        let path = log_file_path(
            Path::new("/noc/local/log"),
            &at(7, 3, 9),
            LogSource::Session {
                index: 12,
                connection_type: ConnectionType::Ssh,
            },
            "core1",
        );
        assert_eq!(
            path,
            PathBuf::from("/noc/local/log/2024/01/05/07_03_09---!12_s_core1.log")
        );
    }

    #[test]
    fn local_log_path_uses_dashes() {
        let path = log_file_path(Path::new("/l"), &at(23, 0, 0), LogSource::Local, LOCAL_HOST);
        assert_eq!(path, PathBuf::from("/l/2024/01/05/23_00_00---!--_l_local.log"));
    }

    #[test]
    fn pipe_command_defers_pane_id_to_tmux() {
        let cmd = pipe_command("/usr/bin/tmux-noc", Path::new("/l/x.log"));
        assert_eq!(
            cmd,
            "/usr/bin/tmux-noc save-pane-history --file-name /l/x.log --pane-id '#{pane_id}'"
        );
    }

    #[test]
    fn pipe_command_quotes_awkward_log_paths() {
        let cmd = pipe_command("tmux-noc", Path::new("/home/o'neil/noc/x.log"));
        assert_eq!(
            cmd,
            r"tmux-noc save-pane-history --file-name '/home/o'\''neil/noc/x.log' --pane-id '#{pane_id}'"
        );
    }

    #[test]
    fn toggle_log_pipes_current_pane_into_local_log() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NocContext::for_tests(dir.path());
        let mux = RecordingMux::new();

        let path = toggle_local_log(&ctx, &mux).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.ends_with("---!--_l_local.log"), "{name}");
        assert!(path.starts_with(&ctx.paths.log_dir));
        assert!(path.parent().unwrap().is_dir());
        assert_eq!(
            mux.calls(),
            vec![Call::PipePane(pipe_command("tmux-noc", &path))]
        );
    }

    #[test]
    fn start_pane_log_creates_day_directory_and_pipes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NocContext::for_tests(dir.path());
        let mux = RecordingMux::new();

        let path = start_pane_log(
            &ctx,
            &mux,
            LogSource::Session {
                index: 3,
                connection_type: ConnectionType::Telnet,
            },
            "10.0.0.1",
            &at(12, 0, 1),
        )
        .unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert!(path.ends_with("2024/01/05/12_00_01---!3_t_10.0.0.1.log"));
        assert_eq!(
            mux.calls(),
            vec![Call::PipePane(pipe_command("tmux-noc", &path))]
        );
    }

    #[test]
    fn empty_capture_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pane.log");
        let mux = RecordingMux::new().with_captures(&[""]);

        let written = write_snapshot(&mux, &CaptureConfig::default(), &file, "%1").unwrap();
        assert!(!written);
        assert!(!file.exists());
    }

    #[test]
    fn snapshot_captures_joined_scrollback_of_target_pane() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pane.log");
        let mux = RecordingMux::new().with_captures(&["router#show clock\n"]);

        assert!(write_snapshot(&mux, &CaptureConfig::default(), &file, "%4").unwrap());
        assert_eq!(fs::read_to_string(&file).unwrap(), "router#show clock\n");
        assert_eq!(
            mux.calls(),
            vec![Call::Capture {
                target: Some("%4".into()),
                join_wrapped: true,
                history_lines: Some(20000),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_are_coalesced_and_final_state_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pane.log");
        let mux = RecordingMux::new().with_captures(&["one\n", "one\ntwo\n", "one\ntwo\nthree\n"]);
        let settings = CaptureConfig::default();

        let (mut tx, rx) = tokio::io::duplex(1024);
        let writer = async move {
            for chunk in [&b"one\r\n"[..], b"two\r\n", b"three\r\n"] {
                tx.write_all(chunk).await.unwrap();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            drop(tx);
        };

        let (written, ()) = tokio::join!(
            save_pane_history(&mux, &settings, &file, "%2", rx),
            writer
        );

        // First chunk snapshots immediately, the rest fall into one interval
        // and are flushed when the pipe closes.
        assert_eq!(written.unwrap(), 2);
        assert_eq!(fs::read_to_string(&file).unwrap(), "one\ntwo\n");
    }

    #[tokio::test(start_paused = true)]
    async fn no_output_means_no_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pane.log");
        let mux = RecordingMux::new().with_captures(&["x"]);

        let written = save_pane_history(&mux, &CaptureConfig::default(), &file, "%2", tokio::io::empty())
            .await
            .unwrap();

        assert_eq!(written, 0);
        assert!(mux.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn vanished_pane_does_not_abort_logging() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("pane.log");
        let mux = RecordingMux::new().with_failing_captures(1).with_captures(&["later\n"]);

        let written = save_pane_history(&mux, &CaptureConfig::default(), &file, "%2", &b"data"[..])
            .await
            .unwrap();

        assert_eq!(written, 0);
        assert!(!file.exists());
    }
}
