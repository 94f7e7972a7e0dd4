// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Opening telnet and SSH session panes
//!
//! A session pane runs an interactive bash whose rc file executes
//! `$PROMPT_COMMAND` once, so the operator lands back in a shell when the
//! client exits instead of losing the pane.

use crate::config::expand;
use crate::error::{Error, Result};
use crate::pane_log::{start_pane_log, LogSource};
use crate::sessions::{record_session, ConnectionType};
use crate::window::rename_window;
use crate::NocContext;
use chrono::Local;
use noc_mux_core::{Multiplexer, SplitDirection};
use std::path::PathBuf;
use tracing::{info, instrument};

const FORBIDDEN_HOST_CHARS: &[char] = &['"', '\'', '`', '$', ';', '&', '|', '<', '>', '\\', '\n', '\r'];

/// tmux expands `#(...)` and `#{...}` in pane-pipe commands and menus; `/`
/// would split the log file name into directories
const FORBIDDEN_FORMAT_CHARS: &[char] = &['#', '(', ')', '{', '}', '/'];

/// Reject hosts that would break out of the quoted pane command or the
/// log file name
pub fn validate_host(host: &str) -> Result<&str> {
    let trimmed = host.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidHost {
            host: host.to_string(),
            reason: "empty host",
        });
    }
    if host.contains(FORBIDDEN_HOST_CHARS) {
        return Err(Error::InvalidHost {
            host: host.to_string(),
            reason: "contains shell metacharacters",
        });
    }
    if host.contains(FORBIDDEN_FORMAT_CHARS) {
        return Err(Error::InvalidHost {
            host: host.to_string(),
            reason: "contains tmux format or path characters",
        });
    }
    Ok(trimmed)
}

/// Shell command run in the new pane
pub fn pane_command(ctx: &NocContext, connection_type: ConnectionType, host: &str) -> String {
    let connect = &ctx.config.connect;
    let (client, term) = match connection_type {
        ConnectionType::Telnet => (&connect.telnet_command, connect.telnet_term.as_str()),
        ConnectionType::Ssh => (&connect.ssh_command, ""),
    };

    let mut cmd = format!(
        "PROMPT_COMMAND=\"{}\" ",
        expand(client, &ctx.paths, Some(host))
    );
    if !term.is_empty() {
        cmd.push_str(&format!("TERM={} ", term));
    }
    cmd.push_str(&format!(
        "bash --rcfile {}",
        expand(&connect.rcfile, &ctx.paths, None)
    ));
    cmd
}

/// Pane title of a session, e.g. `s/core1`
pub fn session_title(connection_type: ConnectionType, host: &str) -> String {
    format!("{}/{}", connection_type.tag(), host)
}

/// Open a session pane, record it and start its log; returns the log file
#[instrument(skip(ctx, mux), fields(component = "noc_core", operation = "connect"))]
pub fn connect(
    ctx: &NocContext,
    mux: &dyn Multiplexer,
    connection_type: ConnectionType,
    host: &str,
    dir: SplitDirection,
) -> Result<PathBuf> {
    let host = validate_host(host)?;

    mux.open_pane(dir, Some(&pane_command(ctx, connection_type, host)))?;
    mux.set_pane_title(&session_title(connection_type, host))?;
    rename_window(mux)?;

    let now = Local::now();
    let index = record_session(
        &ctx.session_store(),
        &ctx.paths.history_file,
        connection_type,
        host,
        &now,
    )?;
    let log_file = start_pane_log(
        ctx,
        mux,
        LogSource::Session {
            index,
            connection_type,
        },
        host,
        &now,
    )?;

    info!(index, %connection_type, host, "Session opened");
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingMux};

    #[test]
    fn hosts_with_spaces_are_accepted() {
        assert_eq!(validate_host(" 10.0.0.1 2323 ").unwrap(), "10.0.0.1 2323");
        assert_eq!(validate_host("admin@core1").unwrap(), "admin@core1");
    }

    #[test]
    fn shell_metacharacters_are_rejected() {
        for host in ["", "   ", "a;reboot", "x\"y", "$(id)", "a|b", "h\nh", "`x`", "a'b"] {
            assert!(
                matches!(validate_host(host), Err(Error::InvalidHost { .. })),
                "{host:?} should be rejected"
            );
        }
    }

    #[test]
    fn tmux_formats_and_path_separators_are_rejected() {
        for host in ["#(id)", "#{pane_id}", "a/b", "core1#", "x(y)"] {
            assert!(
                matches!(
                    validate_host(host),
                    Err(Error::InvalidHost {
                        reason: "contains tmux format or path characters",
                        ..
                    })
                ),
                "{host:?} should be rejected"
            );
        }
    }

    #[test]
    fn format_host_opens_no_pane_and_creates_no_log() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NocContext::for_tests(dir.path());
        let mux = RecordingMux::new();

        let err = connect(&ctx, &mux, ConnectionType::Ssh, "#(touch /tmp/x)", SplitDirection::New)
            .unwrap_err();

        assert!(err.to_string().starts_with("Invalid host '#(touch /tmp/x)'"));
        assert!(mux.calls().is_empty());
        assert!(!ctx.paths.log_dir.exists());
    }

    #[test]
    fn telnet_command_sets_term_and_rcfile() {
        let ctx = NocContext::for_tests(std::path::Path::new("/n"));
        assert_eq!(
            pane_command(&ctx, ConnectionType::Telnet, "10.0.0.1"),
            "PROMPT_COMMAND=\"/n/scripts/kbdfix.sh telnet 10.0.0.1\" TERM=vt100-w bash --rcfile /n/misc/tmux_noc_bashrc"
        );
    }

    #[test]
    fn ssh_command_keeps_pane_term() {
        let ctx = NocContext::for_tests(std::path::Path::new("/n"));
        assert_eq!(
            pane_command(&ctx, ConnectionType::Ssh, "core1"),
            "PROMPT_COMMAND=\"ssh core1\" bash --rcfile /n/misc/tmux_noc_bashrc"
        );
    }

    #[test]
    fn empty_telnet_term_is_omitted() {
        let mut ctx = NocContext::for_tests(std::path::Path::new("/n"));
        ctx.config.connect.telnet_term.clear();
        assert!(!pane_command(&ctx, ConnectionType::Telnet, "h").contains("TERM="));
    }

    #[test]
    fn connect_opens_titles_records_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NocContext::for_tests(dir.path());
        let mux = RecordingMux::new().with_pane_titles(&["s/core1"]);

        let log_file = connect(&ctx, &mux, ConnectionType::Ssh, "core1", SplitDirection::Vertical)
            .unwrap();

        let calls = mux.calls();
        assert_eq!(
            calls[0],
            Call::OpenPane(
                SplitDirection::Vertical,
                Some(pane_command(&ctx, ConnectionType::Ssh, "core1"))
            )
        );
        assert_eq!(calls[1], Call::SetPaneTitle("s/core1".into()));
        assert!(calls.contains(&Call::RenameWindow("s/core1".into())));
        assert!(matches!(calls.last(), Some(Call::PipePane(_))));

        let meta = ctx.session_store().load().unwrap();
        assert_eq!(meta.last_session_index, Some(1));
        assert_eq!(meta.last_host(ConnectionType::Ssh), Some("core1"));
        assert!(log_file
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("---!1_s_core1.log"));
        assert!(std::fs::read_to_string(&ctx.paths.history_file)
            .unwrap()
            .contains(" ssh core1\n"));
    }

    #[test]
    fn invalid_host_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = NocContext::for_tests(dir.path());
        let mux = RecordingMux::new();

        assert!(connect(&ctx, &mux, ConnectionType::Telnet, "a;b", SplitDirection::New).is_err());
        assert!(mux.calls().is_empty());
        assert!(!ctx.paths.sessions_file.exists());
    }
}
