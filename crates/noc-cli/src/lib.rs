// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Command-line surface of `tmux-noc`
//!
//! Subcommands are bound to tmux keys or invoked from the menus tmux-noc
//! itself renders, so each one is a short conversation with tmux.

use anyhow::{Context, Result};
use noc_core::credentials::{send_login, Credentials};
use noc_core::pane_log::{save_pane_history, toggle_local_log, write_snapshot};
use noc_core::send_delay::{preview_rows, send_with_delay};
use noc_core::{connect, log_browser, menus, window, ConnectionType, NocContext};
use noc_logging::CliLoggingArgs;
use noc_mux_core::{Multiplexer, SplitDirection};
use std::path::PathBuf;
use tracing::debug;

pub use clap::Parser;

/// Component name used for the log file
pub const COMPONENT: &str = "tmux-noc";

#[derive(Parser, Debug)]
#[command(
    name = "tmux-noc",
    about = "tmux front-end for telnet/SSH sessions, pane logs and keystroke playback",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Where new panes open
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct DirectionArgs {
    #[arg(long, value_enum, default_value_t = SplitDirection::New)]
    pub split_direction: SplitDirection,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Type login and password pair N from the .logins file into the active pane
    Login {
        #[arg(long)]
        login_number: String,
    },
    /// Read a list of lines and type them into another pane with delays
    SendWithDelay {
        #[arg(long)]
        pane_id: String,
    },
    /// Show the main menu
    NocMenu(DirectionArgs),
    /// Show hosts from ~/.ssh/config
    SshMenu(DirectionArgs),
    /// Offer a telnet/SSH connection to the first word of the clipboard
    ClipboardMenu(DirectionArgs),
    /// Prompt for a host, pre-filled with the last one used
    SetupConnection {
        #[arg(long)]
        connection_type: ConnectionType,
        #[command(flatten)]
        direction: DirectionArgs,
    },
    /// Open a telnet session pane
    ConnectTelnet {
        #[arg(long)]
        host: String,
        #[command(flatten)]
        direction: DirectionArgs,
    },
    /// Open an SSH session pane
    ConnectSsh {
        #[arg(long)]
        host: String,
        #[command(flatten)]
        direction: DirectionArgs,
    },
    /// Start logging the active pane
    ToggleLog,
    /// Mirror a pane's scrollback into a file while its output arrives on stdin
    SavePaneHistory {
        #[arg(long)]
        file_name: PathBuf,
        #[arg(long)]
        pane_id: String,
        /// Capture once and exit without reading stdin
        #[arg(long)]
        once: bool,
    },
    /// Interactive grep over all pane logs
    SearchLogs,
    /// Open the log of a session by its index
    OpenLog {
        #[arg(long)]
        history_index: String,
        #[command(flatten)]
        direction: DirectionArgs,
    },
    /// Name the window after its pane titles
    RenameWindow,
    /// Print the resolved configuration
    Config,
}

/// Execute `command` against `mux`
pub async fn run(command: Commands, ctx: &NocContext, mux: &dyn Multiplexer) -> Result<()> {
    debug!(?command, "Dispatching");
    match command {
        Commands::Login { login_number } => {
            let creds = Credentials::load(&ctx.paths.logins_file).with_context(|| {
                format!("reading credentials from {}", ctx.paths.logins_file.display())
            })?;
            send_login(mux, &creds, &login_number, &ctx.config.login).await?;
        }
        Commands::SendWithDelay { pane_id } => {
            let stdin = std::io::stdin().lock();
            let mut stdout = std::io::stdout();
            send_with_delay(ctx, mux, &pane_id, stdin, &mut stdout, preview_rows()).await?;
        }
        Commands::NocMenu(d) => menus::noc_menu(ctx, mux, d.split_direction)?,
        Commands::SshMenu(d) => menus::ssh_menu(ctx, mux, d.split_direction)?,
        Commands::ClipboardMenu(d) => menus::clipboard_menu(ctx, mux, d.split_direction)?,
        Commands::SetupConnection {
            connection_type,
            direction,
        } => menus::setup_connection(ctx, mux, connection_type, direction.split_direction)?,
        Commands::ConnectTelnet { host, direction } => {
            connect::connect(ctx, mux, ConnectionType::Telnet, &host, direction.split_direction)?;
        }
        Commands::ConnectSsh { host, direction } => {
            connect::connect(ctx, mux, ConnectionType::Ssh, &host, direction.split_direction)?;
        }
        Commands::ToggleLog => {
            toggle_local_log(ctx, mux)?;
        }
        Commands::SavePaneHistory {
            file_name,
            pane_id,
            once,
        } => {
            if once {
                write_snapshot(mux, &ctx.config.capture, &file_name, &pane_id)?;
            } else {
                save_pane_history(mux, &ctx.config.capture, &file_name, &pane_id, tokio::io::stdin())
                    .await?;
            }
        }
        Commands::SearchLogs => {
            let stdin = std::io::stdin().lock();
            let mut stdout = std::io::stdout();
            log_browser::search_logs(ctx, mux, stdin, &mut stdout)?;
        }
        Commands::OpenLog {
            history_index,
            direction,
        } => {
            log_browser::open_log(ctx, mux, &history_index, direction.split_direction)?;
        }
        Commands::RenameWindow => window::rename_window(mux)?,
        Commands::Config => print_config(ctx)?,
    }
    Ok(())
}

/// `tmux-noc config`; needs no multiplexer
pub fn print_config(ctx: &NocContext) -> Result<()> {
    print!("{}", ctx.config.to_toml().context("rendering configuration")?);
    Ok(())
}
