// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for tmux-noc operations

use noc_mux_core::MuxError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tmux-noc operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error("Invalid host '{host}': {reason}")]
    InvalidHost { host: String, reason: &'static str },

    #[error("No LOGIN{0}/PASS{0} pair in credentials file")]
    CredentialNotFound(String),

    #[error("Log file with index {0} not found")]
    LogNotFound(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Home directory could not be determined")]
    NoHomeDir,
}
