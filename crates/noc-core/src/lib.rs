// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! tmux-noc domain logic
//!
//! Everything here talks to the terminal multiplexer through
//! [`noc_mux_core::Multiplexer`], so it can run against tmux or against the
//! recording fake in [`testing`].

pub mod clipboard;
pub mod config;
pub mod connect;
pub mod credentials;
pub mod error;
pub mod log_browser;
pub mod menus;
pub mod pane_log;
pub mod paths;
pub mod send_delay;
pub mod sessions;
pub mod ssh_config;
pub mod window;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use crate::config::NocConfig;
pub use error::{Error, Result};
pub use paths::NocPaths;
pub use sessions::{ConnectionType, SessionMetadata, SessionStore};

/// Fallback when the running executable cannot be located
pub const DEFAULT_BINARY: &str = "tmux-noc";

/// Resolved paths and configuration shared by every operation
#[derive(Debug, Clone)]
pub struct NocContext {
    pub paths: NocPaths,
    pub config: NocConfig,
}

impl NocContext {
    pub fn new(paths: NocPaths, config: NocConfig) -> Self {
        Self { paths, config }
    }

    /// Discover the root directory and load its configuration
    pub fn load() -> Result<Self> {
        let paths = NocPaths::discover()?;
        let config = NocConfig::load(&paths.config_file)?;
        Ok(Self { paths, config })
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(&self.paths.sessions_file)
    }

    /// Command that tmux runs to call back into tmux-noc
    pub fn binary(&self) -> String {
        if let Some(binary) = self.config.binary.as_deref().filter(|b| !b.is_empty()) {
            return crate::config::expand(binary, &self.paths, None);
        }
        std::env::current_exe()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|_| DEFAULT_BINARY.to_string())
    }

    /// [`Self::binary`] as a single shell word
    pub fn binary_word(&self) -> String {
        shell_word(&self.binary())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(root: &std::path::Path) -> Self {
        let config = NocConfig {
            binary: Some(DEFAULT_BINARY.to_string()),
            ..NocConfig::default()
        };
        Self::new(NocPaths::under(root), config)
    }
}

/// Quote `s` for `sh` unless it is made only of safe characters
pub fn shell_word(s: &str) -> String {
    let safe = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+=:,@".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}
