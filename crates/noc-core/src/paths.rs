// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! On-disk layout under the tmux-noc root directory

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding the root directory
pub const HOME_ENV: &str = "NOC_HOME";

/// Root directory name under `$HOME`
pub const DEFAULT_ROOT_DIR: &str = "tmuxNOC";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NocPaths {
    pub root: PathBuf,
    pub config_file: PathBuf,
    pub sessions_file: PathBuf,
    pub history_file: PathBuf,
    pub log_dir: PathBuf,
    pub logins_file: PathBuf,
    pub ssh_config: PathBuf,
}

impl NocPaths {
    /// Resolve paths from `NOC_HOME` or `~/tmuxNOC`
    pub fn discover() -> Result<Self> {
        let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
        let root = std::env::var_os(HOME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(DEFAULT_ROOT_DIR));
        Ok(Self::with_home(root, &home))
    }

    /// Layout under an explicit root; `home` locates `~/.ssh/config`
    pub fn with_home(root: impl Into<PathBuf>, home: &Path) -> Self {
        let root = root.into();
        let local = root.join("local");
        Self {
            config_file: root.join("config.toml"),
            sessions_file: root.join("sessions.json"),
            history_file: local.join("sessions_history.log"),
            log_dir: local.join("log"),
            logins_file: root.join(".logins"),
            ssh_config: home.join(".ssh").join("config"),
            root,
        }
    }

    /// Everything lives under `root`, including the ssh config (for tests)
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let home = root.clone();
        Self::with_home(root, &home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn layout_matches_historic_tree() {
        let paths = NocPaths::with_home("/home/op/tmuxNOC", Path::new("/home/op"));
        assert_eq!(paths.sessions_file, PathBuf::from("/home/op/tmuxNOC/sessions.json"));
        assert_eq!(
            paths.history_file,
            PathBuf::from("/home/op/tmuxNOC/local/sessions_history.log")
        );
        assert_eq!(paths.log_dir, PathBuf::from("/home/op/tmuxNOC/local/log"));
        assert_eq!(paths.logins_file, PathBuf::from("/home/op/tmuxNOC/.logins"));
        assert_eq!(paths.ssh_config, PathBuf::from("/home/op/.ssh/config"));
    }

    #[test]
    #[serial]
    fn noc_home_overrides_root() {
        let saved = std::env::var_os(HOME_ENV);
        std::env::set_var(HOME_ENV, "/srv/noc");

        let paths = NocPaths::discover().unwrap();
        assert_eq!(paths.root, PathBuf::from("/srv/noc"));
        assert_eq!(paths.config_file, PathBuf::from("/srv/noc/config.toml"));

        match saved {
            Some(v) => std::env::set_var(HOME_ENV, v),
            None => std::env::remove_var(HOME_ENV),
        }
    }
}
