// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration: `<root>/config.toml` overlaid with `NOC_*` environment variables
//!
//! Nested keys use a double underscore, e.g. `NOC_LOGIN__TIMEOUT_SECS=5`.
//! String values may reference `{root}`; client commands also take `{host}`.

use crate::error::Result;
use crate::paths::NocPaths;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "NOC";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NocConfig {
    /// Command menus use to re-invoke tmux-noc; defaults to the running executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<String>,
    pub connect: ConnectConfig,
    pub clipboard: ClipboardConfig,
    pub capture: CaptureConfig,
    pub login: LoginConfig,
    pub send: SendConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// rc file of the wrapper shell; it runs `$PROMPT_COMMAND` once
    pub rcfile: String,
    pub telnet_command: String,
    /// TERM exported for telnet sessions; empty keeps the pane's TERM
    pub telnet_term: String,
    pub ssh_command: String,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            rcfile: "{root}/misc/tmux_noc_bashrc".into(),
            telnet_command: "{root}/scripts/kbdfix.sh telnet {host}".into(),
            telnet_term: "vt100-w".into(),
            ssh_command: "ssh {host}".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardConfig {
    /// Shell command printing the clipboard to stdout
    pub paste_command: String,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            paste_command: "{root}/scripts/paste.sh".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Scrollback lines included in each pane log snapshot
    pub history_lines: usize,
    /// Minimum time between two snapshots of the same pane
    pub interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            history_lines: 20000,
            interval_ms: 1000,
        }
    }
}

impl CaptureConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Text that marks a password prompt on screen
    pub prompt: String,
    pub timeout_secs: u64,
    pub poll_ms: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            prompt: "assword".into(),
            timeout_secs: 3,
            poll_ms: 100,
        }
    }
}

impl LoginConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SendConfig {
    pub line_delay_ms: u64,
    pub char_delay_ms: u64,
}

impl Default for SendConfig {
    fn default() -> Self {
        Self {
            line_delay_ms: 500,
            char_delay_ms: 0,
        }
    }
}

impl NocConfig {
    /// Load the config file (optional) and apply the environment overlay
    pub fn load(config_file: &Path) -> Result<Self> {
        let built = config::Config::builder()
            .add_source(
                config::File::from(config_file)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(built.try_deserialize()?)
    }

    /// Render the resolved configuration as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Substitute `{root}` and `{host}` in a configured template
pub fn expand(template: &str, paths: &NocPaths, host: Option<&str>) -> String {
    let mut out = template.replace("{root}", &paths.root.to_string_lossy());
    if let Some(host) = host {
        out = out.replace("{host}", host);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = NocConfig::load(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, NocConfig::default());
        assert_eq!(config.capture.history_lines, 20000);
        assert_eq!(config.login.prompt, "assword");
    }

    #[test]
    #[serial]
    fn file_values_override_defaults_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "binary = \"/opt/noc/tmux-noc\"\n[send]\nline_delay_ms = 250\n",
        )
        .unwrap();

        let config = NocConfig::load(&path).unwrap();
        assert_eq!(config.binary.as_deref(), Some("/opt/noc/tmux-noc"));
        assert_eq!(config.send.line_delay_ms, 250);
        assert_eq!(config.send.char_delay_ms, 0);
        assert_eq!(config.connect, ConnectConfig::default());
    }

    #[test]
    #[serial]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[login]\ntimeout_secs = 10\n").unwrap();

        std::env::set_var("NOC_LOGIN__TIMEOUT_SECS", "5");
        let config = NocConfig::load(&path);
        std::env::remove_var("NOC_LOGIN__TIMEOUT_SECS");

        assert_eq!(config.unwrap().login.timeout_secs, 5);
    }

    #[test]
    fn expand_substitutes_root_and_host() {
        let paths = NocPaths::under("/srv/noc");
        assert_eq!(
            expand("{root}/scripts/kbdfix.sh telnet {host}", &paths, Some("10.1.1.1")),
            "/srv/noc/scripts/kbdfix.sh telnet 10.1.1.1"
        );
        assert_eq!(expand("ssh {host}", &paths, None), "ssh {host}");
    }

    #[test]
    fn config_renders_as_toml() {
        let rendered = NocConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[capture]"));
        assert!(rendered.contains("history_lines = 20000"));
    }
}
