// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Login/password injection from the `.logins` file
//!
//! The file holds `LOGIN<n>=...` and `PASS<n>=...` lines. `tmux-noc login
//! --login-number n` types the login into the active pane, waits for a
//! password prompt and types the password.

use crate::config::LoginConfig;
use crate::error::{Error, Result};
use noc_logging::redact;
use noc_mux_core::{CaptureOptions, Multiplexer, CURRENT_PANE};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use zeroize::Zeroizing;

pub const PROMPT_NOT_FOUND: &str = "Password prompt not found.";

/// One login/password pair; the password is wiped from memory on drop
pub struct LoginPair {
    pub login: String,
    password: Zeroizing<String>,
}

impl LoginPair {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: Zeroizing::new(password.into()),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginPair")
            .field("login", &self.login)
            .field("password", &redact(self.password.as_str()))
            .finish()
    }
}

/// Parsed `.logins` file
#[derive(Default)]
pub struct Credentials {
    values: HashMap<String, Zeroizing<String>>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Credentials").field("keys", &keys).finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self> {
        let content = Zeroizing::new(fs::read_to_string(path)?);
        Ok(Self::parse(&content))
    }

    /// Parse `KEY=VALUE` lines; blank lines and `#` comments are skipped
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                values.insert(key.trim().to_string(), Zeroizing::new(value.to_string()));
            }
        }
        Self { values }
    }

    /// The pair numbered `number`; both halves must be present
    pub fn get(&self, number: &str) -> Result<LoginPair> {
        let login = self.values.get(&format!("LOGIN{}", number));
        let password = self.values.get(&format!("PASS{}", number));
        match (login, password) {
            (Some(login), Some(password)) => Ok(LoginPair::new(login.as_str(), password.as_str())),
            _ => Err(Error::CredentialNotFound(number.to_string())),
        }
    }
}

/// Whether one of the last two non-empty screen lines contains `needle`
pub fn prompt_visible(screen: &str, needle: &str) -> bool {
    let lines: Vec<&str> = screen.lines().filter(|l| !l.is_empty()).collect();
    let tail = &lines[lines.len().saturating_sub(2)..];
    tail.iter().any(|l| l.contains(needle))
}

/// Poll the active pane until `needle` shows up near the bottom or `timeout` passes
pub async fn wait_for_prompt(
    mux: &dyn Multiplexer,
    needle: &str,
    timeout: Duration,
    poll: Duration,
) -> Result<bool> {
    let deadline = Instant::now() + timeout;
    let opts = CaptureOptions {
        target: None,
        join_wrapped: true,
        history_lines: None,
    };

    loop {
        let screen = mux.capture_pane(&opts)?;
        if prompt_visible(&screen, needle) {
            return Ok(true);
        }
        if Instant::now() + poll > deadline {
            return Ok(false);
        }
        tokio::time::sleep(poll).await;
    }
}

/// Type credential pair `number` into the active pane
#[instrument(skip(mux, creds, settings), fields(component = "noc_core", operation = "send_login"))]
pub async fn send_login(
    mux: &dyn Multiplexer,
    creds: &Credentials,
    number: &str,
    settings: &LoginConfig,
) -> Result<bool> {
    let pair = creds.get(number)?;
    debug!(login = %pair.login, password = redact(pair.password()), "Sending login");

    mux.send_text(CURRENT_PANE, &pair.login)?;
    mux.send_enter(CURRENT_PANE)?;

    if wait_for_prompt(mux, &settings.prompt, settings.timeout(), settings.poll()).await? {
        mux.send_text(CURRENT_PANE, pair.password())?;
        mux.send_enter(CURRENT_PANE)?;
        info!("Credentials sent");
        Ok(true)
    } else {
        warn!("Password prompt did not appear");
        mux.display_message(PROMPT_NOT_FOUND)?;
        Ok(false)
    }
}
