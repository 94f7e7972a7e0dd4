// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recent-session bookkeeping
//!
//! `sessions.json` keeps a running session counter, the five most recently
//! used `(connection type, host)` pairs and the last host per connection
//! type. Every connection is also appended to a human-readable history log.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of recent sessions offered in the main menu
pub const RECENT_SESSIONS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Telnet,
    Ssh,
}

impl ConnectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionType::Telnet => "telnet",
            ConnectionType::Ssh => "ssh",
        }
    }

    /// One-letter tag used in pane titles and log file names
    pub fn tag(&self) -> char {
        match self {
            ConnectionType::Telnet => 't',
            ConnectionType::Ssh => 's',
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConnectionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telnet" => Ok(ConnectionType::Telnet),
            "ssh" => Ok(ConnectionType::Ssh),
            _ => Err(format!("Invalid connection type: {}. Use 'telnet' or 'ssh'", s)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSession {
    pub connection_type: ConnectionType,
    pub host: String,
}

/// Contents of `sessions.json`; keys written by other tools are kept
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_session_index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_five_sessions: Option<Vec<RecentSession>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_telnet_session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ssh_session: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SessionMetadata {
    pub fn last_host(&self, connection_type: ConnectionType) -> Option<&str> {
        match connection_type {
            ConnectionType::Telnet => self.last_telnet_session.as_deref(),
            ConnectionType::Ssh => self.last_ssh_session.as_deref(),
        }
    }

    pub fn recent(&self) -> &[RecentSession] {
        self.last_five_sessions.as_deref().unwrap_or_default()
    }

    /// Register a new connection and return its session index
    pub fn record(&mut self, connection_type: ConnectionType, host: &str) -> u64 {
        let index = self.last_session_index.map_or(1, |i| i + 1);
        self.last_session_index = Some(index);

        let entry = RecentSession {
            connection_type,
            host: host.to_string(),
        };
        let recent = self.last_five_sessions.get_or_insert_with(Vec::new);
        recent.retain(|s| *s != entry);
        recent.insert(0, entry);
        recent.truncate(RECENT_SESSIONS);

        let last = Some(host.to_string());
        match connection_type {
            ConnectionType::Telnet => self.last_telnet_session = last,
            ConnectionType::Ssh => self.last_ssh_session = last,
        }

        index
    }
}

/// `sessions.json` reader/writer
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load metadata; a missing or empty file is an empty store
    pub fn load(&self) -> Result<SessionMetadata> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No sessions file yet");
                return Ok(SessionMetadata::default());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(SessionMetadata::default());
        }
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the file atomically
    pub fn save(&self, metadata: &SessionMetadata) -> Result<()> {
        let dir = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(dir)?;

        let json = serde_json::to_vec(metadata).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

/// Line appended to the history log for one connection
pub fn history_line(
    index: u64,
    now: &DateTime<Local>,
    connection_type: ConnectionType,
    host: &str,
) -> String {
    format!(
        "    {} {} {} {} {}\n",
        index,
        now.format("%d.%m.%Y"),
        now.format("%H:%M:%S"),
        connection_type,
        host
    )
}

/// Append a connection to the history log, adding the day header once
pub fn append_history(
    path: &Path,
    index: u64,
    now: &DateTime<Local>,
    connection_type: ConnectionType,
    host: &str,
) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let header = format!("# {}", now.format("%d.%m.%Y"));
    let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    if !existing.contains(&header) {
        writeln!(file, "{}", header)?;
    }
    file.write_all(history_line(index, now, connection_type, host).as_bytes())?;
    Ok(())
}

/// Record a connection in `sessions.json` and the history log
pub fn record_session(
    store: &SessionStore,
    history_file: &Path,
    connection_type: ConnectionType,
    host: &str,
    now: &DateTime<Local>,
) -> Result<u64> {
    let mut metadata = store.load()?;
    let index = metadata.record(connection_type, host);
    store.save(&metadata)?;
    append_history(history_file, index, now, connection_type, host)?;

    info!(index, connection_type = %connection_type, host, "Recorded session");
    Ok(index)
}
