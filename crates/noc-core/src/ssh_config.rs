// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Host aliases from the user's OpenSSH client config

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Concrete host names declared by `Host` lines, or `None` when there is no config file
pub fn ssh_config_hosts(path: &Path) -> Result<Option<Vec<String>>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(parse_hosts(&content)))
}

/// Parse `Host` declarations; wildcard and negated patterns are not hosts
pub fn parse_hosts(content: &str) -> Vec<String> {
    let mut hosts: Vec<String> = Vec::new();
    for line in content.lines() {
        let Some(names) = host_line_names(line.trim()) else {
            continue;
        };
        for name in names.split_whitespace() {
            let name = name.trim_matches('"');
            if name.is_empty() || name.contains(['*', '?', '!']) {
                continue;
            }
            if !hosts.iter().any(|h| h == name) {
                hosts.push(name.to_string());
            }
        }
    }
    hosts
}

/// Names part of a `Host a b` or `Host=a` line
fn host_line_names(line: &str) -> Option<&str> {
    let keyword = line.get(..4)?;
    if !keyword.eq_ignore_ascii_case("host") {
        return None;
    }
    let rest = &line[4..];
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix('=') {
        Some(after) => after,
        // `HostName`, `HostKeyAlias` and friends
        None if !line[4..].starts_with(char::is_whitespace) => return None,
        None => rest,
    };
    Some(rest.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ssh_config_hosts(&dir.path().join("config")).unwrap(), None);
    }

    #[test]
    fn host_lines_yield_names_in_order() {
        let config = "\
# lab gear
Host core1 core2
    HostName 10.0.0.1
    User netops

host edge-*
Host=oob1
  Host core1
HostKeyAlias skipme
Host !bastion jump?
";
        assert_eq!(parse_hosts(config), vec!["core1", "core2", "oob1"]);
    }

    #[test]
    fn reads_hosts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, "Host spine1\n  User admin\nHost leaf1\n").unwrap();
        assert_eq!(
            ssh_config_hosts(&path).unwrap(),
            Some(vec!["spine1".to_string(), "leaf1".to_string()])
        );
    }

    #[test]
    fn config_without_hosts_is_empty_list() {
        assert!(parse_hosts("User me\nHostName x\n").is_empty());
    }
}
