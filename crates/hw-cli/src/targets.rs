//! Targets file loading
//!
//! A targets file is TOML with one `[[servers]]` table per host:
//!
//! ```toml
//! [[servers]]
//! host = "10.0.0.5"
//! name = "web-1"
//! user = "ubuntu"
//! key_file = "~/.ssh/id_ed25519"
//! ```
//!
//! `key_file` is read and base64-encoded; `key_base64` may be given
//! instead. Relative key paths resolve against the targets file's directory.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use hw_core::Target;
use hw_ssh::encode_credential;

/// Errors loading a targets file
#[derive(Error, Debug)]
pub enum TargetsError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid targets file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Server {host:?} has both key_file and key_base64")]
    AmbiguousKey { host: String },
}

#[derive(Debug, Deserialize)]
struct TargetsFile {
    #[serde(default)]
    servers: Vec<TargetEntry>,
    #[serde(default)]
    urls: Vec<String>,
    subnet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TargetEntry {
    #[serde(default)]
    host: String,
    name: Option<String>,
    user: Option<String>,
    key_file: Option<PathBuf>,
    key_base64: Option<String>,
}

/// Parsed targets file
#[derive(Debug, Clone, Default)]
pub struct TargetList {
    pub servers: Vec<Target>,
    /// Web endpoints to hand to the URL scanners
    pub urls: Vec<String>,
    pub subnet: Option<String>,
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

fn read(path: &Path) -> Result<Vec<u8>, TargetsError> {
    std::fs::read(path).map_err(|source| TargetsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load targets from `path`
pub fn load_targets(path: &Path) -> Result<TargetList, TargetsError> {
    let content = read(path)?;
    let file: TargetsFile = toml::from_str(&String::from_utf8_lossy(&content))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let mut servers = Vec::with_capacity(file.servers.len());
    for entry in file.servers {
        let credential = match (entry.key_file, entry.key_base64) {
            (Some(_), Some(_)) => return Err(TargetsError::AmbiguousKey { host: entry.host }),
            (Some(key_file), None) => {
                let key_path = expand_home(&key_file);
                let key_path = if key_path.is_relative() {
                    base.join(key_path)
                } else {
                    key_path
                };
                encode_credential(&read(&key_path)?)
            }
            (None, Some(encoded)) => encoded,
            (None, None) => String::new(),
        };

        let mut target = Target::new(entry.host, "ubuntu", credential);
        if let Some(user) = entry.user.filter(|u| !u.trim().is_empty()) {
            target.user = user;
        }
        if let Some(name) = entry.name {
            target = target.with_name(name);
        }
        servers.push(target);
    }

    Ok(TargetList {
        servers,
        urls: file.urls,
        subnet: file.subnet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_key_file_is_encoded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "id_test", "-----BEGIN KEY-----\n");
        let path = write(
            dir.path(),
            "targets.toml",
            r#"
                urls = ["https://portal.example.org"]

                [[servers]]
                host = "10.0.0.5"
                name = "web-1"
                key_file = "id_test"

                [[servers]]
                host = "10.0.0.6"
                user = "admin"
                key_base64 = "a2V5"
            "#,
        );

        let list = load_targets(&path).unwrap();
        assert_eq!(list.servers.len(), 2);
        assert_eq!(list.servers[0].display_name(), "web-1");
        assert_eq!(list.servers[0].user, "ubuntu");
        assert_eq!(list.servers[0].credential, "LS0tLS1CRUdJTiBLRVktLS0tLQo=");
        assert_eq!(list.servers[1].user, "admin");
        assert_eq!(list.servers[1].credential, "a2V5");
        assert_eq!(list.urls, vec!["https://portal.example.org"]);
        assert!(list.subnet.is_none());
    }

    #[test]
    fn test_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "targets.toml",
            "[[servers]]\nhost = \"10.0.0.5\"\nkey_file = \"nope\"\n",
        );
        assert!(matches!(load_targets(&path), Err(TargetsError::Read { .. })));
    }

    #[test]
    fn test_ambiguous_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "targets.toml",
            "[[servers]]\nhost = \"a\"\nkey_file = \"k\"\nkey_base64 = \"a2V5\"\n",
        );
        assert!(matches!(
            load_targets(&path),
            Err(TargetsError::AmbiguousKey { .. })
        ));
    }

    #[test]
    fn test_incomplete_entries_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "targets.toml", "[[servers]]\nhost = \"a\"\n");
        let list = load_targets(&path).unwrap();
        assert!(!list.servers[0].is_complete());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/etc/key")), PathBuf::from("/etc/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/.ssh/id")), home.join(".ssh/id"));
        }
    }
}
