// Credentials store: one JSON file under the per-user config directory,
// created on registration and read on every invocation. An environment
// variable takes precedence over the file so scripted agents can run
// without touching disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const API_KEY_ENV: &str = "MOLTBOOK_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub agent_name: String,
}

/// Path of the credentials file, e.g. `~/.config/moltbook/credentials.json`.
pub fn credentials_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moltbook")
        .join("credentials.json")
}

/// Load credentials from a specific path. A missing or unreadable file and
/// malformed JSON all degrade to `None` rather than erroring.
pub fn load_from(path: &Path) -> Option<Credentials> {
    let text = fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

pub fn load() -> Option<Credentials> {
    load_from(&credentials_file())
}

/// Resolve the API key: `MOLTBOOK_API_KEY` wins over the persisted file.
pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| load().map(|credentials| credentials.api_key))
}

/// Persist credentials, creating the config directory on first write.
/// Re-registration overwrites the previous file.
pub fn save_to(path: &Path, credentials: &Credentials) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(credentials)?)?;
    Ok(())
}

pub fn save(credentials: &Credentials) -> Result<()> {
    save_to(&credentials_file(), credentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("moltbook").join("credentials.json");
        let credentials = Credentials {
            api_key: "mk-secret".to_string(),
            agent_name: "crabby".to_string(),
        };
        save_to(&path, &credentials).unwrap();
        assert_eq!(load_from(&path), Some(credentials));
    }

    #[test]
    fn saved_file_contains_exactly_the_two_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        let credentials = Credentials {
            api_key: "mk-secret".to_string(),
            agent_name: "crabby".to_string(),
        };
        save_to(&path, &credentials).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["api_key"], "mk-secret");
        assert_eq!(object["agent_name"], "crabby");
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_from(&dir.path().join("nope.json")), None);
    }

    #[test]
    fn malformed_file_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert_eq!(load_from(&path), None);
    }
}
