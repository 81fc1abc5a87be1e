//! Line-oriented `key=value` configuration file
//!
//! Holds the handful of values that must be readable before the settings
//! database exists: the profile name and the last window geometry. The file
//! is tiny, so every write rewrites it whole.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// Config file name inside the profile root.
pub const CONFIG_FILE_NAME: &str = "kbconfiguration";

const HEADER: &str = "# Kestrel configuration";

#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// Open the config file in `dir`, creating it with a header comment
    /// when absent.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            fs::write(&path, format!("{HEADER}\n"))?;
            tracing::info!(path = %path.display(), "created configuration file");
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lines(&self) -> Result<Vec<String>> {
        let text = fs::read_to_string(&self.path)?;
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Read the value for `key`. The last matching line wins; an absent key
    /// reads as the empty string.
    pub fn get(&self, key: &str) -> Result<String> {
        let mut value = String::new();
        for line in self.lines()? {
            if line.contains(key) {
                if let Some((_, rest)) = line.split_once('=') {
                    value = rest.to_string();
                }
            }
        }
        Ok(value)
    }

    /// Write `key=value`, replacing the last matching line in place or
    /// appending a new one, then persist the whole file.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut lines = self.lines()?;

        let mut found = None;
        for (n, line) in lines.iter().enumerate() {
            if line.contains(key) {
                found = Some(n);
            }
        }

        let entry = format!("{key}={value}");
        match found {
            Some(n) => lines[n] = entry,
            None => lines.push(entry),
        }

        let mut text = lines.join("\n");
        text.push('\n');
        fs::write(&self.path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> (TempDir, ConfigFile) {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::open(dir.path()).unwrap();
        (dir, config)
    }

    #[test]
    fn test_created_with_header() {
        let (_dir, config) = config();
        let text = std::fs::read_to_string(config.path()).unwrap();
        assert!(text.starts_with("# Kestrel configuration"));
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let (_dir, config) = config();
        assert_eq!(config.get("Width").unwrap(), "");
    }

    #[test]
    fn test_set_get_round_trip() {
        let (_dir, config) = config();
        config.set("Width", "1280").unwrap();
        config.set("Height", "800").unwrap();
        assert_eq!(config.get("Width").unwrap(), "1280");
        assert_eq!(config.get("Height").unwrap(), "800");
    }

    #[test]
    fn test_update_replaces_in_place() {
        let (_dir, config) = config();
        config.set("Profile", "kbprofileabc123").unwrap();
        config.set("Profile", "kbprofiledef456").unwrap();

        assert_eq!(config.get("Profile").unwrap(), "kbprofiledef456");
        let text = std::fs::read_to_string(config.path()).unwrap();
        assert_eq!(text.matches("Profile=").count(), 1);
    }
}
