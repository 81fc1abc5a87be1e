//! Profile directory resolution
//!
//! A profile is a named directory under the OS-specific config root holding
//! one user's settings, history, cache and storage. Directory creation
//! failure is fatal: the browser cannot run without a writable profile.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::ConfigFile;
use crate::Result;

/// Prefix for generated profile names.
pub const PROFILE_NAME_PREFIX: &str = "kbprofile";

/// Characters that are unsafe in a directory name on at least one
/// supported platform. A stored profile name containing any of these is
/// discarded and regenerated.
const UNSAFE_CHARS: [char; 10] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|', ' '];

const PROFILE_KEY: &str = "Profile";

pub struct ProfileDirs {
    root: PathBuf,
    config: ConfigFile,
}

impl ProfileDirs {
    /// Resolve the OS-specific profile root, creating it if missing.
    pub fn resolve() -> Result<Self> {
        let root = dirs::config_root().unwrap_or_else(|| PathBuf::from(".kestrel"));
        Self::with_root(root)
    }

    /// Use an explicit root instead of the OS default.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let config = ConfigFile::open(&root)?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Read the profile name from the config file, generating and
    /// persisting a fresh one when it is absent or filesystem-unsafe.
    pub fn profile_name(&self) -> Result<String> {
        let mut name = self.config.get(PROFILE_KEY)?;
        if name.is_empty() || name.contains(UNSAFE_CHARS) {
            name = generate_profile_name();
            self.config.set(PROFILE_KEY, &name)?;
            tracing::info!(profile = %name, "generated new profile name");
        }
        Ok(name)
    }

    /// Directory for the active profile, created on first access.
    pub fn profile_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join(self.profile_name()?);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Engine cache directory inside the profile, created on first access.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let dir = self.profile_dir()?.join("cache");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Engine persistent-storage directory inside the profile, created on
    /// first access.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let dir = self.profile_dir()?.join("storage");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// OS downloads folder, used as the initial `download_folder` setting.
    pub fn default_downloads_dir() -> PathBuf {
        dirs::download_dir().unwrap_or_else(|| PathBuf::from("Downloads"))
    }
}

fn generate_profile_name() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{PROFILE_NAME_PREFIX}{}", &suffix[..6])
}

// Simple dirs implementation for common directories
mod dirs {
    use std::path::PathBuf;

    pub fn config_root() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA")
                .ok()
                .map(|d| PathBuf::from(d).join("kestrel"))
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support/kestrel"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_CONFIG_HOME")
                .ok()
                .map(|d| PathBuf::from(d).join("kestrel"))
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".config/kestrel"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }

    pub fn download_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|h| PathBuf::from(h).join("Downloads"))
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Downloads"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DOWNLOAD_DIR")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join("Downloads"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
