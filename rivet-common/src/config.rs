// rivet-common/src/config.rs
use std::env;
use std::path::{Path, PathBuf};

use directories::UserDirs;
use tracing::debug;

use super::error::{Result, RivetError};

// Fallback when RIVET_HOME is not set: <home>/.rivet
const RIVET_HOME_DIR_NAME: &str = ".rivet";

#[derive(Debug, Clone)]
pub struct Config {
    pub rivet_root: PathBuf,
    pub remote_repositories: Vec<String>,
    pub offline: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading rivet configuration");

        let rivet_root = match env::var("RIVET_HOME").ok().filter(|s| !s.is_empty()) {
            Some(root) => PathBuf::from(root),
            None => {
                let home = UserDirs::new()
                    .map(|ud| ud.home_dir().to_path_buf())
                    .ok_or_else(|| {
                        RivetError::Config(
                            "RIVET_HOME not set and no home directory found".to_string(),
                        )
                    })?;
                home.join(RIVET_HOME_DIR_NAME)
            }
        };
        debug!("Effective RIVET_HOME set to: {}", rivet_root.display());

        let remote_repositories = env::var("RIVET_REPOSITORIES")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let offline = env::var("RIVET_OFFLINE").is_ok_and(|v| v == "1");
        if offline {
            debug!("Offline mode enabled via RIVET_OFFLINE=1");
        }

        debug!("Configuration loaded successfully.");
        Ok(Self {
            rivet_root,
            remote_repositories,
            offline,
        })
    }

    pub fn rivet_root(&self) -> &Path {
        &self.rivet_root
    }

    /// Local artifact repository (the on-disk cache all resolution goes through).
    pub fn repository_dir(&self) -> PathBuf {
        self.rivet_root.join("repository")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.rivet_root.join("cache")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.rivet_root.join("logs")
    }
}

pub fn load_config() -> Result<Config> {
    Config::load()
}
