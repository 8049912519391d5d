// Optional settings file. Command line flags override whatever it sets;
// a missing default file is not an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings read from `config.toml`. Every field is optional in the file;
/// command line flags override what is loaded here.
///
/// ```toml
/// hostname     = "cluster.example.com"
/// port         = 8080
/// username     = "admin"
/// insecure     = true   # accept the cluster's self-signed certificate
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hostname: Option<String>,
    pub port: u16,
    /// Pre-filled at the username prompt
    pub username: Option<String>,
    pub insecure: bool,
    /// Per-request timeout for calls to the cluster
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hostname: None,
            port: 8080,
            username: None,
            insecure: false,
            timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("isi-toolbox").join("config.toml"))
    }

    /// Load `explicit` if given (it must exist), else the default location
    /// if there is a file there, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Config::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config =
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
