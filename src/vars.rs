//! Manifest variable substitution
//!
//! Manifest strings may contain `{{home}}` and `{{hostname}}`. Both are
//! resolved once at startup and replaced literally wherever they appear.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Token replaced by the absolute home directory.
pub const HOME_TOKEN: &str = "{{home}}";

/// Token replaced by the local host name.
pub const HOSTNAME_TOKEN: &str = "{{hostname}}";

/// Runtime values for the substitution tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variables {
    home: PathBuf,
    hostname: String,
}

impl Variables {
    /// Build a fixed variable set.
    pub fn new(home: impl Into<PathBuf>, hostname: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            hostname: hostname.into(),
        }
    }

    /// Resolve the home directory and host name of the running process.
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().context("Could not determine the home directory")?;
        let hostname = gethostname::gethostname()
            .into_string()
            .map_err(|raw| anyhow::anyhow!("Host name is not valid UTF-8: {:?}", raw))?;

        tracing::debug!(home = %home.display(), %hostname, "Resolved variables");
        Ok(Self::new(home, hostname))
    }

    pub fn home(&self) -> &PathBuf {
        &self.home
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Replace every known token in `input`.
    pub fn substitute(&self, input: &str) -> String {
        input
            .replace(HOME_TOKEN, &self.home.to_string_lossy())
            .replace(HOSTNAME_TOKEN, &self.hostname)
    }
}
