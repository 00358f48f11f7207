use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::{
    address::Address,
    error::{Error, Result},
};

/// Session configuration.
///
/// Every field has a default, so a configuration file only needs to name
/// what it changes:
///
/// ```toml
/// address = "unix:/run/pulse/native"
/// subscribe = false
///
/// [retry]
/// delay = 500
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sound server to connect to.
    pub address: Address,

    /// Whether to subscribe to sink changes and emit playback events.
    pub subscribe: bool,

    /// Client name as shown by the sound server.
    pub client_name: String,

    pub retry: RetryPolicy,
}

/// How hard to try reaching the sound server.
///
/// Attempts are unbounded in number and spaced by a fixed `delay`. The
/// whole sequence gives up after `timeout`.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pause between the end of a failed attempt and the next one.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub delay: Duration,

    /// Wall-clock budget for all attempts together.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Self::DEFAULT_DELAY,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: Address::default(),
            subscribe: true,
            client_name: env!("CARGO_PKG_NAME").to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Configuration files are small; refuse anything larger than this.
    const MAX_FILE_SIZE: u64 = 64 * 1024;

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, or does
    /// not parse.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: config file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::out_of_range(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        debug!("loaded configuration from {}", path.display());

        if config.client_name.is_empty() {
            return Err(Error::invalid_argument("client name is empty"));
        }

        Ok(config)
    }
}
