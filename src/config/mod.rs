//! Configuration for Freshet.
//!
//! Read from `~/.config/freshet/config.toml` at startup. If the file
//! doesn't exist, a default configuration with comments is created.
//! Missing fields in an existing file fall back to defaults.

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Endpoint and fetch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relay proxies tried front-to-back for feed and page fetches.
    /// The target URL is appended percent-encoded.
    pub proxies: Vec<String>,
    /// Interchangeable lookup-API mirrors for channel resolution.
    pub mirrors: Vec<String>,
    /// Upload feed base URL; the channel id is appended.
    pub feed_url: String,
    /// Channel page base URL; the handle is appended. Used by the
    /// scrape fallback.
    pub channel_page_url: String,
    /// Per-attempt HTTP timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Concurrent channel fetches during a refresh.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxies: vec![
                "https://api.allorigins.win/raw?url=".into(),
                "https://corsproxy.io/?".into(),
                "https://api.codetabs.com/v1/proxy?quest=".into(),
            ],
            mirrors: vec![
                "https://api.piped.private.coffee".into(),
                "https://pipedapi.darkness.services".into(),
                "https://pipedapi.ducks.party".into(),
                "https://piped-api.privacy.com.de".into(),
                "https://pipedapi.reallyaweso.me".into(),
            ],
            feed_url: "https://www.youtube.com/feeds/videos.xml?channel_id=".into(),
            channel_page_url: "https://www.youtube.com/@".into(),
            fetch_timeout_secs: 10,
            workers: 4,
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with
    /// comments and returns the defaults. An invalid file is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/freshet/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("freshet").join("config.toml"))
    }

    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Freshet Configuration
#
# All endpoints are best-effort community services. Proxies are tried
# front-to-back on every fetch; mirrors are tried starting from the one
# that last answered successfully.

# Relay proxies for feed and channel-page fetches. The target URL is
# appended percent-encoded.
proxies = [
    "https://api.allorigins.win/raw?url=",
    "https://corsproxy.io/?",
    "https://api.codetabs.com/v1/proxy?quest=",
]

# Piped API mirrors used for channel lookup and avatars.
mirrors = [
    "https://api.piped.private.coffee",
    "https://pipedapi.darkness.services",
    "https://pipedapi.ducks.party",
    "https://piped-api.privacy.com.de",
    "https://pipedapi.reallyaweso.me",
]

# Upload feed base URL; the channel id is appended.
feed_url = "https://www.youtube.com/feeds/videos.xml?channel_id="

# Channel page base URL; the handle is appended.
channel_page_url = "https://www.youtube.com/@"

# Per-attempt HTTP timeout in seconds.
fetch_timeout_secs = 10

# Concurrent channel fetches during a refresh.
workers = 4
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
