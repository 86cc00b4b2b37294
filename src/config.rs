//! Configuration file parser for `newsreel.toml`.
//!
//! The config file is optional, and a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::feed::FetchLimits;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the entry table.
    pub database_path: String,

    /// Feed source URLs polled every cycle, in order.
    pub feeds: Vec<String>,

    /// Idle time between the end of one cycle and the start of the next.
    pub poll_interval_secs: u64,

    /// Upper bound on a single feed fetch, request and body together.
    pub fetch_timeout_secs: u64,

    /// Largest feed body accepted, in bytes.
    pub max_feed_bytes: usize,

    /// User-Agent header sent with feed requests.
    pub user_agent: String,
}

const DEFAULT_FEEDS: &[&str] = &[
    "http://rss.cnn.com/rss/edition.rss",
    "http://feeds.bbci.co.uk/news/rss.xml",
    "https://www.onmanorama.com/news/india.feeds.onmrss.xml",
    "https://www.cbsnews.com/latest/rss/us",
    "https://rss.nytimes.com/services/xml/rss/nyt/us.xml",
    "https://rss.nytimes.com/services/xml/rss/nyt/Business.xml",
    "http://rss.cnn.com/rss/cnn_latest.rss/",
];

impl Default for Config {
    fn default() -> Self {
        let limits = FetchLimits::default();
        Self {
            database_path: "feed_entries.db".to_string(),
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            poll_interval_secs: 10,
            fetch_timeout_secs: limits.timeout.as_secs(),
            max_feed_bytes: limits.max_bytes,
            user_agent: concat!("newsreel/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Zero interval or timeout → `Err(ConfigError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "database_path",
                "feeds",
                "poll_interval_secs",
                "fetch_timeout_secs",
                "max_feed_bytes",
                "user_agent",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            poll_interval_secs = config.poll_interval_secs,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Feed URLs that parse as http(s). Anything else is logged and skipped.
    pub fn feed_urls(&self) -> Vec<String> {
        self.feeds
            .iter()
            .filter(|raw| match Url::parse(raw) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => true,
                Ok(url) => {
                    tracing::warn!(feed = %raw, scheme = %url.scheme(), "Unsupported feed URL scheme, skipping");
                    false
                }
                Err(e) => {
                    tracing::warn!(feed = %raw, error = %e, "Invalid feed URL, skipping");
                    false
                }
            })
            .cloned()
            .collect()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            max_bytes: self.max_feed_bytes,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsreel.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database_path, "feed_entries.db");
        assert_eq!(config.feeds.len(), 7);
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.max_feed_bytes, 10 * 1024 * 1024);
        assert!(config.user_agent.starts_with("newsreel/"));
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsreel_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.poll_interval_secs, 10);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let path = write_config("newsreel_config_test_empty", "");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds.len(), 7);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let path = write_config(
            "newsreel_config_test_partial",
            "feeds = [\"https://example.com/rss\"]\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.feeds, vec!["https://example.com/rss".to_string()]);
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.database_path, "feed_entries.db");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
database_path = "/var/lib/newsreel/entries.db"
feeds = ["https://a.example.com/rss", "https://b.example.com/atom"]
poll_interval_secs = 300
fetch_timeout_secs = 15
max_feed_bytes = 2048
user_agent = "test-agent"
"#;
        let path = write_config("newsreel_config_test_full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.database_path, "/var/lib/newsreel/entries.db");
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.poll_interval(), Duration::from_secs(300));
        let limits = config.fetch_limits();
        assert_eq!(limits.timeout, Duration::from_secs(15));
        assert_eq!(limits.max_bytes, 2048);
        assert_eq!(config.user_agent, "test-agent");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("newsreel_config_test_invalid", "feeds = [unterminated");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_zero_interval_rejected() {
        let path = write_config("newsreel_config_test_zero", "poll_interval_secs = 0\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let path = write_config("newsreel_config_test_unknown", "theme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.poll_interval_secs, 10);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_feed_urls_drops_invalid() {
        let config = Config {
            feeds: vec![
                "https://example.com/rss".to_string(),
                "not a url".to_string(),
                "file:///etc/passwd".to_string(),
                "http://example.org/feed".to_string(),
            ],
            ..Config::default()
        };
        assert_eq!(
            config.feed_urls(),
            vec![
                "https://example.com/rss".to_string(),
                "http://example.org/feed".to_string()
            ]
        );
    }
}
