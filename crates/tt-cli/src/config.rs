//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tt_toggl::DEFAULT_BASE_URL;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Toggl API token, from the profile page.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Base URL of the v8 API.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TT_*)
        figment = figment.merge(Env::prefixed("TT_"));

        figment.extract()
    }

    /// The configured API token, if it is non-blank.
    pub fn api_token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Returns the platform-specific config directory for tt.
///
/// On Linux: `~/.config/tt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn test_dirs_config_path_ends_with_tt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tt");
    }

    #[test]
    fn test_default_config_targets_public_api() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://www.toggl.com/api/v8");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"api_token = "abc123""#).unwrap();
        writeln!(file, r#"base_url = "http://localhost:8080/api/v8""#).unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();

        assert_eq!(config.api_token(), Some("abc123"));
        assert_eq!(config.base_url, "http://localhost:8080/api/v8");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_blank_token_is_treated_as_missing() {
        let config = Config {
            api_token: Some("   ".to_string()),
            ..Config::default()
        };
        assert!(config.api_token().is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            api_token: Some("secret-token".to_string()),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
