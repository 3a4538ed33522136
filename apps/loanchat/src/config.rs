//! # Client Configuration
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. TOML file (`--config`, else `<config dir>/loanchat/config.toml` if present)
//! 3. Environment: `LOANCHAT_URL`, `LOANCHAT_API_KEY`
//! 4. Command-line flags
//!
//! ```toml
//! api_url = "http://localhost:8000"
//! api_key = "secret"
//! download_dir = "~/Downloads"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Service URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file '{}': {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Invalid config file '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid API URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),
}

/// On-disk shape of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub download_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text, path)
    }
}

/// Values taken from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            api_url: std::env::var("LOANCHAT_URL").ok().filter(|v| !v.is_empty()),
            api_key: std::env::var("LOANCHAT_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub download_dir: PathBuf,
}

impl Settings {
    /// Merge the layers; `flag_url` is the `--url` command-line value.
    pub fn resolve(
        file: FileConfig,
        env: EnvOverrides,
        flag_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_url = flag_url
            .or(env.api_url)
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(api_url));
        }

        Ok(Self {
            api_url,
            api_key: env.api_key.or(file.api_key),
            download_dir: file
                .download_dir
                .map(|dir| expand_home(&dir))
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    /// Load from the explicit path, or the default location if it exists.
    pub fn load(config_path: Option<&Path>, flag_url: Option<String>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };
        tracing::debug!(api_url = ?file.api_url, "config file loaded");
        Self::resolve(file, EnvOverrides::from_env(), flag_url)
    }
}

/// `<config dir>/loanchat/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("loanchat").join("config.toml"))
}

/// Replace a leading `~` with the home directory.
pub(crate) fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_configured() {
        let settings =
            Settings::resolve(FileConfig::default(), EnvOverrides::default(), None).expect("resolve");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.download_dir, PathBuf::from("."));
    }

    #[test]
    fn flag_beats_env_beats_file() {
        let file = FileConfig {
            api_url: Some("http://file:1".into()),
            api_key: Some("file-key".into()),
            download_dir: Some(PathBuf::from("/tmp/letters")),
        };
        let env = EnvOverrides {
            api_url: Some("http://env:2".into()),
            api_key: Some("env-key".into()),
        };

        let settings = Settings::resolve(file.clone(), env.clone(), Some("https://flag:3".into()))
            .expect("resolve");
        assert_eq!(settings.api_url, "https://flag:3");
        assert_eq!(settings.api_key.as_deref(), Some("env-key"));
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/letters"));

        let settings = Settings::resolve(file.clone(), env, None).expect("resolve");
        assert_eq!(settings.api_url, "http://env:2");

        let settings = Settings::resolve(file, EnvOverrides::default(), None).expect("resolve");
        assert_eq!(settings.api_url, "http://file:1");
        assert_eq!(settings.api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn rejects_non_http_url() {
        let err = Settings::resolve(
            FileConfig::default(),
            EnvOverrides::default(),
            Some("ftp://x".into()),
        )
        .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }

    #[test]
    fn parses_toml_and_rejects_unknown_keys() {
        let path = Path::new("config.toml");
        let file = FileConfig::from_toml("api_url = \"http://svc:8000\"\n", path).expect("parse");
        assert_eq!(file.api_url.as_deref(), Some("http://svc:8000"));

        let err = FileConfig::from_toml("apiurl = \"x\"\n", path).expect_err("unknown key");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
