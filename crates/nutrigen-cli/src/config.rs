//! Configuration file management for nutrigen.
//!
//! Provides a TOML-based config file at `~/.config/nutrigen/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use nutrigen_core::collaborator::GeminiConfig;
use nutrigen_core::collaborator::gemini::DEFAULT_BASE_URL;

/// Per-request timeout when neither the CLI nor the config file sets one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub gemini: GeminiSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSection {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the nutrigen config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/nutrigen` or `~/.config/nutrigen`,
/// also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("nutrigen");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("nutrigen")
}

/// Return the path to the nutrigen config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds the API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Settings given on the command line; `None` falls through the chain.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct NutrigenConfig {
    pub gemini: GeminiConfig,
}

impl NutrigenConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `--api-key` > `GEMINI_API_KEY` > `API_KEY` > `gemini.api_key` > error
    /// - Base URL: `--base-url` > `gemini.base_url` > the public endpoint
    /// - Timeout: `--timeout` > `gemini.timeout_secs` > [`DEFAULT_TIMEOUT_SECS`]
    ///
    /// Blank values count as unset.
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        // A missing file is normal; a present but unreadable one is reported.
        let mut file_error = None;
        let file_config = match load_config() {
            Ok(config) => Some(config),
            Err(e) if config_path().exists() => {
                tracing::warn!(
                    path = %config_path().display(),
                    error = %format!("{e:#}"),
                    "ignoring unusable config file"
                );
                file_error = Some(e);
                None
            }
            Err(_) => None,
        };
        let file = file_config.as_ref().map(|c| &c.gemini);

        let api_key = non_blank(cli.api_key.clone())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|var| non_blank(std::env::var(var).ok()))
            })
            .or_else(|| non_blank(file.map(|f| f.api_key.clone())));
        let Some(api_key) = api_key else {
            if let Some(e) = file_error {
                bail!(
                    "Gemini API key not found; the config file at {} could not be used: {e:#}",
                    config_path().display()
                );
            }
            bail!(
                "Gemini API key not found; set GEMINI_API_KEY or run `nutrigen init --api-key <KEY>` to create a config file"
            );
        };

        let base_url = non_blank(cli.base_url.clone())
            .or_else(|| non_blank(file.and_then(|f| f.base_url.clone())))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = cli
            .timeout_secs
            .or_else(|| file.and_then(|f| f.timeout_secs))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        // Zero disables the timeout.
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Self {
            gemini: GeminiConfig::new(api_key)
                .with_base_url(base_url)
                .with_timeout(timeout),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point XDG_CONFIG_HOME at a fresh temp dir and clear the key env vars.
    fn isolated_env() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        for var in API_KEY_ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
        tmp
    }

    fn restore_env() {
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };
        for var in API_KEY_ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    fn file_with_key(key: &str) -> ConfigFile {
        ConfigFile {
            gemini: GeminiSection {
                api_key: key.to_string(),
                base_url: Some("http://localhost:8080/v1beta".to_string()),
                timeout_secs: Some(30),
            },
        }
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&file_with_key("file-key")).unwrap();
        let loaded = load_config().unwrap();

        restore_env();
        assert_eq!(loaded.gemini.api_key, "file-key");
        assert_eq!(
            loaded.gemini.base_url.as_deref(),
            Some("http://localhost:8080/v1beta")
        );
        assert_eq!(loaded.gemini.timeout_secs, Some(30));
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let loaded: ConfigFile = toml::from_str("[gemini]\napi_key = \"k\"\n").unwrap();
        assert_eq!(loaded.gemini.api_key, "k");
        assert!(loaded.gemini.base_url.is_none());
        assert!(loaded.gemini.timeout_secs.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolated_env();

        save_config(&file_with_key("secret")).unwrap();
        let meta = std::fs::metadata(config_path()).unwrap();

        restore_env();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&file_with_key("file-key")).unwrap();
        unsafe { std::env::set_var("GEMINI_API_KEY", "env-key") };

        let config = NutrigenConfig::resolve(&CliOverrides {
            api_key: Some("cli-key".to_string()),
            base_url: Some("http://cli:1/v1beta".to_string()),
            timeout_secs: Some(5),
        })
        .unwrap();

        restore_env();
        assert_eq!(config.gemini.api_key, "cli-key");
        assert_eq!(config.gemini.base_url, "http://cli:1/v1beta");
        assert_eq!(config.gemini.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        save_config(&file_with_key("file-key")).unwrap();
        unsafe { std::env::set_var("API_KEY", "fallback-key") };

        let fallback = NutrigenConfig::resolve(&CliOverrides::default()).unwrap();
        unsafe { std::env::set_var("GEMINI_API_KEY", "gemini-key") };
        let preferred = NutrigenConfig::resolve(&CliOverrides::default()).unwrap();

        restore_env();
        assert_eq!(fallback.gemini.api_key, "fallback-key");
        assert_eq!(preferred.gemini.api_key, "gemini-key");
        // Non-key settings still come from the file.
        assert_eq!(preferred.gemini.base_url, "http://localhost:8080/v1beta");
        assert_eq!(preferred.gemini.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn resolve_defaults_when_only_key_is_set() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        unsafe { std::env::set_var("GEMINI_API_KEY", "env-key") };

        let config = NutrigenConfig::resolve(&CliOverrides::default()).unwrap();

        restore_env();
        assert_eq!(config.gemini.base_url, DEFAULT_BASE_URL);
        assert_eq!(
            config.gemini.timeout,
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        );
    }

    #[test]
    fn zero_timeout_disables_it() {
        let _lock = lock_env();
        let _tmp = isolated_env();

        let config = NutrigenConfig::resolve(&CliOverrides {
            api_key: Some("k".to_string()),
            timeout_secs: Some(0),
            ..CliOverrides::default()
        })
        .unwrap();

        restore_env();
        assert!(config.gemini.timeout.is_none());
    }

    #[test]
    fn resolve_errors_when_no_api_key() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        unsafe { std::env::set_var("GEMINI_API_KEY", "   ") };

        let result = NutrigenConfig::resolve(&CliOverrides::default());

        restore_env();
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("API key not found"), "unexpected error: {msg}");
    }

    #[test]
    fn malformed_config_file_is_named_in_missing_key_error() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "[gemini\napi_key = ").unwrap();

        let result = NutrigenConfig::resolve(&CliOverrides::default());

        restore_env();
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("API key not found"), "unexpected error: {msg}");
        assert!(msg.contains("could not be used"), "unexpected error: {msg}");
        assert!(msg.contains("failed to parse config file"), "unexpected error: {msg}");
    }

    #[test]
    fn malformed_config_file_is_skipped_when_env_has_key() {
        let _lock = lock_env();
        let _tmp = isolated_env();
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "not toml at all [").unwrap();
        unsafe { std::env::set_var("GEMINI_API_KEY", "env-key") };

        let config = NutrigenConfig::resolve(&CliOverrides::default()).unwrap();

        restore_env();
        assert_eq!(config.gemini.api_key, "env-key");
        assert_eq!(config.gemini.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("nutrigen/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
