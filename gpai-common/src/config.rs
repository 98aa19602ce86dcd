//! Configuration loading and root folder resolution
//!
//! Resolution priority for every setting: command-line argument,
//! then `GPAI_*` environment variable, then TOML config file, then
//! compiled default. Missing config files are not fatal; missing
//! credentials fail with a message naming every way to supply them.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Optional settings read from gpai.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub bind_address: Option<String>,
    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_from_number: Option<String>,
    pub gemini_api_key: Option<String>,
    pub vision_api_key: Option<String>,
}

impl TomlConfig {
    /// Load the first config file found, or defaults when none exists.
    ///
    /// Looks at `~/.config/gpai/gpai.toml` then `/etc/gpai/gpai.toml`.
    /// A missing file yields defaults; an unparseable file is an error.
    pub fn load() -> Result<Self> {
        for path in Self::candidate_paths() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                return toml::from_str(&content)
                    .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)));
            }
        }
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("gpai").join("gpai.toml"));
        }
        if cfg!(unix) {
            paths.push(PathBuf::from("/etc/gpai/gpai.toml"));
        }
        paths
    }
}

/// Credentials for the outbound WhatsApp channel (Twilio REST API).
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sending address, e.g. "whatsapp:+14155238886".
    pub from_number: String,
}

/// Fully resolved service configuration.
#[derive(Debug, Clone)]
pub struct GpaiConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub twilio: TwilioConfig,
    pub gemini_api_key: String,
    pub vision_api_key: String,
}

impl GpaiConfig {
    /// Resolve full configuration. `cli_root` and `cli_bind` come from
    /// command-line arguments and take highest priority.
    pub fn resolve(cli_root: Option<&str>, cli_bind: Option<&str>) -> Result<Self> {
        let toml = TomlConfig::load()?;

        let root_folder = resolve_root_folder(cli_root, &toml);
        let bind_address = cli_bind
            .map(str::to_string)
            .or_else(|| std::env::var("GPAI_BIND_ADDRESS").ok())
            .or_else(|| toml.bind_address.clone())
            .unwrap_or_else(|| "127.0.0.1:5740".to_string());

        Ok(Self {
            root_folder,
            bind_address,
            twilio: TwilioConfig {
                account_sid: required(
                    "GPAI_TWILIO_ACCOUNT_SID",
                    toml.twilio_account_sid.as_deref(),
                    "twilio_account_sid",
                )?,
                auth_token: required(
                    "GPAI_TWILIO_AUTH_TOKEN",
                    toml.twilio_auth_token.as_deref(),
                    "twilio_auth_token",
                )?,
                from_number: required(
                    "GPAI_TWILIO_FROM_NUMBER",
                    toml.twilio_from_number.as_deref(),
                    "twilio_from_number",
                )?,
            },
            gemini_api_key: required(
                "GPAI_GEMINI_API_KEY",
                toml.gemini_api_key.as_deref(),
                "gemini_api_key",
            )?,
            vision_api_key: required(
                "GPAI_VISION_API_KEY",
                toml.vision_api_key.as_deref(),
                "vision_api_key",
            )?,
        })
    }

    /// Path of the SQLite database inside the root folder.
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("gpai.db")
    }

    /// Create the root folder if it does not exist yet.
    pub fn ensure_root_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }
}

/// Root folder resolution: CLI arg, GPAI_ROOT, TOML, platform default.
pub fn resolve_root_folder(cli_arg: Option<&str>, toml: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("GPAI_ROOT") {
        return PathBuf::from(path);
    }
    if let Some(path) = &toml.root_folder {
        return PathBuf::from(path);
    }
    default_root_folder()
}

/// OS-dependent default root folder (~/.local/share/gpai and friends).
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("gpai"))
        .unwrap_or_else(|| PathBuf::from("./gpai_data"))
}

/// Resolve a credential from environment then TOML, or fail naming both.
fn required(env_var: &str, toml_value: Option<&str>, toml_key: &str) -> Result<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.trim().is_empty() {
            return Ok(value);
        }
    }
    if let Some(value) = toml_value {
        if !value.trim().is_empty() {
            return Ok(value.to_string());
        }
    }
    Err(Error::Config(format!(
        "{} not configured. Set the {} environment variable or {} in gpai.toml",
        toml_key, env_var, toml_key
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_arg_wins_over_toml() {
        let toml = TomlConfig {
            root_folder: Some("/tmp/from-toml".to_string()),
            ..Default::default()
        };
        let resolved = resolve_root_folder(Some("/tmp/from-cli"), &toml);
        assert_eq!(resolved, PathBuf::from("/tmp/from-cli"));
    }

    #[test]
    fn toml_used_when_no_cli_or_env() {
        // GPAI_ROOT is not set in the test environment.
        if std::env::var("GPAI_ROOT").is_ok() {
            return;
        }
        let toml = TomlConfig {
            root_folder: Some("/tmp/from-toml".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/tmp/from-toml"));
    }

    #[test]
    fn default_root_is_nonempty() {
        let toml = TomlConfig::default();
        if std::env::var("GPAI_ROOT").is_ok() {
            return;
        }
        let resolved = resolve_root_folder(None, &toml);
        assert!(!resolved.as_os_str().is_empty());
    }

    #[test]
    fn required_rejects_blank() {
        assert!(required("GPAI_TEST_UNSET_VAR", Some("   "), "some_key").is_err());
        assert_eq!(
            required("GPAI_TEST_UNSET_VAR", Some("value"), "some_key").unwrap(),
            "value"
        );
    }

    #[test]
    fn toml_parses_partial_config() {
        let parsed: TomlConfig =
            toml::from_str("gemini_api_key = \"abc\"\nbind_address = \"0.0.0.0:8080\"").unwrap();
        assert_eq!(parsed.gemini_api_key.as_deref(), Some("abc"));
        assert_eq!(parsed.bind_address.as_deref(), Some("0.0.0.0:8080"));
        assert!(parsed.twilio_auth_token.is_none());
    }
}
