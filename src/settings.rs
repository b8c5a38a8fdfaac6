// src/settings.rs
//! Run settings: where the workspace lives and how the feed is reached.
//! Loaded from a TOML file ($LICITA_SETTINGS_PATH, falling back to
//! config/licita.toml), with the spreadsheet id overridable from the
//! environment. Credentials never live in the file: the service-account
//! JSON comes from $GOOGLE_APPLICATION_CREDENTIALS_JSON.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_SETTINGS_PATH: &str = "LICITA_SETTINGS_PATH";
pub const ENV_SPREADSHEET_ID: &str = "LICITA_SPREADSHEET_ID";
pub const ENV_CREDENTIALS_JSON: &str = "GOOGLE_APPLICATION_CREDENTIALS_JSON";

const DEFAULT_SETTINGS_PATH: &str = "config/licita.toml";
const DEFAULT_FEED_BASE_URL: &str = "https://transparenciachc.blob.core.windows.net/lic-da/";

fn default_feed_base_url() -> String {
    DEFAULT_FEED_BASE_URL.to_string()
}

fn default_top_n() -> usize {
    crate::rank::TOP_N
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub spreadsheet_id: String,
    #[serde(default = "default_feed_base_url")]
    pub feed_base_url: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub tracked_code: Option<String>,
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&content)
            .with_context(|| format!("parsing settings from {}", path.display()))?;
        if let Ok(id) = std::env::var(ENV_SPREADSHEET_ID) {
            settings.spreadsheet_id = id;
        }
        Ok(settings)
    }

    /// $LICITA_SETTINGS_PATH if set (must exist), else config/licita.toml.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_SETTINGS_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_SETTINGS_PATH} points to a non-existent path"));
            }
            return Self::load_from(&pb);
        }
        Self::load_from(Path::new(DEFAULT_SETTINGS_PATH))
    }

    /// Service-account credentials JSON from the environment.
    pub fn credentials_json() -> Result<String> {
        std::env::var(ENV_CREDENTIALS_JSON)
            .map_err(|_| anyhow!("environment variable {ENV_CREDENTIALS_JSON} is not set"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[serial_test::serial]
    #[test]
    fn loads_with_defaults_for_optional_fields() {
        env::remove_var(ENV_SPREADSHEET_ID);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("licita.toml");
        fs::write(&path, r#"spreadsheet_id = "sheet-123""#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.spreadsheet_id, "sheet-123");
        assert_eq!(settings.feed_base_url, DEFAULT_FEED_BASE_URL);
        assert_eq!(settings.top_n, 100);
        assert_eq!(settings.tracked_code, None);
    }

    #[serial_test::serial]
    #[test]
    fn env_overrides_spreadsheet_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("licita.toml");
        fs::write(
            &path,
            r#"
spreadsheet_id = "from-file"
top_n = 50
tracked_code = "5482-99-LE24"
"#,
        )
        .unwrap();

        env::set_var(ENV_SPREADSHEET_ID, "from-env");
        let settings = Settings::load_from(&path).unwrap();
        env::remove_var(ENV_SPREADSHEET_ID);

        assert_eq!(settings.spreadsheet_id, "from-env");
        assert_eq!(settings.top_n, 50);
        assert_eq!(settings.tracked_code.as_deref(), Some("5482-99-LE24"));
    }
}
