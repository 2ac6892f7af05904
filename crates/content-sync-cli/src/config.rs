use std::path::PathBuf;

use anyhow::{Context, Result};
use content_sync::Locale;
use content_sync_clevertap::{ClevertapConfig, Region};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when the config file has no passcode.
pub const PASSCODE_ENV: &str = "CLEVERTAP_PASSCODE";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    pub account_id: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    pub api_base_url: Option<String>,
    pub passcode: Option<String>,
    #[serde(default)]
    pub locales: Vec<LocaleEntry>,
}

/// A locale offered for translation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocaleEntry {
    pub code: String,
    pub name: String,
}

/// Values given on the command line, which win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub account_id: Option<String>,
    pub region: Option<String>,
}

fn default_region() -> String {
    Region::default().as_str().into()
}

/// Config file path: `~/.config/content-sync/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("content-sync").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(error) => tracing::warn!(
                path = %path.display(),
                %error,
                "failed to parse config, using defaults"
            ),
        }
    }

    AppConfig {
        region: default_region(),
        ..Default::default()
    }
}

impl AppConfig {
    pub fn locale_codes(&self) -> Vec<String> {
        self.locales.iter().map(|l| l.code.clone()).collect()
    }

    /// Build the client configuration. `passcode_env` is the value of
    /// [`PASSCODE_ENV`], if set.
    pub fn resolve(
        &self,
        overrides: &Overrides,
        passcode_env: Option<String>,
    ) -> Result<ClevertapConfig> {
        let account_id = overrides
            .account_id
            .clone()
            .or_else(|| self.account_id.clone())
            .context("no account id configured (set account_id or pass --account-id)")?;

        let passcode = self
            .passcode
            .clone()
            .or(passcode_env)
            .with_context(|| format!("no passcode configured (set passcode or {PASSCODE_ENV})"))?;

        let region: Region = overrides
            .region
            .as_deref()
            .unwrap_or(&self.region)
            .parse()?;

        let mut config = ClevertapConfig::new(account_id, passcode, region);
        config.api_base_url = self.api_base_url.clone();
        config.locales = self
            .locales
            .iter()
            .map(|l| Locale {
                code: l.code.clone(),
                name: l.name.clone(),
            })
            .collect();
        Ok(config)
    }
}
