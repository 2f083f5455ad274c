use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::report::validator::{ImageRules, DEFAULT_MAX_IMAGE_BYTES};

pub const ENV_SHEET_ID: &str = "GOOGLE_SHEET_ID";
pub const ENV_SERVICE_ACCOUNT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
pub const ENV_PRIVATE_KEY: &str = "GOOGLE_PRIVATE_KEY";
pub const ENV_DRIVE_FOLDER_ID: &str = "GOOGLE_DRIVE_FOLDER_ID";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub validation: ValidationConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub body_limit_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            body_limit_mb: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub service_account_email: Option<String>,
    pub private_key: Option<String>,
    pub sheet_id: Option<String>,
    pub drive_folder_id: Option<String>,
    pub sheet_name: String,
    pub token_uri: String,
    pub drive_upload_url: String,
    pub drive_api_url: String,
    pub sheets_api_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            service_account_email: None,
            private_key: None,
            sheet_id: None,
            drive_folder_id: None,
            sheet_name: "Sheet1".to_string(),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            drive_upload_url: "https://www.googleapis.com/upload/drive/v3/files".to_string(),
            drive_api_url: "https://www.googleapis.com/drive/v3/files".to_string(),
            sheets_api_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        }
    }
}

/// Google settings with every required value present
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleCredentials {
    pub service_account_email: String,
    /// PEM text with escaped `\n` sequences already turned into newlines
    pub private_key: String,
    pub sheet_id: String,
    pub drive_folder_id: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Google API configuration is incomplete, missing: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl GoogleConfig {
    /// Check that every required value is set, naming all the missing ones
    pub fn resolve(&self) -> Result<GoogleCredentials, ConfigError> {
        let sheet_id = present(&self.sheet_id);
        let email = present(&self.service_account_email);
        let private_key = present(&self.private_key);
        let folder_id = present(&self.drive_folder_id);

        match (sheet_id, email, private_key, folder_id) {
            (Some(sheet_id), Some(email), Some(private_key), Some(folder_id)) => {
                Ok(GoogleCredentials {
                    service_account_email: email.to_string(),
                    private_key: private_key.replace("\\n", "\n"),
                    sheet_id: sheet_id.to_string(),
                    drive_folder_id: folder_id.to_string(),
                })
            }
            _ => {
                let missing = [
                    (sheet_id.is_none(), ENV_SHEET_ID),
                    (email.is_none(), ENV_SERVICE_ACCOUNT_EMAIL),
                    (private_key.is_none(), ENV_PRIVATE_KEY),
                    (folder_id.is_none(), ENV_DRIVE_FOLDER_ID),
                ]
                .into_iter()
                .filter_map(|(is_missing, name)| is_missing.then_some(name))
                .collect();
                Err(ConfigError::Missing(missing))
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub enforce_image_rules: bool,
    pub max_image_bytes: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            enforce_image_rules: true,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl ValidationConfig {
    pub fn image_rules(&self) -> ImageRules {
        ImageRules {
            enforce: self.enforce_image_rules,
            max_bytes: self.max_image_bytes,
            ..ImageRules::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Rotate once the file reaches this many megabytes
    pub size: u64,
    pub max_files: usize,
}

impl Config {
    /// Defaults overlaid with the Google environment variables
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Replace Google settings with any non-empty value `lookup` returns
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let google = &mut self.google;
        for (name, slot) in [
            (ENV_SHEET_ID, &mut google.sheet_id),
            (ENV_SERVICE_ACCOUNT_EMAIL, &mut google.service_account_email),
            (ENV_PRIVATE_KEY, &mut google.private_key),
            (ENV_DRIVE_FOLDER_ID, &mut google.drive_folder_id),
        ] {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *slot = Some(value);
            }
        }
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))?;
    let mut config: Config = toml::from_str(&config_text)?;
    config.apply_overrides(|name| std::env::var(name).ok());
    Ok(config)
}
