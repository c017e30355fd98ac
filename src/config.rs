use crate::constants::*;
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Resolved configuration with all values filled in (no Options).
///
/// Every field has a default, so an empty TOML file (or no file at all) yields a
/// working configuration. Unknown keys are rejected to catch typos.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Login page of the annotation portal (fetched for the CSRF token, then posted to)
    pub login_url: String,
    /// CSV file listing the sources to export (`Source`, `URL` columns)
    pub sources_file: PathBuf,
    /// Root directory; each source gets `<output_dir>/<source>/<annotations_filename>`
    pub output_dir: PathBuf,
    pub annotations_filename: String,
    /// Name of the hidden anti-forgery input field
    pub csrf_field: String,
    /// Optional columns requested with every export
    pub optional_columns: Vec<String>,
    /// Timeout applied to every request, login included
    pub request_timeout_secs: u64,

    // Logging
    /// Log file, truncated at the start of each run
    pub log_file: PathBuf,
    /// Default filter directive, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            sources_file: PathBuf::from(DEFAULT_SOURCES_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            annotations_filename: DEFAULT_ANNOTATIONS_FILENAME.to_string(),
            csrf_field: DEFAULT_CSRF_FIELD.to_string(),
            optional_columns: DEFAULT_OPTIONAL_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ResolvedConfig {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read, and `InvalidInput` if the TOML is
    /// malformed, contains unknown keys, or fails [`ResolvedConfig::validate`].
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(AppError::InvalidInput(
                "Request timeout must be greater than 0".into(),
            ));
        }
        if self.csrf_field.trim().is_empty() {
            return Err(AppError::InvalidInput("CSRF field name is empty".into()));
        }
        if self.annotations_filename.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Annotations file name is empty".into(),
            ));
        }
        Url::parse(&self.login_url)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Portal login credentials, supplied through the environment.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads credentials from `ANNOTATIONS_USERNAME` / `ANNOTATIONS_PASSWORD`.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Ok(Self::new(env_required(USERNAME_ENV)?, env_required(PASSWORD_ENV)?))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn env_required(key: &str) -> AppResult<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Environment variable {key} is not set")))
}
