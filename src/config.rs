//! Configuration handling for the submission pipeline

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the configured endpoint
pub const ENDPOINT_ENV: &str = "CONTACT_FORM_ENDPOINT";

const DEFAULT_ENDPOINT: &str = "/api/contact";
const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

/// Pipeline configuration, built once at startup and injected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Endpoint that receives the POST
    pub api_endpoint: String,
    /// Site key handed to the bot-verification provider
    pub recaptcha_site_key: String,
    /// Fetch a bot-verification token before submitting
    pub use_recaptcha: bool,
    /// Inject and check the hidden honeypot field
    pub use_honeypot: bool,
    /// Per-file size ceiling in bytes
    pub max_file_size: u64,
    /// Lower-case file extensions accepted by file inputs
    pub allowed_file_types: Vec<String>,
    /// Per-attempt request timeout in milliseconds
    pub timeout_ms: u64,
    /// Total number of attempts, including the first
    pub retry_attempts: u32,
    /// Base backoff delay in milliseconds, multiplied by the attempt index
    pub retry_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_ENDPOINT.to_string(),
            recaptcha_site_key: String::new(),
            use_recaptcha: false,
            use_honeypot: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_file_types: ["pdf", "doc", "docx", "jpg", "jpeg", "png"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl PipelineConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "contact-form", "contact-form")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Read `path` if it exists, otherwise fall back to defaults
    fn load_from(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default().with_env_overrides()),
        }
    }

    /// Load configuration from an explicit file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        self.with_endpoint_override(std::env::var(ENDPOINT_ENV).ok())
    }

    fn with_endpoint_override(mut self, endpoint: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.api_endpoint = endpoint;
        }
        self
    }

    /// Whether a bot-verification token should be fetched
    pub fn challenge_enabled(&self) -> bool {
        self.use_recaptcha && !self.recaptcha_site_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Backoff before the attempt following `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(u64::from(attempt)))
    }

    /// Total attempts, never less than one
    pub fn max_attempts(&self) -> u32 {
        self.retry_attempts.max(1)
    }

    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_file_types.iter().any(|t| t == extension)
    }
}
