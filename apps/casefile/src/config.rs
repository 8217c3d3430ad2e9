//! # Client Configuration
//!
//! Layered configuration for the record API client.
//!
//! Precedence, lowest to highest:
//! 1. Built-in defaults
//! 2. TOML file (`--config <path>`, or `casefile.toml` in the working directory)
//! 3. Environment: `CASEFILE_URL`, `CASEFILE_API_KEY`
//! 4. CLI flags
//!
//! ```toml
//! base_url = "https://records.example.org/api"
//! api_key = "..."
//! page_size = 20
//! request_timeout_ms = 10000
//! ```

use casefile_core::{CasefileError, primitives::DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "casefile.toml";

/// Maximum config file size (64 KB).
const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Effective client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Record API root, without trailing slash.
    pub base_url: String,
    /// Optional Bearer token.
    pub api_key: Option<String>,
    /// Evidence records per page.
    pub page_size: usize,
    /// Per-request timeout.
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, CasefileError> {
        toml::from_str(raw).map_err(|e| CasefileError::InvalidConfig(e.to_string()))
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, CasefileError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            CasefileError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CasefileError::InvalidConfig(format!(
                "Config file size {} bytes exceeds maximum allowed {} bytes",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let raw = std::fs::read_to_string(path).map_err(|e| {
            CasefileError::IoError(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Load defaults plus the config file.
    ///
    /// An explicit path must exist; the implicit `casefile.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, CasefileError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    Self::from_file(&implicit)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply `CASEFILE_URL` / `CASEFILE_API_KEY` through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("CASEFILE_URL") {
            self.base_url = url;
        }
        if let Some(key) = lookup("CASEFILE_API_KEY") {
            self.api_key = Some(key);
        }
    }

    /// Apply the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply CLI flag overrides.
    pub fn apply_overrides(
        &mut self,
        base_url: Option<String>,
        api_key: Option<String>,
        page_size: Option<usize>,
    ) {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        if let Some(size) = page_size {
            self.page_size = size;
        }
    }

    /// Check consistency and normalise the base URL.
    pub fn validate(mut self) -> Result<Self, CasefileError> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(CasefileError::InvalidConfig("base_url is empty".into()));
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(CasefileError::InvalidConfig(format!(
                "base_url '{}' must start with http:// or https://",
                trimmed
            )));
        }
        if self.page_size == 0 {
            return Err(CasefileError::InvalidConfig(
                "page_size must be at least 1".into(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(CasefileError::InvalidConfig(
                "request_timeout_ms must be at least 1".into(),
            ));
        }

        self.base_url = trimmed.to_string();
        // Blank keys mean "no auth", not an empty Bearer token.
        if self.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.api_key = None;
        }
        Ok(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
