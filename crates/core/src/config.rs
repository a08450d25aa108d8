//! TOML-based configuration system for Registrar.

use crate::error::{RegistrarError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Registrar configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarConfig {
    pub registrar: RegistrarSection,
    #[serde(default)]
    pub lms: LmsConfig,
    #[serde(default)]
    pub books: BooksConfig,
    #[serde(default)]
    pub evals: EvalsConfig,
}

/// Core instance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrarSection {
    pub instance_name: String,
}

/// LMS API connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LmsConfig {
    /// Base URL of the v1 REST API (e.g. `https://lms.example.edu/api/v1`).
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_token: String,
    /// Default account for SIS imports and course listings.
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for LmsConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_token: String::new(),
            account_id: None,
            per_page: default_per_page(),
        }
    }
}

fn default_per_page() -> u32 {
    100
}

/// Book-metadata vendor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BooksConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Raw query fragment appended after the ISBN (vendor-specific).
    #[serde(default)]
    pub query: String,
    /// Raw field-list fragment appended after the query (vendor-specific).
    #[serde(default)]
    pub search_fields: String,
}

/// Course-evaluation vendor configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvalsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl RegistrarConfig {
    /// Load configuration from a TOML file at the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| RegistrarError::Config(format!("failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Validate the configuration, returning an error for invalid combinations.
    pub fn validate(&self) -> Result<()> {
        if self.registrar.instance_name.is_empty() {
            return Err(RegistrarError::Config(
                "registrar.instance_name must not be empty".into(),
            ));
        }

        if self.lms.api_url.is_empty() {
            return Err(RegistrarError::Config(
                "lms.api_url must not be empty".into(),
            ));
        }

        if self.lms.api_token.is_empty() {
            return Err(RegistrarError::Config(
                "lms.api_token must not be empty".into(),
            ));
        }

        if self.books.enabled {
            if self.books.base_url.is_empty() {
                return Err(RegistrarError::Config(
                    "books.base_url is required when book lookups are enabled".into(),
                ));
            }
            if self.books.username.is_empty() {
                return Err(RegistrarError::Config(
                    "books.username is required when book lookups are enabled".into(),
                ));
            }
            if self.books.password.is_empty() {
                return Err(RegistrarError::Config(
                    "books.password is required when book lookups are enabled".into(),
                ));
            }
        }

        if self.evals.enabled && self.evals.api_url.is_empty() {
            return Err(RegistrarError::Config(
                "evals.api_url is required when evaluations are enabled".into(),
            ));
        }

        Ok(())
    }

    /// Generate a sensible default configuration.
    pub fn generate_default() -> Self {
        Self {
            registrar: RegistrarSection {
                instance_name: "My University".into(),
            },
            lms: LmsConfig {
                api_url: "https://lms.example.edu/api/v1".into(),
                api_token: "changeme".into(),
                account_id: Some("1".into()),
                per_page: default_per_page(),
            },
            books: BooksConfig::default(),
            evals: EvalsConfig::default(),
        }
    }
}
