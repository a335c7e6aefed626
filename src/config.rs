// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use chrono::{FixedOffset, Offset, Utc};
use std::env;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo";
const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Offsets beyond ±14h do not exist on any civil clock.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Which backend persists goals and food logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// Process-local store; data is lost on restart.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// OpenAI-compatible API base URL
    pub openai_base_url: String,
    /// Model used for text and vision extraction
    pub openai_model: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Path to the branded product catalog (JSON)
    pub brand_catalog_path: String,
    /// Reference timezone for ledger days, as minutes east of UTC
    pub ledger_utc_offset_minutes: i32,
    /// Largest accepted decoded image
    pub max_image_bytes: usize,
    pub store_backend: StoreBackend,

    // --- Secrets ---
    /// API key for the nutrition extractor
    pub openai_api_key: String,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            openai_base_url: "http://127.0.0.1:9/v1".to_string(),
            openai_model: "test-model".to_string(),
            frontend_url: "http://localhost:4200".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            brand_catalog_path: "data/brands.json".to_string(),
            ledger_utc_offset_minutes: 0,
            max_image_bytes: 64 * 1024,
            store_backend: StoreBackend::Memory,
            openai_api_key: "test_key".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first, if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let ledger_utc_offset_minutes: i32 = parse_or("LEDGER_UTC_OFFSET_MINUTES", 0)?;
        if ledger_utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Invalid("LEDGER_UTC_OFFSET_MINUTES"));
        }

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Err(_) | Ok("firestore") => StoreBackend::Firestore,
            Ok("memory") => StoreBackend::Memory,
            Ok(_) => return Err(ConfigError::Invalid("STORE_BACKEND")),
        };

        Ok(Self {
            openai_base_url: env::var("OPENAI_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:4200".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            brand_catalog_path: env::var("BRAND_CATALOG_PATH")
                .unwrap_or_else(|_| "data/brands.json".to_string()),
            ledger_utc_offset_minutes,
            max_image_bytes: parse_or("MAX_IMAGE_BYTES", DEFAULT_MAX_IMAGE_BYTES)?,
            store_backend,

            openai_api_key: env::var("OPENAI_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("OPENAI_API_KEY"))?,
        })
    }

    /// Reference timezone for deciding which ledger day an intake belongs to.
    pub fn ledger_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.ledger_utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Read an optional numeric variable, rejecting unparsable values.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
