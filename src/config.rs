use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Clone)]
pub struct Config {
    // Gemini
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,

    // Admin
    pub admin_password: String,

    // Server
    pub port: u16,

    // Storage
    pub preferences_file: String,
    pub mock_api_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Gemini - a missing key leaves the assistant offline rather than failing startup
            gemini_api_key: std::env::var("API_KEY")
                .or_else(|_| std::env::var("GEMINI_API_KEY"))
                .ok()
                .filter(|key| !key.trim().is_empty()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_api_url: std::env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_URL.to_string()),

            // Admin
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "password123".to_string()),

            // Server
            port: match std::env::var("PORT") {
                Ok(port) => port.parse().context(format!("Invalid PORT: {}", port))?,
                Err(_) => 8080,
            },

            // Storage
            preferences_file: std::env::var("PREFERENCES_FILE")
                .unwrap_or_else(|_| "data/preferences.json".to_string()),
            mock_api_delay: Duration::from_millis(
                std::env::var("MOCK_API_DELAY_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500),
            ),
        })
    }
}
