//! Configuration module

use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the serialized classifier artifact
    pub model_path: String,

    /// Server port
    pub port: u16,

    /// Optional background image for the page (display-only)
    pub background_image: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "models/rf_multiclass.onnx".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            background_image: env::var("BACKGROUND_IMAGE").ok(),
        }
    }
}
