use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies, including multipart uploads.
    pub max_upload_bytes: usize,
    pub frontend_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 2 * 1024 * 1024,
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl AppConfig {
    /// Read settings from the environment, falling back to defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("BACKEND_HOST").unwrap_or(defaults.host),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .unwrap_or(defaults.port),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| defaults.max_upload_bytes.to_string())
                .parse()
                .unwrap_or(defaults.max_upload_bytes),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
        }
    }
}
