//! Application configuration loaded from environment variables.

use std::env;

/// Origins allowed by default, matching the deployed web client.
const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "https://sdep-community.netlify.app",
    "https://sdep-community.firebaseapp.com",
];

const DEFAULT_PORT: u16 = 3000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project hosting the Firestore database
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Browser origins allowed by CORS (localhost is always allowed)
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Fixed configuration for tests.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            port: DEFAULT_PORT,
            allowed_origins: default_origins(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| default_origins());

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port,
            allowed_origins,
        })
    }

    /// Whether a browser origin may call the API.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
            || origin.starts_with("http://localhost")
            || origin.starts_with("http://127.0.0.1")
    }
}

fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" https://a.example/ ,, https://b.example");
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_origin_allowed() {
        let config = Config::test_default();
        assert!(config.origin_allowed("https://sdep-community.netlify.app"));
        assert!(config.origin_allowed("http://localhost:5173"));
        assert!(config.origin_allowed("http://127.0.0.1:5174"));
        assert!(!config.origin_allowed("https://evil.example"));
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("GCP_PROJECT_ID", "events-test");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.gcp_project_id, "events-test");
        assert_eq!(config.port, 3000);
    }
}
