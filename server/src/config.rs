use crate::auth::JwtConfig;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | HTTP_PORT | 5001 | HTTP API port |
/// | DB_PATH | data/boutique.db | Embedded database directory |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | CLIENT_URL | http://localhost:3000 | Allowed CORS origin |
/// | SES_FROM_EMAIL | (unset) | Sender address; email disabled when unset |
/// | JWT_SECRET | (generated in dev) | Token signing secret |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// Embedded database directory
    pub db_path: String,
    /// Running environment: development | staging | production
    pub environment: String,
    /// Frontend origin allowed by CORS
    pub client_url: String,
    /// SES sender address (email disabled when None)
    pub ses_from_email: Option<String>,
    /// JWT configuration
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "data/boutique.db".into()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            client_url: std::env::var("CLIENT_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
            ses_from_email: std::env::var("SES_FROM_EMAIL").ok(),
            jwt: JwtConfig::from_env(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
