//! Server configuration
//!
//! Everything comes from environment variables (a `.env` file is loaded by
//! `main` first). Secrets fall back to throwaway values in development only.

use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const MIN_JWT_SECRET_LEN: usize = 32;

/// SMTP relay settings; absent (development only) means mail is only logged
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP listen port
    pub http_port: u16,
    /// SQLite connection URL
    pub database_url: String,
    /// Root of stored files; product images go under `products/`
    pub upload_dir: PathBuf,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Session lifetime in days
    pub jwt_expiration_days: i64,
    pub smtp: Option<SmtpConfig>,
    /// Sender address for every notification
    pub mail_from: String,
    /// Recipient of new-order alerts
    pub admin_email: String,
    /// Base URL of the web client, used in reset links
    pub frontend_url: String,
    /// Whether `/public/admin-register` is open
    pub allow_admin_registration: bool,
    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(get: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| get(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());
        let is_dev = environment == "development";

        let jwt_secret = Self::require_secret(var("JWT_SECRET"), "JWT_SECRET", &environment)?;
        if !is_dev && jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(format!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters").into());
        }

        let smtp = match var("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_or(var("SMTP_PORT"), "SMTP_PORT", 587)?,
                username: var("SMTP_USERNAME").unwrap_or_default(),
                password: var("SMTP_PASSWORD").unwrap_or_default(),
            }),
            None if is_dev => None,
            None => return Err(format!("SMTP_HOST must be set in {environment} environment").into()),
        };

        let mail_from = var("MAIL_FROM").unwrap_or_else(|| "noreply@getfurnitures.local".into());

        Ok(Self {
            http_port: parse_or(var("HTTP_PORT"), "HTTP_PORT", 3000)?,
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:getfurnitures.db".into()),
            upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".into())),
            jwt_secret,
            jwt_expiration_days: parse_or(var("JWT_EXPIRATION_DAYS"), "JWT_EXPIRATION_DAYS", 7)?,
            smtp,
            admin_email: var("ADMIN_EMAIL").unwrap_or_else(|| mail_from.clone()),
            mail_from,
            frontend_url: var("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:5173".into())
                .trim_end_matches('/')
                .to_string(),
            allow_admin_registration: parse_or(
                var("ALLOW_ADMIN_REGISTRATION"),
                "ALLOW_ADMIN_REGISTRATION",
                is_dev,
            )?,
            cors_origins: var("CORS_ORIGINS")
                .unwrap_or_else(|| "*".into())
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_json: parse_or(var("LOG_JSON"), "LOG_JSON", false)?,
            log_dir: var("LOG_DIR"),
            environment,
        })
    }

    /// Require a secret: must be set outside development.
    fn require_secret(
        value: Option<String>,
        name: &str,
        environment: &str,
    ) -> Result<String, BoxError> {
        match value {
            Some(v) => Ok(v),
            None if environment == "development" => Ok(format!("dev-{name}-not-for-production")),
            None => Err(format!("{name} must be set in {environment} environment").into()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Directory holding product images
    pub fn product_upload_dir(&self) -> PathBuf {
        self.upload_dir.join("products")
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    name: &str,
    default: T,
) -> Result<T, BoxError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {v}").into()),
        None => Ok(default),
    }
}
