use std::env;

use thiserror::Error;

use crate::guard::GuardTargets;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at
/// startup and immutable afterwards; handlers pull it out of the shared state
/// via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects log format and local defaults.
    pub env: Env,
    // Database connection string (Postgres). Local mode may run without one.
    pub db_url: Option<String>,
    // Secret used to verify signed session tokens.
    pub session_secret: String,
    // Name of the cookie carrying the session token.
    pub session_cookie: String,
    // Redirect targets used by the access guard.
    pub sign_in_path: String,
    pub client_landing_path: String,
    pub admin_dashboard_path: String,
    // S3-compatible storage for uploaded images.
    pub s3_endpoint: String,
    pub s3_region: String,
    pub s3_key: String,
    pub s3_secret: String,
    pub s3_bucket: String,
    // Base URL under which uploaded objects are publicly served.
    pub s3_public_url: String,
    // Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
    // Address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// The runtime context: local development (MinIO, pretty logs, dev secret)
/// or production (all secrets mandatory, JSON logs).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Startup configuration failures. The process refuses to start on any of
/// these.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

const LOCAL_SESSION_SECRET: &str = "local-development-session-secret";
const DEFAULT_SESSION_COOKIE: &str = "session-token";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

impl Default for AppConfig {
    /// default
    ///
    /// A safe, non-panicking configuration for tests: local mode, no database,
    /// MinIO defaults, and the local development secret.
    fn default() -> Self {
        let targets = GuardTargets::default();
        Self {
            env: Env::Local,
            db_url: None,
            session_secret: LOCAL_SESSION_SECRET.to_string(),
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            sign_in_path: targets.sign_in,
            client_landing_path: targets.client_landing,
            admin_dashboard_path: targets.admin_dashboard,
            s3_endpoint: "http://localhost:9000".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_key: "admin".to_string(),
            s3_secret: "password".to_string(),
            s3_bucket: "site-uploads".to_string(),
            s3_public_url: "http://localhost:9000/site-uploads".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Reads a variable, treating empty values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables. In production every
    /// secret is mandatory and a missing one is reported as
    /// `ConfigError::Missing`; in local mode development defaults fill the
    /// gaps.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match var("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };
        let defaults = Self::default();

        // In production, a missing value is fatal; locally, the default applies.
        let required = |name: &'static str, fallback: &str| -> Result<String, ConfigError> {
            match (var(name), env) {
                (Some(value), _) => Ok(value),
                (None, Env::Production) => Err(ConfigError::Missing(name)),
                (None, Env::Local) => Ok(fallback.to_string()),
            }
        };

        let db_url = match (var("DATABASE_URL"), env) {
            (None, Env::Production) => return Err(ConfigError::Missing("DATABASE_URL")),
            (db_url, _) => db_url,
        };

        let session_secret = required("SESSION_SECRET", LOCAL_SESSION_SECRET)?;
        let s3_endpoint = required("S3_ENDPOINT", &defaults.s3_endpoint)?;
        let s3_key = required("S3_ACCESS_KEY", &defaults.s3_key)?;
        let s3_secret = required("S3_SECRET_KEY", &defaults.s3_secret)?;
        let s3_bucket = var("S3_BUCKET_NAME").unwrap_or(defaults.s3_bucket);
        let s3_public_url = var("S3_PUBLIC_URL").unwrap_or_else(|| {
            format!("{}/{}", s3_endpoint.trim_end_matches('/'), s3_bucket)
        });

        let max_upload_bytes = match var("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "MAX_UPLOAD_BYTES",
                value: raw,
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            env,
            db_url,
            session_secret,
            session_cookie: var("SESSION_COOKIE").unwrap_or(defaults.session_cookie),
            sign_in_path: var("SIGN_IN_PATH").unwrap_or(defaults.sign_in_path),
            client_landing_path: var("CLIENT_LANDING_PATH")
                .unwrap_or(defaults.client_landing_path),
            admin_dashboard_path: var("ADMIN_DASHBOARD_PATH")
                .unwrap_or(defaults.admin_dashboard_path),
            s3_endpoint,
            s3_region: var("S3_REGION").unwrap_or(defaults.s3_region),
            s3_key,
            s3_secret,
            s3_bucket,
            s3_public_url,
            max_upload_bytes,
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }

    /// The access guard's redirect targets.
    pub fn guard_targets(&self) -> GuardTargets {
        GuardTargets {
            sign_in: self.sign_in_path.clone(),
            client_landing: self.client_landing_path.clone(),
            admin_dashboard: self.admin_dashboard_path.clone(),
        }
    }
}
