use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON documents under `DATA_DIR`, one per collection.
    File,
    /// Same engine as `File` without touching the disk.
    Memory,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub otp_ttl_minutes: i64,
    pub otp_max_attempts: u32,
    pub otp_sweep_interval_secs: u64,
    pub storage_backend: StorageBackend,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    pub mail_relay_url: Option<String>,
    pub mail_relay_token: Option<String>,
    pub mail_from: String,
    pub auth_rps: u32,
    /// Honour `X-Forwarded-For` / `X-Real-IP` for rate limiting. Only enable
    /// behind a reverse proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
    pub log_format: LogFormat,
    pub cors_allowed_origins: Vec<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let storage_backend = get_env_parse_or("STORAGE_BACKEND", StorageBackend::File)?;
        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(Error::Config(
                "DATABASE_URL is required when STORAGE_BACKEND=postgres".to_string(),
            ));
        }

        let jwt_secret = get_env("JWT_SECRET")?;
        if jwt_secret.len() < 16 {
            return Err(Error::Config(
                "JWT_SECRET must be at least 16 characters".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:3000"),
            jwt_secret,
            token_ttl_days: get_env_parse_or("TOKEN_TTL_DAYS", 7)?,
            otp_ttl_minutes: get_env_parse_or("OTP_TTL_MINUTES", 10)?,
            otp_max_attempts: get_env_parse_or("OTP_MAX_ATTEMPTS", 5)?,
            otp_sweep_interval_secs: get_env_parse_or("OTP_SWEEP_INTERVAL_SECS", 60)?,
            storage_backend,
            data_dir: PathBuf::from(get_env_or("DATA_DIR", "./data")),
            database_url,
            mail_relay_url: env::var("MAIL_RELAY_URL").ok().filter(|v| !v.is_empty()),
            mail_relay_token: env::var("MAIL_RELAY_TOKEN").ok().filter(|v| !v.is_empty()),
            mail_from: get_env_or("MAIL_FROM", "no-reply@jobportal.local"),
            auth_rps: get_env_parse_or("AUTH_RPS", 20)?,
            trust_proxy_headers: get_env_parse_or("TRUST_PROXY_HEADERS", false)?,
            log_format: get_env_parse_or("LOG_FORMAT", LogFormat::Pretty)?,
            cors_allowed_origins: get_env_or("CORS_ALLOWED_ORIGINS", "*")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
