use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub ai_api_key: Option<String>,
    pub ai_api_url: String,
    pub ai_model: String,
    pub ai_timeout_secs: u64,
    pub api_rps: u32,
    pub public_rps: u32,
    pub share_base_url: String,
    pub player_idle_minutes: i64,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env_or("SERVER_ADDRESS", "0.0.0.0:8080"),
            database_url: get_env_opt("DATABASE_URL"),
            jwt_secret: get_env("JWT_SECRET")?,
            session_ttl_hours: get_env_parse_or("SESSION_TTL_HOURS", 24)?,
            ai_api_key: get_env_opt("AI_API_KEY"),
            ai_api_url: get_env_or(
                "AI_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            ai_model: get_env_or("AI_MODEL", "gpt-4o"),
            ai_timeout_secs: get_env_parse_or("AI_TIMEOUT_SECS", 60)?,
            api_rps: get_env_parse_or("API_RPS", 50)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 100)?,
            share_base_url: get_env_or("SHARE_BASE_URL", "http://localhost:5173"),
            player_idle_minutes: get_env_parse_or("PLAYER_IDLE_MINUTES", 120)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn get_env_or(name: &str, default: &str) -> String {
    get_env_opt(name).unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_opt(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
