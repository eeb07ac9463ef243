use serde::Deserialize;
use std::env;
use std::str::FromStr;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub redis: RedisConfig,
    pub backend: BackendConfig,
    pub jwt: JwtConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub cache: CacheConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

// Настройки Redis; без URL кеш выключен
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: Option<String>,
}

// Настройки REST-бэкенда, который хранит автобусы, расписания и брони
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

// Настройки JWT (секрет общий с бэкендом, который выдаёт токены)
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
}

// Настройки Circuit Breaker
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Время жизни записей в кеше
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub bus_ttl_seconds: u64,
    pub schedule_ttl_seconds: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

fn var_or<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: var_or("PORT", "8000")?,
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "bus_ticketing=debug,tower_http=debug".to_string()),
                log_format: var_or("LOG_FORMAT", "text")?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
            },
            backend: BackendConfig {
                base_url: env::var("BACKEND_URL")
                    .unwrap_or_else(|_| "http://localhost:5000/api".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout_seconds: var_or("BACKEND_TIMEOUT_SECONDS", "10")?,
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: var_or("CIRCUIT_BREAKER_FAILURE_THRESHOLD", "5")?,
                timeout_seconds: var_or("CIRCUIT_BREAKER_TIMEOUT_SECONDS", "60")?,
            },
            cache: CacheConfig {
                bus_ttl_seconds: var_or("CACHE_BUS_TTL_SECONDS", "3600")?,
                schedule_ttl_seconds: var_or("CACHE_SCHEDULE_TTL_SECONDS", "300")?,
            },
        })
    }
}
