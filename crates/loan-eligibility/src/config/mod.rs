use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::eligibility::CoercionPolicy;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sessions: SessionConfig,
    pub reports: ReportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let ttl_secs = seconds_var("APP_SESSION_TTL_SECS", 1800)?;
        let sweep_secs = seconds_var("APP_SESSION_SWEEP_SECS", 60)?;
        let coercion = match env::var("APP_COERCION_POLICY") {
            Ok(raw) => match CoercionPolicy::parse(&raw) {
                Some(policy) => policy,
                None => return Err(ConfigError::InvalidCoercionPolicy(raw)),
            },
            Err(_) => CoercionPolicy::default(),
        };

        let report_dir = env::var("APP_REPORT_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("reports"));

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            sessions: SessionConfig {
                ttl: Duration::from_secs(ttl_secs),
                sweep_interval: Duration::from_secs(sweep_secs),
                coercion,
            },
            reports: ReportConfig { dir: report_dir },
        })
    }
}

fn seconds_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidDuration { name }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filtering and formatting.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Guided dialogue session lifetime and answer handling.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub sweep_interval: Duration,
    pub coercion: CoercionPolicy,
}

/// Where assembled reports are written and served from.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub dir: PathBuf,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDuration { name: &'static str },
    InvalidCoercionPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDuration { name } => {
                write!(f, "{name} must be a positive number of seconds")
            }
            ConfigError::InvalidCoercionPolicy(value) => write!(
                f,
                "APP_COERCION_POLICY '{value}' must be 'default_on_error' or 'reprompt'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidDuration { .. }
            | ConfigError::InvalidCoercionPolicy(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_SESSION_TTL_SECS",
            "APP_SESSION_SWEEP_SECS",
            "APP_COERCION_POLICY",
            "APP_REPORT_DIR",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.sessions.ttl, Duration::from_secs(1800));
        assert_eq!(config.sessions.sweep_interval, Duration::from_secs(60));
        assert_eq!(config.sessions.coercion, CoercionPolicy::DefaultOnError);
        assert!(config.reports.dir.ends_with("reports"));
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn session_settings_come_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SESSION_TTL_SECS", "90");
        env::set_var("APP_COERCION_POLICY", "reprompt");
        env::set_var("APP_REPORT_DIR", "/var/lib/loan-reports");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.sessions.ttl, Duration::from_secs(90));
        assert_eq!(config.sessions.coercion, CoercionPolicy::Reprompt);
        assert_eq!(config.reports.dir, PathBuf::from("/var/lib/loan-reports"));
        reset_env();
    }

    #[test]
    fn rejects_invalid_session_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SESSION_SWEEP_SECS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidDuration {
                name: "APP_SESSION_SWEEP_SECS"
            })
        ));
        reset_env();
        env::set_var("APP_COERCION_POLICY", "maybe");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidCoercionPolicy(_))
        ));
        reset_env();
    }
}
