use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_REPORT_DEADLINE_MS: u64 = 10_000;

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
    pub engine: EngineConfig,
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

        let engine = EngineConfig {
            fetch_timeout: millis_from_env("ENGINE_FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?,
            report_deadline: millis_from_env(
                "ENGINE_REPORT_DEADLINE_MS",
                DEFAULT_REPORT_DEADLINE_MS,
            )?,
            eligibility_config_path: env::var("ELIGIBILITY_CONFIG_PATH").ok().map(PathBuf::from),
            score_bands_path: env::var("SCORE_BANDS_PATH").ok().map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                include_targets: environment == AppEnvironment::Development,
            },
            engine,
        })
    }
}

fn millis_from_env(variable: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .map(Duration::from_millis)
            .ok_or(ConfigError::InvalidDuration { variable }),
        Err(_) => Ok(Duration::from_millis(default)),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Print the emitting module with each event.
    pub include_targets: bool,
}

/// Timeouts and document locations used by the scoring and eligibility engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single module source fetch.
    pub fetch_timeout: Duration,
    /// Overall deadline for the fetch phase of one report.
    pub report_deadline: Duration,
    pub eligibility_config_path: Option<PathBuf>,
    pub score_bands_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            report_deadline: Duration::from_millis(DEFAULT_REPORT_DEADLINE_MS),
            eligibility_config_path: None,
            score_bands_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidDuration {
        variable: &'static str,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json(serde_json::Error),
    DuplicateRequestType(String),
    DuplicateRequirementId {
        request_type: String,
        requirement_id: String,
    },
    InvalidBand {
        metric: String,
        reason: String,
    },
    InvalidThreshold {
        metric: String,
        reason: String,
    },
    InvalidWeight {
        module: String,
        weight: u8,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidDuration { variable } => {
                write!(f, "{variable} must be a positive number of milliseconds")
            }
            ConfigError::Io { path, .. } => {
                write!(f, "unable to read configuration file {}", path.display())
            }
            ConfigError::Json(err) => write!(f, "malformed configuration document: {err}"),
            ConfigError::DuplicateRequestType(request_type) => write!(
                f,
                "more than one criteria set declared for request type '{request_type}'"
            ),
            ConfigError::DuplicateRequirementId {
                request_type,
                requirement_id,
            } => write!(
                f,
                "requirement id '{requirement_id}' declared twice in criteria set '{request_type}'"
            ),
            ConfigError::InvalidBand { metric, reason } => {
                write!(f, "score band for '{metric}' is invalid: {reason}")
            }
            ConfigError::InvalidThreshold { metric, reason } => {
                write!(f, "recommendation threshold for '{metric}' is invalid: {reason}")
            }
            ConfigError::InvalidWeight { module, weight } => write!(
                f,
                "module '{module}' declares weight {weight}, expected a value between 1 and 10"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Read a JSON configuration document from disk.
pub fn read_document(path: &std::path::Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
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
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("ENGINE_FETCH_TIMEOUT_MS");
        env::remove_var("ENGINE_REPORT_DEADLINE_MS");
        env::remove_var("ELIGIBILITY_CONFIG_PATH");
        env::remove_var("SCORE_BANDS_PATH");
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
        assert!(config.telemetry.include_targets);
        assert_eq!(config.engine.fetch_timeout, Duration::from_millis(2_000));
        assert_eq!(config.engine.report_deadline, Duration::from_millis(10_000));
        assert!(config.engine.eligibility_config_path.is_none());
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
    fn rejects_zero_fetch_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENGINE_FETCH_TIMEOUT_MS", "0");
        let err = AppConfig::load().expect_err("zero timeout rejected");
        assert!(matches!(
            err,
            ConfigError::InvalidDuration {
                variable: "ENGINE_FETCH_TIMEOUT_MS"
            }
        ));
        reset_env();
    }

    #[test]
    fn reads_engine_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ENGINE_REPORT_DEADLINE_MS", "750");
        env::set_var("ELIGIBILITY_CONFIG_PATH", "/etc/hr/eligibility.json");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.engine.report_deadline, Duration::from_millis(750));
        assert_eq!(
            config.engine.eligibility_config_path,
            Some(PathBuf::from("/etc/hr/eligibility.json"))
        );
        reset_env();
    }
}
