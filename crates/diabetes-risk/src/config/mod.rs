use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::evaluation::{AcceptancePolicy, DecisionThresholdPolicy, PolicyError};
use crate::features::{AgeGroupStrategy, FeatureConfig, FeatureError};

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

/// Top-level configuration, loaded once before any pipeline run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub features: FeatureConfig,
    pub decision: DecisionThresholdPolicy,
    pub acceptance: AcceptancePolicy,
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
        let log_format = LogFormat::from_env_value(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        )?;

        let age_group_strategy = env::var("APP_AGE_GROUP_STRATEGY")
            .unwrap_or_else(|_| AgeGroupStrategy::default().as_str().to_string())
            .parse::<AgeGroupStrategy>()
            .map_err(ConfigError::AgeGroupStrategy)?;

        let decision = match env::var("APP_DECISION_THRESHOLD") {
            Ok(raw) => {
                let threshold = parse_rate("APP_DECISION_THRESHOLD", &raw)?;
                DecisionThresholdPolicy::new(threshold).map_err(ConfigError::DecisionPolicy)?
            }
            Err(_) => env::var("APP_DECISION_POLICY")
                .unwrap_or_else(|_| "balanced".to_string())
                .parse::<DecisionThresholdPolicy>()
                .map_err(ConfigError::DecisionPolicy)?,
        };

        let defaults = AcceptancePolicy::default();
        let acceptance = AcceptancePolicy {
            max_false_negative_rate: rate_from_env(
                "APP_MAX_FALSE_NEGATIVE_RATE",
                defaults.max_false_negative_rate,
            )?,
            min_recall: rate_from_env("APP_MIN_RECALL", defaults.min_recall)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            features: FeatureConfig { age_group_strategy },
            decision,
            acceptance,
        })
    }
}

fn rate_from_env(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => parse_rate(key, &raw),
        Err(_) => Ok(default),
    }
}

/// Rates and thresholds must parse and lie in [0, 1].
fn parse_rate(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| (0.0..=1.0).contains(value))
        .ok_or_else(|| ConfigError::InvalidRate {
            key,
            value: raw.to_string(),
        })
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_env_value(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidRate { key: &'static str, value: String },
    AgeGroupStrategy(FeatureError),
    DecisionPolicy(PolicyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be compact or pretty, got '{}'", value)
            }
            ConfigError::InvalidRate { key, value } => {
                write!(f, "{} must be a number between 0 and 1, got '{}'", key, value)
            }
            ConfigError::AgeGroupStrategy(err) => write!(f, "APP_AGE_GROUP_STRATEGY: {}", err),
            ConfigError::DecisionPolicy(err) => write!(f, "decision policy: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::AgeGroupStrategy(err) => Some(err),
            ConfigError::DecisionPolicy(err) => Some(err),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat(_)
            | ConfigError::InvalidRate { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    const KEYS: [&str; 10] = [
        "APP_ENV",
        "APP_HOST",
        "APP_PORT",
        "APP_LOG_LEVEL",
        "APP_LOG_FORMAT",
        "APP_AGE_GROUP_STRATEGY",
        "APP_DECISION_POLICY",
        "APP_DECISION_THRESHOLD",
        "APP_MAX_FALSE_NEGATIVE_RATE",
        "APP_MIN_RECALL",
    ];

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in KEYS {
            env::remove_var(key);
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
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.features.age_group_strategy, AgeGroupStrategy::Detailed);
        assert_eq!(config.decision, DecisionThresholdPolicy::balanced());
        assert_eq!(config.acceptance, AcceptancePolicy::default());
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
    fn reads_stage_and_decision_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_AGE_GROUP_STRATEGY", "coarse");
        env::set_var("APP_DECISION_POLICY", "prevention");
        env::set_var("APP_MIN_RECALL", "0.95");
        env::set_var("APP_LOG_FORMAT", "pretty");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.features.age_group_strategy, AgeGroupStrategy::Coarse);
        assert_eq!(config.decision, DecisionThresholdPolicy::prevention());
        assert_eq!(config.acceptance.min_recall, 0.95);
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        reset_env();
    }

    #[test]
    fn explicit_threshold_overrides_named_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DECISION_POLICY", "diagnostic");
        env::set_var("APP_DECISION_THRESHOLD", "0.42");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.decision.threshold(), 0.42);
        reset_env();
    }

    #[test]
    fn unknown_age_group_strategy_fails_fast() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_AGE_GROUP_STRATEGY", "decades");
        let error = AppConfig::load().expect_err("strategy rejected");
        assert!(matches!(error, ConfigError::AgeGroupStrategy(_)));
        assert!(error.to_string().contains("decades"));
        reset_env();
    }

    #[test]
    fn out_of_range_values_name_their_key() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DECISION_THRESHOLD", "1.0");
        let error = AppConfig::load().expect_err("threshold must be below 1");
        assert!(matches!(
            error,
            ConfigError::DecisionPolicy(PolicyError::OutOfRange(_))
        ));

        reset_env();
        env::set_var("APP_MAX_FALSE_NEGATIVE_RATE", "lots");
        let error = AppConfig::load().expect_err("rate must parse");
        assert!(error.to_string().contains("APP_MAX_FALSE_NEGATIVE_RATE"));

        reset_env();
        env::set_var("APP_DECISION_POLICY", "reckless");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::DecisionPolicy(PolicyError::UnknownPreset(_)))
        ));
        reset_env();
    }
}
