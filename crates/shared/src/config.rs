//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Summary scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Summary period configuration.
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Recurring summary generation.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the recurring loop runs at all.
    #[serde(default = "default_scheduler_enabled")]
    pub enabled: bool,
    /// Seconds between two scheduled runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Run one pass immediately instead of waiting a full interval.
    #[serde(default)]
    pub run_on_start: bool,
}

fn default_scheduler_enabled() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    3600 // 1 hour
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_scheduler_enabled(),
            interval_secs: default_interval_secs(),
            run_on_start: false,
        }
    }
}

/// Reporting window configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    /// IANA timezone used for the weekday cutoff and midnight normalisation.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "reimburse=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `REIMBURSE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("REIMBURSE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("REIMBURSE__DATABASE__URL", Some("postgres://localhost/reimburse")),
                ("REIMBURSE__SCHEDULER__INTERVAL_SECS", Some("60")),
                ("REIMBURSE__SUMMARY__TIMEZONE", Some("Asia/Tokyo")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/reimburse");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.scheduler.interval_secs, 60);
                assert!(config.scheduler.enabled);
                assert_eq!(config.summary.timezone, "Asia/Tokyo");
                assert_eq!(config.logging.format, LogFormat::Pretty);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["REIMBURSE__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_defaults() {
        let scheduler = SchedulerConfig::default();
        assert!(scheduler.enabled);
        assert_eq!(scheduler.interval_secs, 3600);
        assert!(!scheduler.run_on_start);
        assert_eq!(SummaryConfig::default().timezone, "UTC");
        assert_eq!(LoggingConfig::default().filter, "reimburse=info,sea_orm=warn");
    }
}
