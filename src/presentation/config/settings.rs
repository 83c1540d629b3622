use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment as EnvironmentSource, File};
use serde::Deserialize;

use crate::application::services::{MIN_POLL_INTERVAL, SchedulerConfig};

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub scanner: ScannerSettings,
    pub scheduler: SchedulerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub provider: RepositoryProviderSetting,
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryProviderSetting {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_path: String,
    pub azure_account: Option<String>,
    pub azure_access_key: Option<String>,
    pub azure_container: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Memory,
    Local,
    Azure,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSettings {
    pub provider: ScannerProviderSetting,
    pub url: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerProviderSetting {
    Mock,
    Http,
}

/// The stuck-job timeout has no built-in default and must be configured.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    pub worker_count: usize,
    pub stuck_job_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub queue_capacity: usize,
}

impl SchedulerSettings {
    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            worker_count: self.worker_count,
            stuck_job_timeout: Duration::from_secs(self.stuck_job_timeout_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL),
            queue_capacity: self.queue_capacity,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json_format: bool,
}

impl Settings {
    /// Layers `appsettings.{environment}` (optional) under `APP_`-prefixed
    /// environment variables, e.g. `APP_SCHEDULER__WORKER_COUNT=8`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("server.max_upload_bytes", 100_i64 * 1024 * 1024)?
            .set_default("database.provider", "memory")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("storage.provider", "memory")?
            .set_default("storage.local_path", "./data/blobs")?
            .set_default("scanner.provider", "mock")?
            .set_default("scanner.request_timeout_secs", 30_i64)?
            .set_default("scheduler.worker_count", 5_i64)?
            .set_default("scheduler.poll_interval_ms", 200_i64)?
            .set_default("scheduler.queue_capacity", 100_i64)?
            .set_default("logging.level", "info,filegate=debug,tower_http=debug")?
            .set_default("logging.json_format", false)?
            .build()?
            .try_deserialize()
    }
}
