use std::env;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ingest: IngestServerConfig,
    pub read: ReadServerConfig,
    pub pipeline: PipelineConfig,
}

/// Ingest RPC listener (accepts `PublishPost`).
#[derive(Debug, Clone, Deserialize)]
pub struct IngestServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_ingest_port")]
    pub port: u16,
}

/// Read API listener (`getNotifications`, `getMetrics`, health, `/metrics`).
#[derive(Debug, Clone, Deserialize)]
pub struct ReadServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_read_port")]
    pub port: u16,
    /// Maximum notifications returned from a single `getNotifications` call.
    #[serde(default = "default_read_limit")]
    pub read_limit: usize,
}

/// Delivery pipeline tuning — the configuration constants governing retries,
/// backoff, queue capacity, and worker count.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_worker_count")]
    pub default_worker_count: usize,
    #[serde(default = "default_processing_delay_min_ms")]
    pub processing_delay_min_ms: u64,
    #[serde(default = "default_processing_delay_max_ms")]
    pub processing_delay_max_ms: u64,
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_ingest_port() -> u16 {
    8081
}

fn default_read_port() -> u16 {
    8082
}

fn default_read_limit() -> usize {
    20
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_queue_capacity() -> usize {
    1000
}

fn default_worker_count() -> usize {
    10
}

fn default_processing_delay_min_ms() -> u64 {
    10
}

fn default_processing_delay_max_ms() -> u64 {
    50
}

fn default_shutdown_timeout_ms() -> u64 {
    10_000
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .set_default("ingest.host", default_host())?
            .set_default("ingest.port", default_ingest_port() as i64)?
            .set_default("read.host", default_host())?
            .set_default("read.port", default_read_port() as i64)?
            .set_default("read.read_limit", default_read_limit() as i64)?
            .set_default("pipeline.max_retries", default_max_retries() as i64)?
            .set_default("pipeline.initial_backoff_ms", default_initial_backoff_ms() as i64)?
            .set_default("pipeline.failure_rate", default_failure_rate())?
            .set_default("pipeline.queue_capacity", default_queue_capacity() as i64)?
            .set_default("pipeline.default_worker_count", default_worker_count() as i64)?
            .set_default("pipeline.processing_delay_min_ms", default_processing_delay_min_ms() as i64)?
            .set_default("pipeline.processing_delay_max_ms", default_processing_delay_max_ms() as i64)?
            .set_default("pipeline.shutdown_timeout_ms", default_shutdown_timeout_ms() as i64)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(","),
            );

        builder.build()?.try_deserialize()
    }

    pub fn ingest_addr(&self) -> String {
        format!("{}:{}", self.ingest.host, self.ingest.port)
    }

    pub fn read_addr(&self) -> String {
        format!("{}:{}", self.read.host, self.read.port)
    }
}

impl Default for IngestServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_ingest_port(),
        }
    }
}

impl Default for ReadServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_read_port(),
            read_limit: default_read_limit(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            failure_rate: default_failure_rate(),
            queue_capacity: default_queue_capacity(),
            default_worker_count: default_worker_count(),
            processing_delay_min_ms: default_processing_delay_min_ms(),
            processing_delay_max_ms: default_processing_delay_max_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}
