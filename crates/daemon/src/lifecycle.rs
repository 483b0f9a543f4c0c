// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use meteo_core::SystemClock;
use meteo_engine::{Durability, MeasurementStore, StoreConfig, StoreError, DEFAULT_CACHE_CAPACITY};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::server::{self, RouterOptions};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_DATA_FILE: &str = "data/mediciones.jsonl";
pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;
pub const LOG_FILE_NAME: &str = "meteod.log";

/// Daemon configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interface to bind
    pub host: String,
    pub port: u16,
    /// Path to the JSONL measurement log
    pub data_file: PathBuf,
    /// Size of the in-memory window
    pub cache_capacity: usize,
    pub durability: Durability,
    /// Emit one trace span per HTTP request
    pub log_requests: bool,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Largest accepted request body, in bytes
    pub body_limit: usize,
}

impl Config {
    /// Build config from `METEO_*` environment variables. A data file given
    /// on the command line wins over `METEO_DATA_FILE`.
    pub fn from_env(data_file: Option<PathBuf>) -> Result<Self, LifecycleError> {
        Self::from_lookup(data_file, |name| std::env::var(name).ok())
    }

    /// Build config from an arbitrary variable source
    pub fn from_lookup<F>(data_file: Option<PathBuf>, lookup: F) -> Result<Self, LifecycleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let data_file = data_file
            .or_else(|| var("METEO_DATA_FILE").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        let cache_capacity = parse_var(&var, "METEO_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?;
        if cache_capacity == 0 {
            return Err(LifecycleError::Config {
                var: "METEO_CACHE_CAPACITY",
                message: "must be at least 1".to_string(),
            });
        }

        let log_path = var("METEO_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_log_path(&data_file));

        Ok(Self {
            host: var("METEO_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&var, "METEO_PORT", DEFAULT_PORT)?,
            cache_capacity,
            durability: parse_var(&var, "METEO_DURABILITY", Durability::default())?,
            log_requests: parse_flag(&var, "METEO_LOG_REQUESTS", true)?,
            body_limit: parse_var(&var, "METEO_BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
            log_path,
            data_file,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_file.clone())
            .with_capacity(self.cache_capacity)
            .with_durability(self.durability)
    }

    pub fn router_options(&self) -> RouterOptions {
        RouterOptions {
            log_requests: self.log_requests,
            body_limit: self.body_limit,
        }
    }

    /// `host:port` for display
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_log_path(data_file: &Path) -> PathBuf {
    match data_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(LOG_FILE_NAME),
        _ => PathBuf::from(LOG_FILE_NAME),
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, default: T) -> Result<T, LifecycleError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| LifecycleError::Config {
            var: name,
            message: format!("{:?}: {}", raw, e),
        }),
    }
}

fn parse_flag<F>(var: &F, name: &'static str, default: bool) -> Result<bool, LifecycleError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = var(name) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LifecycleError::Config {
            var: name,
            message: format!("{:?}: expected true or false", raw),
        }),
    }
}

/// Running daemon: the open store and the bound listener
pub struct Daemon {
    pub config: Config,
    pub store: Arc<MeasurementStore>,
    pub listener: TcpListener,
    /// When daemon started
    pub start_time: Instant,
}

impl Daemon {
    /// Serve HTTP until `shutdown` resolves, then close the store
    pub async fn serve<F>(self, shutdown: F) -> Result<(), LifecycleError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = server::router(Arc::clone(&self.store), self.config.router_options());
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        shutdown_store(&self.store, self.start_time).await
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid {var}: {message}")]
    Config { var: &'static str, message: String },

    #[error("Could not determine log directory")]
    NoLogDir,

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon: load the log, then bind the listener
pub async fn startup(config: &Config) -> Result<Daemon, LifecycleError> {
    let store = MeasurementStore::open(&config.store_config(), SystemClock).await?;
    let replay = store.replay_stats();

    let listener = match TcpListener::bind((config.host.as_str(), config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            // Stop the appender before bailing out
            if let Err(close_err) = store.close().await {
                error!("Failed to close store after bind failure: {}", close_err);
            }
            return Err(LifecycleError::BindFailed(config.address(), e));
        }
    };

    info!(
        "Daemon started: {} records loaded ({} ignored), window {}/{}, durability {}",
        replay.valid,
        replay.ignored,
        store.status().cache_size,
        config.cache_capacity,
        store.durability(),
    );

    Ok(Daemon {
        config: config.clone(),
        store: Arc::new(store),
        listener,
        start_time: Instant::now(),
    })
}

async fn shutdown_store(store: &MeasurementStore, start_time: Instant) -> Result<(), LifecycleError> {
    info!("Shutting down daemon...");
    let stats = store.close().await?;
    info!(
        "Daemon shutdown complete: {} appends written, {} failed, up {:?}",
        stats.written,
        stats.failed,
        start_time.elapsed()
    );
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
