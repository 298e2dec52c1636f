//! Failures of the process edges: settings, database, auth client, listener and logging.

use thiserror::Error;

use crate::config::LoadError;

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to load configuration: {0}")]
    Settings(#[from] LoadError),
    #[error("`{key}` is required for the {backend} backend")]
    MissingSetting {
        key: &'static str,
        backend: &'static str,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migrations failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("auth client could not be built: {0}")]
    AuthClient(#[from] reqwest::Error),
    #[error("failed to install tracing subscriber: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
}

impl InfraError {
    pub fn missing_setting(key: &'static str, backend: &'static str) -> Self {
        Self::MissingSetting { key, backend }
    }

    /// Backing services that may recover on their own.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Migration(_))
    }
}
