//! Async-safe connection pool for Diesel SQLite connections.
//!
//! SQLite connections are synchronous, so each one is wrapped in
//! `diesel-async`'s `SyncConnectionWrapper`, which runs statements on Tokio's
//! blocking pool. `bb8` owns the wrapped connections.
//!
//! # Design
//!
//! - The default pool holds a single connection that never expires, so the
//!   database file is opened once for the lifetime of the process.
//! - The parent directory of the database file is created on demand.
//! - All errors are mapped to domain-level `PoolError` variants.

use std::path::{Path, PathBuf};
use std::time::Duration;

use diesel::SqliteConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;

/// Pooled SQLite connection type.
pub type SqliteConn = SyncConnectionWrapper<SqliteConnection>;

/// Errors that can occur during pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Failed to check out a connection from the pool.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// Failed to build the connection pool.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    /// Create a checkout error with the given message.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Create a build error with the given message.
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Configuration for the database connection pool.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_registry::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("data/users.db")
///     .with_max_size(2)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.database_path().to_str(), Some("data/users.db"));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_path: PathBuf,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Create a new configuration for the given database file.
    ///
    /// Uses these defaults:
    /// - `max_size`: 1 connection
    /// - `connection_timeout`: 30 seconds
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: database_path.into(),
            max_size: 1,
            connection_timeout: Duration::from_secs(30),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the database file path.
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }
}

/// Async connection pool for SQLite via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<SqliteConn>,
}

impl DbPool {
    /// Create a new connection pool with the given configuration.
    ///
    /// One connection is opened eagerly so an unreadable database fails
    /// startup instead of the first request.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the parent directory cannot be created
    /// or the database cannot be opened.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        ensure_parent_dir(&config.database_path)?;
        let url = config
            .database_path
            .to_str()
            .ok_or_else(|| PoolError::build("database path is not valid UTF-8"))?;
        let manager = AsyncDieselConnectionManager::<SqliteConn>::new(url);

        let pool = Pool::builder()
            .max_size(config.max_size)
            .min_idle(Some(1))
            .max_lifetime(None)
            .idle_timeout(None)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` if a connection cannot be obtained within
    /// the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, SqliteConn>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), PoolError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|err| {
                PoolError::build(format!("failed to create {}: {err}", parent.display()))
            }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_config_default_values() {
        let config = PoolConfig::new("data/users.db");

        assert_eq!(config.database_path(), Path::new("data/users.db"));
        assert_eq!(config.max_size, 1);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(4, 4)]
    #[case(0, 1)]
    fn pool_config_clamps_max_size(#[case] requested: u32, #[case] expected: u32) {
        let config = PoolConfig::new("users.db").with_max_size(requested);

        assert_eq!(config.max_size, expected);
    }

    #[rstest]
    fn ensure_parent_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/deeper/users.db");

        ensure_parent_dir(&path).expect("directories created");

        assert!(dir.path().join("nested/deeper").is_dir());
    }

    #[rstest]
    fn pool_error_display() {
        let checkout_err = PoolError::checkout("timed out");
        let build_err = PoolError::build("unable to open database file");

        assert!(checkout_err.to_string().contains("timed out"));
        assert!(build_err.to_string().contains("unable to open database file"));
    }
}
