//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use user_registry::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database: Option<(DbPool, PathBuf)>,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr`.
    ///
    /// Without a database the server keeps users in memory.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            database: None,
        }
    }

    /// Attach a SQLite connection pool for the user repository.
    ///
    /// `database_path` is reported by the stats endpoint.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool, database_path: impl Into<PathBuf>) -> Self {
        self.database = Some((pool, database_path.into()));
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
