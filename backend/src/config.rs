//! Service settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `USERS_*` environment variables, and an
//! optional configuration file. Every field has a default, so a bare
//! invocation serves SQLite on `127.0.0.1:3000`.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

/// Errors raised when settings hold unusable values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The storage backend name is not recognised.
    #[error("unknown storage backend `{value}`; expected `sqlite` or `memory`")]
    UnknownStorage { value: String },
    /// The host does not resolve to a socket address.
    #[error("invalid host `{value}`: {message}")]
    InvalidHost { value: String, message: String },
}

/// Backend used to store users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// SQLite database file.
    #[default]
    Sqlite,
    /// Process-local memory; contents are lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(SettingsError::UnknownStorage {
                value: s.to_owned(),
            }),
        }
    }
}

/// Configuration values controlling the HTTP listener and storage.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct ServiceSettings {
    /// Interface to bind; an IP address or a resolvable host name.
    #[ortho_config(default = "127.0.0.1".into())]
    pub host: String,
    /// TCP port to bind.
    #[ortho_config(default = 3000)]
    pub port: u16,
    /// Storage backend, `sqlite` or `memory`.
    #[ortho_config(default = "sqlite".into())]
    pub storage: String,
    /// SQLite database file.
    #[ortho_config(default = "data/users.db".into())]
    pub database_path: PathBuf,
    /// Upper bound on pooled SQLite connections.
    #[ortho_config(default = 1)]
    pub pool_max_size: u32,
}

impl ServiceSettings {
    /// Resolve the socket address to bind.
    ///
    /// Host names such as `localhost` are resolved and the first address
    /// wins.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when the host is blank or does
    /// not resolve.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.trim();
        let invalid = |message: String| SettingsError::InvalidHost {
            value: self.host.clone(),
            message,
        };
        if host.is_empty() {
            return Err(invalid("host is empty".to_owned()));
        }
        (host, self.port)
            .to_socket_addrs()
            .map_err(|err| invalid(err.to_string()))?
            .next()
            .ok_or_else(|| invalid("host resolved to no addresses".to_owned()))
    }

    /// Resolve the storage backend.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownStorage`] for unrecognised names.
    pub fn storage_backend(&self) -> Result<StorageBackend, SettingsError> {
        self.storage.parse()
    }

    /// Return the configured database path.
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Return the pool size, never less than one.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.max(1)
    }
}
