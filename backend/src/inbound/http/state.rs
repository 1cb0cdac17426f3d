//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{UsersCommand, UsersQuery};

/// Which storage backend serves the users collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageInfo {
    /// SQLite database file.
    Sqlite { database_path: String },
    /// Process-local memory.
    Memory,
}

impl StorageInfo {
    /// Short backend name reported by health and stats endpoints.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite { .. } => "sqlite",
            Self::Memory => "memory",
        }
    }

    /// Database file path, for file-backed storage.
    pub fn database_path(&self) -> Option<&str> {
        match self {
            Self::Sqlite { database_path } => Some(database_path.as_str()),
            Self::Memory => None,
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub storage: StorageInfo,
}

impl HttpState {
    /// Construct state from the user ports and a storage descriptor.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use user_registry::domain::UserService;
    /// use user_registry::inbound::http::state::{HttpState, StorageInfo};
    /// use user_registry::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UserService::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(service.clone(), service, StorageInfo::Memory);
    /// assert_eq!(state.storage.kind(), "memory");
    /// ```
    pub fn new(
        users: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
        storage: StorageInfo,
    ) -> Self {
        Self {
            users,
            users_command,
            storage,
        }
    }
}
