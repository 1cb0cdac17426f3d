//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides the concrete implementation of the user repository
//! port backed by SQLite via the Diesel ORM, with async support through
//! `diesel-async`'s `SyncConnectionWrapper` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: the repository only translates between Diesel models
//!   and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to
//!   `UserPersistenceError`.
//!
//! # Example
//!
//! ```no_run
//! use user_registry::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("data/users.db")).await?;
//! let repo = DieselUserRepository::new(pool);
//! repo.bootstrap().await?;
//! # Ok(())
//! # }
//! ```

mod bootstrap;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError, SqliteConn};
