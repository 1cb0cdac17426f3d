//! Server entry-point: loads settings, opens storage, and serves the users API.

mod server;

use std::io;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_registry::config::{ServiceSettings, StorageBackend};
use user_registry::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(e.to_string()))?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let backend = settings
        .storage_backend()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let config = match backend {
        StorageBackend::Sqlite => {
            let path = settings.database_path();
            let pool = DbPool::new(PoolConfig::new(path).with_max_size(settings.pool_max_size()))
                .await
                .map_err(io::Error::other)?;
            DieselUserRepository::new(pool.clone())
                .bootstrap()
                .await
                .map_err(io::Error::other)?;
            info!(database = %path.display(), "users table ready");
            ServerConfig::new(bind_addr).with_db_pool(pool, path)
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage; users are lost on restart");
            ServerConfig::new(bind_addr)
        }
    };

    let server = create_server(config)?;
    info!(%bind_addr, "user registry listening");
    server.await
}
