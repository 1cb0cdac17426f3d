//! Builders for the HTTP state backed by the configured user repository.

use std::sync::Arc;

use actix_web::web;
use mockable::Clock;

use user_registry::domain::UserService;
use user_registry::domain::ports::UserRepository;
use user_registry::inbound::http::state::{HttpState, StorageInfo};
use user_registry::outbound::memory::InMemoryUserRepository;
use user_registry::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

/// Wrap one service as both the query and command port.
fn state_for<R>(repo: R, clock: Arc<dyn Clock>, storage: StorageInfo) -> HttpState
where
    R: UserRepository + 'static,
{
    let service = Arc::new(UserService::new(Arc::new(repo), clock));
    HttpState::new(service.clone(), service, storage)
}

/// Build the HTTP state, using the Diesel repository when a pool is
/// configured and the in-memory store otherwise.
pub(super) fn build_http_state(
    config: &ServerConfig,
    clock: Arc<dyn Clock>,
) -> web::Data<HttpState> {
    let state = match &config.database {
        Some((pool, path)) => state_for(
            DieselUserRepository::new(pool.clone()),
            clock,
            StorageInfo::Sqlite {
                database_path: path.display().to_string(),
            },
        ),
        None => state_for(InMemoryUserRepository::new(), clock, StorageInfo::Memory),
    };
    web::Data::new(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    use mockable::DefaultClock;
    use rstest::rstest;
    use user_registry::outbound::persistence::{DbPool, PoolConfig};

    fn bind_addr() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 0))
    }

    #[rstest]
    #[tokio::test]
    async fn memory_state_is_used_without_a_pool() {
        let config = ServerConfig::new(bind_addr());

        let state = build_http_state(&config, Arc::new(DefaultClock));

        assert_eq!(state.storage, StorageInfo::Memory);
        assert_eq!(state.users.count_users().await.expect("count"), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn sqlite_state_reports_the_database_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("users.db");
        let pool = DbPool::new(PoolConfig::new(&path)).await.expect("pool");
        DieselUserRepository::new(pool.clone())
            .bootstrap()
            .await
            .expect("bootstrap");
        let config = ServerConfig::new(bind_addr()).with_db_pool(pool, &path);

        let state = build_http_state(&config, Arc::new(DefaultClock));

        assert_eq!(state.storage.kind(), "sqlite");
        assert_eq!(
            state.storage.database_path(),
            Some(path.display().to_string().as_str())
        );
        assert_eq!(state.users.count_users().await.expect("count"), 0);
    }
}
