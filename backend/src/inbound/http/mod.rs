//! HTTP inbound adapter exposing REST endpoints.

pub mod envelope;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use actix_web::{Scope, web};

/// Every endpoint mounted under `/api`.
///
/// `/users/search` is registered before `/users/{id}` so the literal segment
/// wins.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_registry::inbound::http::api_scope;
///
/// let _app = App::new().service(api_scope());
/// ```
pub fn api_scope() -> Scope {
    web::scope("/api")
        .service(health::health)
        .service(health::health_detailed)
        .service(users::list_users)
        .service(users::search_users)
        .service(users::get_user)
        .service(users::create_user)
        .service(users::update_user)
        .service(users::delete_user)
        .service(users::database_stats)
}
