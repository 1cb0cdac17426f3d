//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! GET    /api/users/search?name=Al&minAge=18&maxAge=30
//! GET    /api/users/{id}
//! POST   /api/users {"name":"Alice","email":"alice@example.com"}
//! PUT    /api/users/{id} {"age":31}
//! DELETE /api/users/{id}
//! GET    /api/database/stats
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use super::ApiResult;
use super::envelope::{created, ok};
use super::schemas::{
    DatabaseStatsEnvelopeSchema, ErrorEnvelopeSchema, UserEnvelopeSchema, UserListEnvelopeSchema,
};
use super::state::HttpState;
use super::validation::parse_user_id;
use crate::domain::ports::{UserChanges, UserDraft};
use crate::domain::validation::{AGE_MAX, AGE_MIN, FieldViolation};
use crate::domain::{Error, User, UserRecord};

/// Request body for `POST /api/users`.
///
/// Example JSON:
/// `{"name":"Alice","email":"alice@example.com","age":30,"phone":"090-1234-5678"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[schema(example = "Alice")]
    pub name: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[serde(default)]
    #[schema(minimum = 0, maximum = 150)]
    pub age: Option<i64>,
    #[serde(default)]
    #[schema(example = "090-1234-5678")]
    pub phone: Option<String>,
}

impl From<CreateUserRequest> for UserDraft {
    fn from(value: CreateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            age: value.age,
            phone: value.phone,
        }
    }
}

/// Request body for `PUT /api/users/{id}`.
///
/// At least one member must be present. `null` is treated like an absent
/// member and leaves the stored value untouched.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    #[schema(minimum = 0, maximum = 150)]
    pub age: Option<i64>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(value: UpdateUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            age: value.age,
            phone: value.phone,
        }
    }
}

/// Query string for `GET /api/users/search`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[into_params(parameter_in = Query)]
pub struct SearchUsersQuery {
    /// Case-sensitive substring of the user name.
    pub name: Option<String>,
    /// Inclusive lower age bound; defaults to 0 when only `maxAge` is given.
    pub min_age: Option<i64>,
    /// Inclusive upper age bound; defaults to 150 when only `minAge` is given.
    pub max_age: Option<i64>,
}

/// Payload of `GET /api/database/stats`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total_users: u64,
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,
}

fn records(users: Vec<User>) -> Vec<UserRecord> {
    users.iter().map(User::to_record).collect()
}

/// List every user, newest first.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users, newest first", body = UserListEnvelopeSchema),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelopeSchema),
        (status = 500, description = "Internal server error", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let users = state.users.list_users().await?;
    Ok(ok(records(users), "Users retrieved successfully"))
}

/// Search users by name fragment and/or age range.
///
/// When both criteria are supplied only users matching both are returned,
/// ordered by age.
#[utoipa::path(
    get,
    path = "/api/users/search",
    params(SearchUsersQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListEnvelopeSchema),
        (status = 400, description = "Missing criteria or invalid bounds", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "searchUsers"
)]
#[get("/users/search")]
pub async fn search_users(
    state: web::Data<HttpState>,
    query: web::Query<SearchUsersQuery>,
) -> ApiResult<HttpResponse> {
    let SearchUsersQuery {
        name,
        min_age,
        max_age,
    } = query.into_inner();
    let name = name.filter(|fragment| !fragment.is_empty());
    let bounds = (min_age.is_some() || max_age.is_some())
        .then(|| (min_age.unwrap_or(AGE_MIN), max_age.unwrap_or(AGE_MAX)));

    let users = match (name, bounds) {
        (None, None) => {
            return Err(Error::validation(vec![FieldViolation::new(
                "query",
                "missing_criteria",
                "provide at least one of name, minAge or maxAge",
            )]));
        }
        (Some(fragment), None) => state.users.find_by_name(&fragment).await?,
        (fragment, Some((min, max))) => {
            let aged = state.users.find_by_age_range(min, max).await?;
            match fragment {
                Some(fragment) => aged
                    .into_iter()
                    .filter(|user| user.name().as_ref().contains(fragment.as_str()))
                    .collect(),
                None => aged,
            }
        }
    };

    Ok(ok(records(users), "Users retrieved successfully"))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserEnvelopeSchema),
        (status = 404, description = "User not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(path.into_inner())?;
    let user = state.users.get_user(&id).await?;
    Ok(ok(user.to_record(), "User retrieved successfully"))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserEnvelopeSchema),
        (status = 400, description = "Validation error", body = ErrorEnvelopeSchema),
        (status = 409, description = "Email already exists", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    payload: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state
        .users_command
        .create_user(payload.into_inner().into())
        .await?;
    Ok(created(user.to_record(), "User created successfully"))
}

/// Partially update a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserEnvelopeSchema),
        (status = 400, description = "Validation error", body = ErrorEnvelopeSchema),
        (status = 404, description = "User not found", body = ErrorEnvelopeSchema),
        (status = 409, description = "Email already exists", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(path.into_inner())?;
    let user = state
        .users_command
        .update_user(&id, payload.into_inner().into())
        .await?;
    Ok(ok(user.to_record(), "User updated successfully"))
}

/// Delete a user, returning the removed record.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User deleted", body = UserEnvelopeSchema),
        (status = 404, description = "User not found", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(path.into_inner())?;
    let user = state.users_command.delete_user(&id).await?;
    Ok(ok(user.to_record(), "User deleted successfully"))
}

/// Report the number of stored users and where they live.
#[utoipa::path(
    get,
    path = "/api/database/stats",
    responses(
        (status = 200, description = "Storage statistics", body = DatabaseStatsEnvelopeSchema),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "databaseStats"
)]
#[get("/database/stats")]
pub async fn database_stats(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let total_users = state.users.count_users().await?;
    let stats = DatabaseStats {
        total_users,
        storage: state.storage.kind().to_owned(),
        database_path: state.storage.database_path().map(str::to_owned),
    };
    Ok(ok(stats, "Database stats retrieved successfully"))
}
