//! SQLite-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted to domain users through [`row_to_user`], which parses
//! the stored timestamps and re-checks entity invariants. A row that fails
//! either step is reported as a query error rather than leaking into the
//! domain.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, User, UserId, UserRecord};

use super::bootstrap::ensure_users_table;
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::{instr, users};

/// Timestamp layout written by older deployments.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a connection error when no connection can be checked out and a
    /// query error when the DDL fails.
    pub async fn bootstrap(&self) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        ensure_users_table(&mut conn).await.map_err(map_diesel_error)
    }
}

/// Map pool errors to domain user persistence errors.
fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain user persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let field = if info.message().contains("users.email") {
                "email"
            } else {
                "id"
            };
            UserPersistenceError::duplicate_key(field)
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => UserPersistenceError::query("database error"),
        _ => UserPersistenceError::query("database error"),
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
        })
        .ok()
}

fn age_for_db(user: &User) -> Option<i32> {
    user.age().map(|age| i32::from(age.value()))
}

/// Convert a database row to a domain user, enforcing entity invariants.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let corrupt = |reason: String| {
        UserPersistenceError::query(format!("corrupt user row {}: {reason}", row.id))
    };

    let created_at = parse_timestamp(&row.created_at)
        .ok_or_else(|| corrupt(format!("unreadable created_at {:?}", row.created_at)))?;
    let updated_at = parse_timestamp(&row.updated_at)
        .ok_or_else(|| corrupt(format!("unreadable updated_at {:?}", row.updated_at)))?;
    let age = row
        .age
        .map(u8::try_from)
        .transpose()
        .map_err(|_| corrupt(format!("age {:?} out of range", row.age)))?;

    let record = UserRecord {
        id: row.id.clone(),
        name: row.name,
        email: row.email,
        age,
        phone: row.phone,
        created_at,
        updated_at,
    };
    User::from_record(record).map_err(|err| corrupt(err.to_string()))
}

/// A row that vanished between the lookup and the delete was not removed by
/// this call.
fn removed_user(affected: usize, row: UserRow) -> Result<Option<User>, UserPersistenceError> {
    if affected == 0 {
        return Ok(None);
    }
    row_to_user(row).map(Some)
}

fn rows_to_users(rows: Vec<UserRow>) -> Result<Vec<User>, UserPersistenceError> {
    rows.into_iter().map(row_to_user).collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_ref())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_name(&self, fragment: &str) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(instr(users::name, fragment).gt(0))
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn find_by_age_range(&self, min: u8, max: u8) -> Result<Vec<User>, UserPersistenceError> {
        if min > max {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::age.between(i32::from(min), i32::from(max)))
            .select(UserRow::as_select())
            .order((users::age.asc(), users::created_at.desc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows_to_users(rows)
    }

    async fn save(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: user.id().as_ref(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            age: age_for_db(user),
            phone: user.phone().map(AsRef::as_ref),
            created_at: format_timestamp(user.created_at()),
            updated_at: format_timestamp(user.updated_at()),
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(user.clone())
    }

    async fn update(&self, id: &UserId, user: &User) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserUpdate {
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            age: age_for_db(user),
            phone: user.phone().map(AsRef::as_ref),
            updated_at: format_timestamp(user.updated_at()),
        };

        let affected = diesel::update(users::table.find(id.as_ref()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Ok(None);
        }

        let row: UserRow = users::table
            .find(id.as_ref())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(row).map(Some)
    }

    async fn delete(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let existing: Option<UserRow> = users::table
            .find(id.as_ref())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = existing else {
            return Ok(None);
        };

        let affected = diesel::delete(users::table.find(id.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        removed_user(affected, row)
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        u64::try_from(total).map_err(|_| UserPersistenceError::query("negative row count"))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for row mapping and error translation; database behaviour is
    //! covered by the integration suite.

    use super::*;
    use chrono::TimeZone;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
    use rstest::{fixture, rstest};

    struct SqliteMessage(&'static str);

    impl DatabaseErrorInformation for SqliteMessage {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[fixture]
    fn row() -> UserRow {
        UserRow {
            id: "0d4c9b0e-7a43-4b8e-9a55-2f5b0d1a7c11".to_owned(),
            name: "Ada".to_owned(),
            email: "ada@example.com".to_owned(),
            age: Some(36),
            phone: None,
            created_at: "2024-05-01T09:30:00.123456Z".to_owned(),
            updated_at: "2024-05-01T09:30:00.123456Z".to_owned(),
        }
    }

    #[rstest]
    fn row_to_user_maps_all_fields(row: UserRow) {
        let user = row_to_user(row).expect("valid row");

        assert_eq!(user.name().as_ref(), "Ada");
        assert_eq!(user.age().map(|age| age.value()), Some(36));
        assert_eq!(user.created_at().timestamp_subsec_micros(), 123_456);
    }

    #[rstest]
    fn row_to_user_accepts_legacy_timestamps(mut row: UserRow) {
        row.created_at = "2023-12-31 23:59:59".to_owned();

        let user = row_to_user(row).expect("legacy timestamp");

        let expected = Utc
            .with_ymd_and_hms(2023, 12, 31, 23, 59, 59)
            .single()
            .expect("valid timestamp");
        assert_eq!(user.created_at(), expected);
    }

    #[rstest]
    #[case::timestamp(|row: &mut UserRow| row.updated_at = "yesterday".to_owned())]
    #[case::negative_age(|row: &mut UserRow| row.age = Some(-1))]
    #[case::age_overflow(|row: &mut UserRow| row.age = Some(151))]
    #[case::blank_name(|row: &mut UserRow| row.name = "  ".to_owned())]
    fn row_to_user_rejects_corrupt_rows(mut row: UserRow, #[case] corrupt: fn(&mut UserRow)) {
        corrupt(&mut row);

        let err = row_to_user(row).expect_err("corrupt row");

        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn removed_user_requires_an_affected_row(row: UserRow) {
        assert_eq!(removed_user(0, row.clone()).expect("mapped"), None);
        let removed = removed_user(1, row).expect("mapped").expect("user");
        assert_eq!(removed.email().as_ref(), "ada@example.com");
    }

    #[rstest]
    fn timestamps_round_trip_through_text() {
        let timestamp = Utc
            .timestamp_opt(1_714_555_800, 987_654_000)
            .single()
            .expect("valid timestamp");

        let text = format_timestamp(timestamp);

        assert_eq!(text, "2024-05-01T09:30:00.987654Z");
        assert_eq!(parse_timestamp(&text), Some(timestamp));
    }

    #[rstest]
    #[case("UNIQUE constraint failed: users.email", "email")]
    #[case("UNIQUE constraint failed: users.id", "id")]
    fn unique_violations_name_the_column(#[case] message: &'static str, #[case] field: &str) {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(SqliteMessage(message)),
        );

        assert_eq!(
            map_diesel_error(error),
            UserPersistenceError::duplicate_key(field)
        );
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new(SqliteMessage("database is closed")),
        );

        assert!(matches!(
            map_diesel_error(error),
            UserPersistenceError::Connection { .. }
        ));
    }

    #[rstest]
    fn pool_errors_map_to_connection_error() {
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            UserPersistenceError::connection("timed out")
        );
    }
}
