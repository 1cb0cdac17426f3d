//! Idempotent schema bootstrap for the users table.

use diesel_async::RunQueryDsl;

use super::pool::SqliteConn;

const CREATE_USERS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    age INTEGER,
    phone TEXT,
    created_at DATETIME NOT NULL,
    updated_at DATETIME NOT NULL
)";

/// Create the `users` table when it is missing; existing data is untouched.
pub(super) async fn ensure_users_table(conn: &mut SqliteConn) -> diesel::QueryResult<()> {
    diesel::sql_query(CREATE_USERS_TABLE)
        .execute(conn)
        .await
        .map(|_| ())
}
