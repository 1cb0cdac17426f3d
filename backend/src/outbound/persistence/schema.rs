//! Diesel table definitions for the SQLite schema.
//!
//! These definitions must match the bootstrap DDL in `bootstrap.rs` exactly.
//! Timestamps are stored as RFC 3339 text, so they are declared as `Text`
//! and parsed at the adapter boundary.

diesel::table! {
    /// Registered users.
    users (id) {
        /// Primary key: UUID v4 for new rows, opaque for legacy ones.
        id -> Text,
        /// Trimmed display name.
        name -> Text,
        /// Lowercase email address, unique.
        email -> Text,
        /// Age in years, within 0..=150.
        age -> Nullable<Integer>,
        /// Free-form phone number.
        phone -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Text,
        /// Last modification timestamp.
        updated_at -> Text,
    }
}

diesel::define_sql_function! {
    /// SQLite `instr`: 1-based position of `needle` in `haystack`, or 0.
    ///
    /// Unlike `LIKE`, the comparison is case-sensitive.
    fn instr(
        haystack: diesel::sql_types::Text,
        needle: diesel::sql_types::Text,
    ) -> diesel::sql_types::Integer;
}
