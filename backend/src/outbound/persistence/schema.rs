//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Unique (`users_email_key`).
        email -> Varchar,
        /// Encoded password digest, never plaintext.
        password -> Varchar,
        is_active -> Bool,
        created -> Timestamptz,
        modified -> Timestamptz,
        last_login -> Timestamptz,
    }
}

diesel::table! {
    /// Phones owned by a user; rows are removed with their owner.
    phones (id) {
        id -> Int8,
        user_id -> Uuid,
        number -> Nullable<Varchar>,
        city_code -> Nullable<Varchar>,
        country_code -> Nullable<Varchar>,
    }
}

diesel::joinable!(phones -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(phones, users);
