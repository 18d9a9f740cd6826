//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        #[max_length = 50]
        username -> Varchar,
        /// Lower-cased, unique.
        #[max_length = 255]
        email -> Varchar,
        /// argon2id PHC string.
        #[max_length = 255]
        password_hash -> Varchar,
        #[max_length = 255]
        avatar -> Nullable<Varchar>,
        /// Present while the user holds a session.
        refresh_token -> Nullable<Text>,
        /// One of `admin`, `moderator`, `user`.
        #[max_length = 16]
        role -> Varchar,
        confirmed -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Address-book entries, unique by `(owner_id, email)`.
    contacts (id) {
        id -> Uuid,
        owner_id -> Uuid,
        #[max_length = 50]
        first_name -> Varchar,
        #[max_length = 60]
        last_name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 20]
        phone -> Varchar,
        birth_date -> Date,
        friend_status -> Bool,
    }
}

diesel::joinable!(contacts -> users (owner_id));
diesel::allow_tables_to_appear_in_same_query!(users, contacts);
