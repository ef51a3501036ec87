//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate
//! with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts.
    users (id) {
        id -> Uuid,
        /// Unique login name (`users_username_key`).
        #[max_length = 64]
        username -> Varchar,
        /// Unique lower-cased address (`users_email_key`).
        #[max_length = 120]
        email -> Varchar,
        /// Argon2id PHC string.
        #[max_length = 255]
        password_hash -> Varchar,
        /// `military` or `doctor` (`users_role_check`).
        #[max_length = 16]
        role -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Consultation requests. A null `responder_id` marks an open request.
    consultations (id) {
        id -> Uuid,
        #[max_length = 140]
        body -> Varchar,
        created_at -> Timestamptz,
        requester_id -> Uuid,
        responder_id -> Nullable<Uuid>,
        /// Latest text posted by the responder.
        #[max_length = 140]
        response -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Append-only chat log.
    consultation_messages (id) {
        id -> Uuid,
        /// Insertion order; generated by the database.
        seq -> Int8,
        consultation_id -> Uuid,
        author_id -> Uuid,
        #[max_length = 140]
        body -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(consultations -> users (requester_id));
diesel::joinable!(consultation_messages -> consultations (consultation_id));

diesel::allow_tables_to_appear_in_same_query!(users, consultations, consultation_messages);
