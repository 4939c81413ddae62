use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                              // unique user ID
    pub name: String,                          // display name
    pub email: String,                         // unique lookup key
    #[serde(skip_serializing)]
    pub password_hash: String,                 // Argon2 hash, not exposed in JSON
    #[serde(skip_serializing)]
    pub otp: Option<String>,                   // pending verification code
    pub otp_expires: Option<OffsetDateTime>,   // set together with otp
    pub created_at: OffsetDateTime,            // creation timestamp
}
