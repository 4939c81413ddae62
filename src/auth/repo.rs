use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::User;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Persistence seam for user records, keyed by unique email.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new record with a pending OTP. A storage-level unique
    /// violation on email maps to `StoreError::DuplicateEmail`, so concurrent
    /// registrations for the same address cannot both succeed.
    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        otp: &str,
        otp_expires: OffsetDateTime,
    ) -> Result<User, StoreError>;

    /// Update-in-place of the OTP columns; `(None, None)` clears a pending code.
    async fn save_otp(
        &self,
        email: &str,
        otp: Option<&str>,
        otp_expires: Option<OffsetDateTime>,
    ) -> Result<(), StoreError>;
}

pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, otp, otp_expires, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| anyhow::Error::new(e).context("select user by email"))?;
        Ok(user)
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        otp: &str,
        otp_expires: OffsetDateTime,
    ) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, otp, otp_expires)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, otp, otp_expires, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(otp)
        .bind(otp_expires)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .map_or(false, |d| d.is_unique_violation())
            {
                StoreError::DuplicateEmail
            } else {
                StoreError::Other(anyhow::Error::new(e).context("insert user"))
            }
        })?;
        Ok(user)
    }

    async fn save_otp(
        &self,
        email: &str,
        otp: Option<&str>,
        otp_expires: Option<OffsetDateTime>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET otp = $2, otp_expires = $3
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(otp)
        .bind(otp_expires)
        .execute(&self.db)
        .await
        .map_err(|e| anyhow::Error::new(e).context("update otp columns"))?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use mem::MemStore;
