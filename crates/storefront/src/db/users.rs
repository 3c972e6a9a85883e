//! User repository for database operations.
//!
//! Besides account rows, this repository owns the remote cart replica: a
//! `jsonb` column on `shop.user` holding the shopper's [`Cart`]. The
//! session copy is authoritative between syncs; this copy is what survives
//! across devices and is what checkout snapshots.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tamarind_core::{Cart, Email, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(User {
            id: UserId::new(self.id),
            email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, created_at, updated_at
            FROM shop.user
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// Create a new user with email and password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(
            r"
            INSERT INTO shop.user (email)
            VALUES ($1)
            RETURNING id, email, created_at, updated_at
            ",
        )
        .bind(email.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        let user = row.into_user()?;

        sqlx::query(
            r"
            INSERT INTO shop.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ",
        )
        .bind(user.id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            email: String,
            created_at: DateTime<Utc>,
            updated_at: DateTime<Utc>,
            password_hash: Option<String>,
        }

        let row: Option<Row> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.created_at, u.updated_at, p.password_hash
            FROM shop.user u
            LEFT JOIN shop.user_password p ON u.id = p.user_id
            WHERE u.email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };
        let Some(password_hash) = r.password_hash else {
            return Ok(None);
        };

        let user = UserRow {
            id: r.id,
            email: r.email,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
        .into_user()?;

        Ok(Some((user, password_hash)))
    }

    /// Fetch the remote cart replica. An account with no saved cart yields
    /// an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON no
    /// longer parses as a cart.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let value: Option<Option<serde_json::Value>> =
            sqlx::query_scalar("SELECT cart FROM shop.user WHERE id = $1")
                .bind(user_id)
                .fetch_optional(self.pool)
                .await?;

        let Some(value) = value else {
            return Err(RepositoryError::NotFound);
        };

        match value {
            Some(json) => serde_json::from_value(json).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid cart in database: {e}"))
            }),
            None => Ok(Cart::new()),
        }
    }

    /// Overwrite the remote cart replica.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn save_cart(&self, user_id: UserId, cart: &Cart) -> Result<(), RepositoryError> {
        let json = serde_json::to_value(cart).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize cart: {e}"))
        })?;

        let result = sqlx::query(
            r"
            UPDATE shop.user
            SET cart = $1, updated_at = NOW()
            WHERE id = $2
            ",
        )
        .bind(json)
        .bind(user_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Empty the remote cart replica.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), RepositoryError> {
        self.save_cart(user_id, &Cart::new()).await
    }
}
