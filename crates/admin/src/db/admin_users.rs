//! Admin user repository.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tamarind_core::{AdminRole, AdminUserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::AdminUser;

#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_admin(self) -> Result<AdminUser, RepositoryError> {
        let role = AdminRole::from_str(&self.role)
            .map_err(|e| RepositoryError::DataCorruption(format!("admin {}: {e}", self.id)))?;
        Ok(AdminUser {
            id: AdminUserId::new(self.id),
            email: self.email,
            role,
            created_at: self.created_at,
        })
    }
}

/// Repository for admin account operations.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all admin accounts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows: Vec<AdminUserRow> = sqlx::query_as(
            "SELECT id, email, role, created_at FROM shop.admin_user ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(AdminUserRow::into_admin).collect()
    }

    /// Create an admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let row: AdminUserRow = sqlx::query_as(
            r"
            INSERT INTO shop.admin_user (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, role, created_at
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.to_string())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "admin email already exists"))?;

        row.into_admin()
    }

    /// Change an admin's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn set_role(&self, id: AdminUserId, role: AdminRole) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.admin_user SET role = $1 WHERE id = $2")
            .bind(role.to_string())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Fetch an account and its password hash by email, for login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(AdminUser, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            id: i32,
            email: String,
            role: String,
            created_at: DateTime<Utc>,
            password_hash: String,
        }

        let row: Option<Row> = sqlx::query_as(
            r"
            SELECT id, email, role, created_at, password_hash
            FROM shop.admin_user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let admin = AdminUserRow {
            id: r.id,
            email: r.email,
            role: r.role,
            created_at: r.created_at,
        }
        .into_admin()?;

        Ok(Some((admin, r.password_hash)))
    }
}
