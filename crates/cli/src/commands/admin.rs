//! Admin account management commands.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection
//!   string

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use tamarind_core::AdminRole;

/// Minimum bootstrap password length (matches the admin API).
const MIN_PASSWORD_LENGTH: usize = 12;

/// Errors that can occur during admin account operations.
#[derive(Debug, Error)]
pub enum AdminCliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, viewer")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Account already exists.
    #[error("Admin account already exists with email: {0}")]
    AccountExists(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

/// Create a new admin account and return its ID.
///
/// # Errors
///
/// Returns [`AdminCliError`] on invalid input, a duplicate email, or a
/// database failure.
pub async fn create_account(
    email: &str,
    password: &str,
    role: &str,
) -> Result<i32, AdminCliError> {
    dotenvy::dotenv().ok();

    let role: AdminRole = role
        .parse()
        .map_err(|_| AdminCliError::InvalidRole(role.to_owned()))?;

    let email = email.trim().to_lowercase();
    if !email.contains('@') || !email.contains('.') {
        return Err(AdminCliError::InvalidEmail(email));
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminCliError::WeakPassword);
    }

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminCliError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let existing: Option<i32> =
        sqlx::query_scalar("SELECT id FROM shop.admin_user WHERE email = $1")
            .bind(&email)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AdminCliError::AccountExists(email));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AdminCliError::Hash(e.to_string()))?;

    tracing::info!("Creating admin account: {} ({})", email, role);
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO shop.admin_user (email, password_hash, role)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(&email)
    .bind(&password_hash)
    .bind(role.to_string())
    .fetch_one(&pool)
    .await?;

    Ok(id)
}
