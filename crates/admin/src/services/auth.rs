//! Admin authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use crate::db::admin_users::AdminUserRepository;
use crate::error::AdminError;
use crate::models::AdminUser;

/// Minimum password length for admin accounts.
const MIN_PASSWORD_LENGTH: usize = 12;

/// Login with email and password.
///
/// # Errors
///
/// Returns `AdminError::Unauthorized` on bad credentials; the caller
/// cannot distinguish an unknown email from a wrong password.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<AdminUser, AdminError> {
    let repo = AdminUserRepository::new(pool);
    let (admin, hash) = repo
        .get_with_password(email.trim())
        .await?
        .ok_or(AdminError::Unauthorized)?;

    let parsed = PasswordHash::new(&hash).map_err(|e| AdminError::Internal(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AdminError::Unauthorized)?;

    Ok(admin)
}

/// Hash a password for a new admin account.
///
/// # Errors
///
/// Returns `AdminError::Validation`-style message if the password is too
/// short, `AdminError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::Validation(std::collections::HashMap::from([(
            "password".to_owned(),
            vec![format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )],
        )])));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AdminError::Internal(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn short_admin_passwords_are_rejected() {
        assert!(hash_password("elevenchars").is_err());
        assert!(hash_password("twelve chars!").is_ok());
    }
}
