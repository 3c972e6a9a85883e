//! Session-related types.
//!
//! Types stored in the session for authentication and the local cart
//! replica.

use serde::{Deserialize, Serialize};

use tamarind_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the session-local cart replica.
    pub const CART: &str = "cart";
}
