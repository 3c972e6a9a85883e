//! Shopper account model.

use chrono::{DateTime, Utc};

use tamarind_core::{Email, UserId};

/// A registered shopper.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
