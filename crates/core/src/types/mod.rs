//! Shared type definitions.
//!
//! Newtype wrappers and enums used across the storefront, admin, and CLI
//! crates. Database encodings live behind the `postgres` feature so the
//! crate stays I/O-free by default.

mod email;
mod id;
mod money;
mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{OrderTotals, TotalsError};
pub use status::{AdminRole, CouponKind, CouponStatus, OrderStatus, PaymentMethod};
