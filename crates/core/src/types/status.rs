//! Status enums for orders, coupons, and admin roles.
//!
//! All enums serialize as `snake_case` strings and are stored as TEXT in
//! Postgres; repositories convert through `Display`/`FromStr`.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders are created as `Pending` and never physically deleted; removal is
/// the `Archived` status. The payment-confirmation flow only ever moves
/// `Pending -> Paid`; a failed verification leaves the order `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Archived,
}

impl OrderStatus {
    /// All statuses an admin may move an order to.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Archived,
    ];
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Archived => "archived",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// How the shopper pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery; finalized synchronously at placement.
    Cod,
    /// Card payment through the external checkout session provider.
    Stripe,
    /// Bank transfer; finalized synchronously at placement.
    Bank,
}

impl PaymentMethod {
    /// Whether placement finalizes the order immediately (no external
    /// payment confirmation step).
    #[must_use]
    pub const fn is_offline(self) -> bool {
        matches!(self, Self::Cod | Self::Bank)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Cod => "cod",
            Self::Stripe => "stripe",
            Self::Bank => "bank",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "stripe" => Ok(Self::Stripe),
            "bank" => Ok(Self::Bank),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Whether a coupon discounts a percentage or a fixed amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Percent,
    Fixed,
}

impl std::fmt::Display for CouponKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Percent => "percent",
            Self::Fixed => "fixed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CouponKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent" => Ok(Self::Percent),
            "fixed" => Ok(Self::Fixed),
            _ => Err(format!("invalid coupon kind: {s}")),
        }
    }
}

/// Coupon availability toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for CouponStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(format!("invalid coupon status: {s}")),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin user management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl AdminRole {
    /// Whether this role may mutate store data.
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }

    /// Whether this role may manage other admin users.
    #[must_use]
    pub const fn can_manage_admins(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn order_status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            let parsed = OrderStatus::from_str(&status.to_string()).expect("parses");
            assert_eq!(parsed, status);
        }
        assert!(OrderStatus::from_str("refunded").is_err());
    }

    #[test]
    fn offline_methods() {
        assert!(PaymentMethod::Cod.is_offline());
        assert!(PaymentMethod::Bank.is_offline());
        assert!(!PaymentMethod::Stripe.is_offline());
    }

    #[test]
    fn role_permissions() {
        assert!(AdminRole::SuperAdmin.can_manage_admins());
        assert!(AdminRole::Admin.can_write());
        assert!(!AdminRole::Admin.can_manage_admins());
        assert!(!AdminRole::Viewer.can_write());
    }
}
