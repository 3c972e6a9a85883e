//! Coupon state and validation rules.
//!
//! Validation is a pure function over coupon state, the order subtotal,
//! and the current time. It never touches the usage counter: the bounded
//! increment happens atomically inside order placement, after the order is
//! known to be otherwise valid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CouponId, CouponKind, CouponStatus};

/// A discount code as stored in the database.
///
/// Codes are unique case-insensitively and stored upper-cased; use
/// [`Coupon::normalize_code`] before any lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub kind: CouponKind,
    pub amount: Decimal,
    pub min_spend: Option<Decimal>,
    pub max_spend: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
    pub status: CouponStatus,
}

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CouponError {
    /// Unknown code, inactive coupon, or spend outside the coupon's bounds.
    #[error("coupon cannot be applied: {0}")]
    Invalid(String),
    /// The coupon's expiry date has passed.
    #[error("coupon has expired")]
    Expired,
    /// The usage counter has reached the coupon's limit.
    #[error("coupon usage limit reached")]
    LimitReached,
}

impl Coupon {
    /// Normalize a user-supplied code for lookup: trimmed and upper-cased.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Whether the usage limit has been exhausted.
    #[must_use]
    pub fn limit_reached(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.usage_count >= limit)
    }

    /// Validate this coupon against an order subtotal at time `now` and
    /// return the discount it grants.
    ///
    /// The discount is `amount` for fixed coupons and `subtotal * amount /
    /// 100` for percentage coupons, in both cases capped at the subtotal so
    /// an order total can never go negative from a coupon alone.
    ///
    /// # Errors
    ///
    /// - [`CouponError::Invalid`] when inactive or the subtotal is outside
    ///   the `min_spend`/`max_spend` bounds
    /// - [`CouponError::Expired`] when past `expires_at`
    /// - [`CouponError::LimitReached`] when `usage_count >= usage_limit`
    pub fn validate(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponError> {
        if self.status != CouponStatus::Active {
            return Err(CouponError::Invalid("coupon is not active".to_owned()));
        }

        if let Some(expires_at) = self.expires_at
            && now > expires_at
        {
            return Err(CouponError::Expired);
        }

        if let Some(min) = self.min_spend
            && subtotal < min
        {
            return Err(CouponError::Invalid(format!(
                "order subtotal is below the minimum spend of {min}"
            )));
        }

        if let Some(max) = self.max_spend
            && subtotal > max
        {
            return Err(CouponError::Invalid(format!(
                "order subtotal is above the maximum spend of {max}"
            )));
        }

        if self.limit_reached() {
            return Err(CouponError::LimitReached);
        }

        let discount = match self.kind {
            CouponKind::Fixed => self.amount,
            CouponKind::Percent => subtotal * self.amount / Decimal::from(100),
        };

        Ok(discount.min(subtotal))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn coupon(kind: CouponKind, amount: &str) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            code: "SAVE10".to_owned(),
            kind,
            amount: dec(amount),
            min_spend: None,
            max_spend: None,
            expires_at: None,
            usage_limit: None,
            usage_count: 0,
            status: CouponStatus::Active,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn fixed_discount() {
        let c = coupon(CouponKind::Fixed, "5");
        assert_eq!(c.validate(dec("70"), now()).unwrap(), dec("5"));
    }

    #[test]
    fn percent_discount() {
        let c = coupon(CouponKind::Percent, "10");
        assert_eq!(c.validate(dec("70"), now()).unwrap(), dec("7"));
    }

    #[test]
    fn discount_is_capped_at_subtotal() {
        let c = coupon(CouponKind::Fixed, "100");
        assert_eq!(c.validate(dec("30"), now()).unwrap(), dec("30"));
    }

    #[test]
    fn inactive_coupon_is_invalid() {
        let mut c = coupon(CouponKind::Fixed, "5");
        c.status = CouponStatus::Inactive;
        assert!(matches!(
            c.validate(dec("70"), now()),
            Err(CouponError::Invalid(_))
        ));
    }

    #[test]
    fn expired_coupon() {
        let mut c = coupon(CouponKind::Fixed, "5");
        c.expires_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(c.validate(dec("70"), now()), Err(CouponError::Expired));
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline_instant() {
        let deadline = now();
        let mut c = coupon(CouponKind::Fixed, "5");
        c.expires_at = Some(deadline);
        assert!(c.validate(dec("70"), deadline).is_ok());
    }

    #[test]
    fn spend_bounds() {
        let mut c = coupon(CouponKind::Fixed, "5");
        c.min_spend = Some(dec("50"));
        c.max_spend = Some(dec("100"));

        assert!(matches!(
            c.validate(dec("49.99"), now()),
            Err(CouponError::Invalid(_))
        ));
        assert!(matches!(
            c.validate(dec("100.01"), now()),
            Err(CouponError::Invalid(_))
        ));
        assert!(c.validate(dec("50"), now()).is_ok());
        assert!(c.validate(dec("100"), now()).is_ok());
    }

    #[test]
    fn limit_reached_does_not_discount() {
        let mut c = coupon(CouponKind::Fixed, "5");
        c.usage_limit = Some(3);
        c.usage_count = 3;
        assert_eq!(
            c.validate(dec("70"), now()),
            Err(CouponError::LimitReached)
        );
        // Validation never mutates the counter.
        assert_eq!(c.usage_count, 3);
    }

    #[test]
    fn under_limit_is_fine() {
        let mut c = coupon(CouponKind::Fixed, "5");
        c.usage_limit = Some(3);
        c.usage_count = 2;
        assert!(c.validate(dec("70"), now()).is_ok());
    }

    #[test]
    fn normalize_code_uppercases_and_trims() {
        assert_eq!(Coupon::normalize_code("  save10 "), "SAVE10");
    }
}
