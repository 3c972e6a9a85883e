//! Order money arithmetic.
//!
//! All monetary amounts are `rust_decimal::Decimal` in the store currency's
//! standard unit. [`OrderTotals`] is the only way to produce the four
//! monetary fields of an order, so the `total = subtotal + shipping -
//! discount` invariant is checked in exactly one place, before anything is
//! persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors rejecting inconsistent monetary inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TotalsError {
    /// A component (subtotal, shipping, or discount) is negative.
    #[error("{field} must not be negative")]
    Negative {
        /// Which component was negative.
        field: &'static str,
    },
    /// The discount exceeds subtotal plus shipping, which would make the
    /// total negative.
    #[error("discount exceeds the order amount")]
    DiscountTooLarge,
}

/// The four monetary fields of an order, validated at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping_cost: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute order totals from their components.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError`] if any component is negative or the discount
    /// exceeds `subtotal + shipping_cost`.
    pub fn compute(
        subtotal: Decimal,
        shipping_cost: Decimal,
        discount: Decimal,
    ) -> Result<Self, TotalsError> {
        for (field, value) in [
            ("subtotal", subtotal),
            ("shipping_cost", shipping_cost),
            ("discount", discount),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(TotalsError::Negative { field });
            }
        }

        let total = subtotal + shipping_cost - discount;
        if total.is_sign_negative() && !total.is_zero() {
            return Err(TotalsError::DiscountTooLarge);
        }

        Ok(Self {
            subtotal,
            discount,
            shipping_cost,
            total,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    #[test]
    fn worked_example_from_checkout() {
        // cart [{price 35, qty 2}], flat shipping 10, discount 5
        let totals = OrderTotals::compute(dec("70"), dec("10"), dec("5")).unwrap();
        assert_eq!(totals.subtotal, dec("70"));
        assert_eq!(totals.shipping_cost, dec("10"));
        assert_eq!(totals.discount, dec("5"));
        assert_eq!(totals.total, dec("75"));
    }

    #[test]
    fn zero_components_are_fine() {
        let totals = OrderTotals::compute(dec("0"), dec("0"), dec("0")).unwrap();
        assert_eq!(totals.total, dec("0"));
    }

    #[test]
    fn rejects_negative_components() {
        assert_eq!(
            OrderTotals::compute(dec("-1"), dec("0"), dec("0")),
            Err(TotalsError::Negative { field: "subtotal" })
        );
        assert_eq!(
            OrderTotals::compute(dec("10"), dec("-2"), dec("0")),
            Err(TotalsError::Negative {
                field: "shipping_cost"
            })
        );
        assert_eq!(
            OrderTotals::compute(dec("10"), dec("0"), dec("-5")),
            Err(TotalsError::Negative { field: "discount" })
        );
    }

    #[test]
    fn rejects_discount_larger_than_order() {
        assert_eq!(
            OrderTotals::compute(dec("10"), dec("5"), dec("20")),
            Err(TotalsError::DiscountTooLarge)
        );
        // Discount exactly equal to the order amount is allowed (free order).
        let totals = OrderTotals::compute(dec("10"), dec("5"), dec("15")).unwrap();
        assert_eq!(totals.total, dec("0"));
    }
}
