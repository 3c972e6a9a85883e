//! Checkout pricing.
//!
//! Cart lines carry snapshot prices for display, but an order is priced
//! from the catalog at placement time. This module is the pure part of
//! that step: given a cart snapshot and the catalog rows for its product
//! ids, produce the order lines and the server-derived subtotal.

use std::collections::HashMap;

use rust_decimal::Decimal;

use tamarind_core::{Cart, ProductId};

use crate::models::{NewOrderItem, Product};

/// Why a cart snapshot cannot be priced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// A cart line references a product that no longer exists.
    #[error("product {0} is no longer available")]
    UnknownProduct(ProductId),
    /// A cart line references a product that has been deactivated.
    #[error("product {0} is no longer available")]
    InactiveProduct(ProductId),
}

/// A cart snapshot priced against the catalog.
#[derive(Debug, Clone)]
pub struct PricedCart {
    /// Order lines at current catalog prices.
    pub items: Vec<NewOrderItem>,
    /// Sum of `catalog price * quantity` over all lines.
    pub subtotal: Decimal,
}

/// Price a cart snapshot from authoritative catalog rows.
///
/// Quantities come from the cart; prices come from `products`. Cart line
/// prices are ignored entirely.
///
/// # Errors
///
/// Returns [`PricingError`] if any cart line's product is missing from
/// `products` or inactive.
pub fn price_cart(cart: &Cart, products: &[Product]) -> Result<PricedCart, PricingError> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(cart.lines().len());
    let mut subtotal = Decimal::ZERO;

    for line in cart.lines() {
        let product = by_id
            .get(&line.id)
            .ok_or(PricingError::UnknownProduct(line.id))?;
        if !product.active {
            return Err(PricingError::InactiveProduct(line.id));
        }

        let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
        subtotal += product.price * Decimal::from(quantity);
        items.push(NewOrderItem {
            product_id: product.id,
            quantity,
            price: product.price,
        });
    }

    Ok(PricedCart { items, subtotal })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use tamarind_core::CartLine;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn product(id: i32, price: &str, active: bool) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            slug: format!("product-{id}"),
            price: dec(price),
            image: None,
            category: None,
            brand: None,
            tags: Vec::new(),
            active,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn cart_line(id: i32, stale_price: &str, quantity: u32) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: dec(stale_price),
            image: None,
            slug: format!("product-{id}"),
            category: None,
            quantity,
        }
    }

    #[test]
    fn prices_come_from_the_catalog_not_the_cart() {
        let mut cart = Cart::new();
        // Stale snapshot claims the product costs 1; the catalog says 35.
        cart.add_line(cart_line(1, "1", 2), 2);

        let priced = price_cart(&cart, &[product(1, "35", true)]).unwrap();
        assert_eq!(priced.subtotal, dec("70"));
        assert_eq!(priced.items.len(), 1);
        assert_eq!(priced.items[0].price, dec("35"));
        assert_eq!(priced.items[0].quantity, 2);
    }

    #[test]
    fn multiple_lines_sum() {
        let mut cart = Cart::new();
        cart.add_line(cart_line(1, "0", 2), 2);
        cart.add_line(cart_line(2, "0", 3), 3);

        let priced =
            price_cart(&cart, &[product(1, "35", true), product(2, "9.99", true)]).unwrap();
        assert_eq!(priced.subtotal, dec("99.97"));
    }

    #[test]
    fn unknown_product_fails() {
        let mut cart = Cart::new();
        cart.add_line(cart_line(9, "5", 1), 1);

        assert_eq!(
            price_cart(&cart, &[]).unwrap_err(),
            PricingError::UnknownProduct(ProductId::new(9))
        );
    }

    #[test]
    fn inactive_product_fails() {
        let mut cart = Cart::new();
        cart.add_line(cart_line(1, "5", 1), 1);

        assert_eq!(
            price_cart(&cart, &[product(1, "5", false)]).unwrap_err(),
            PricingError::InactiveProduct(ProductId::new(1))
        );
    }

    #[test]
    fn empty_cart_prices_to_zero() {
        let priced = price_cart(&Cart::new(), &[]).unwrap();
        assert!(priced.items.is_empty());
        assert_eq!(priced.subtotal, Decimal::ZERO);
    }
}
