//! Cart line items and the replica merge algebra.
//!
//! A shopper's cart exists as two replicas of the same logical entity: a
//! session-held copy (always available, authoritative between syncs) and a
//! per-user copy persisted on the profile row. Both replicas are plain
//! [`Cart`] values; everything that can change one - mutations and the
//! sign-in merge - is a pure function here so it can be tested without a
//! session store or a database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// One line of a cart: a product snapshot plus a quantity.
///
/// `quantity` is always at least 1; a line that would drop below 1 is
/// removed or the mutation is ignored, never stored at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product identifier; the line's identity within a cart.
    pub id: ProductId,
    /// Product name at the time the line was added.
    pub name: String,
    /// Unit price at the time the line was added. Display only: checkout
    /// re-derives prices from the catalog and never trusts this value.
    pub price: Decimal,
    /// Product image URL, if any.
    pub image: Option<String>,
    /// Product URL slug.
    pub slug: String,
    /// Product category, if any.
    pub category: Option<String>,
    /// Number of units. Invariant: `>= 1`.
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A shopper's pending line items.
///
/// Lines are kept in insertion order. Lookup is linear; carts are tiny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The cart's lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add a product to the cart.
    ///
    /// If a line with the same product id already exists its quantity is
    /// summed with `quantity`; otherwise a new line is appended. A zero
    /// `quantity` is treated as 1 so the invariant holds.
    pub fn add_line(&mut self, line: CartLine, quantity: u32) {
        let quantity = quantity.max(1);
        match self.lines.iter_mut().find(|l| l.id == line.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(quantity);
            }
            None => {
                self.lines.push(CartLine { quantity, ..line });
            }
        }
    }

    /// Remove the line matching `id`. No-op if absent.
    pub fn remove_line(&mut self, id: ProductId) {
        self.lines.retain(|l| l.id != id);
    }

    /// Replace the quantity of the line matching `id`.
    ///
    /// Silently ignored when `quantity < 1` or when no such line exists;
    /// neither case is an error.
    pub fn set_quantity(&mut self, id: ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `price * quantity` over all lines, at the snapshot prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Merge two cart replicas after sign-in.
    ///
    /// Union on product id with remote entries taking precedence: the
    /// result carries every remote line unchanged (remote order), followed
    /// by local-only lines (local order). Quantities are never summed
    /// across replicas. Merging a cart with itself is the identity, so
    /// repeated sign-ins do not duplicate lines or inflate quantities.
    #[must_use]
    pub fn merge(local: &Self, remote: &Self) -> Self {
        let mut merged = remote.clone();
        for line in &local.lines {
            if !remote.lines.iter().any(|r| r.id == line.id) {
                merged.lines.push(line.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: &str) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            name: format!("product-{id}"),
            price: Decimal::from_str_exact(price).unwrap(),
            image: None,
            slug: format!("product-{id}"),
            category: None,
            quantity: 1,
        }
    }

    #[test]
    fn add_is_accumulative() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "35"), 2);
        cart.add_line(line(1, "35"), 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn total_items_tracks_quantities_through_any_sequence() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "10"), 2);
        cart.add_line(line(2, "5"), 1);
        cart.set_quantity(ProductId::new(1), 4);
        cart.remove_line(ProductId::new(2));
        cart.add_line(line(3, "1"), 1);
        cart.set_quantity(ProductId::new(3), 0); // ignored

        let expected: u32 = cart.lines().iter().map(|l| l.quantity).sum();
        assert_eq!(cart.total_items(), expected);
        assert_eq!(cart.total_items(), 5);
        assert!(cart.lines().iter().all(|l| l.quantity >= 1));
    }

    #[test]
    fn set_quantity_below_one_is_ignored() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "10"), 2);
        cart.set_quantity(ProductId::new(1), 0);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn add_with_zero_quantity_stores_one() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "10"), 0);
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "10"), 1);
        cart.remove_line(ProductId::new(1));
        cart.remove_line(ProductId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "35"), 2);
        cart.add_line(line(2, "9.99"), 3);
        assert_eq!(
            cart.subtotal(),
            Decimal::from_str_exact("99.97").unwrap()
        );
    }

    #[test]
    fn merge_prefers_remote_and_appends_local_only() {
        let mut local = Cart::new();
        local.add_line(line(1, "10"), 5); // also in remote, remote wins
        local.add_line(line(3, "3"), 1); // local only, appended

        let mut remote = Cart::new();
        remote.add_line(line(2, "20"), 1);
        remote.add_line(line(1, "10"), 2);

        let merged = Cart::merge(&local, &remote);
        let ids: Vec<i32> = merged.lines().iter().map(|l| l.id.get()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        // Remote quantity wins for the shared product.
        assert_eq!(merged.lines()[1].quantity, 2);
    }

    #[test]
    fn merge_is_idempotent_on_repeated_sign_in() {
        let mut local = Cart::new();
        local.add_line(line(1, "10"), 2);
        local.add_line(line(2, "4"), 1);

        let mut remote = Cart::new();
        remote.add_line(line(2, "4"), 3);

        let once = Cart::merge(&local, &remote);
        let twice = Cart::merge(&once, &once);
        assert_eq!(once, twice);
        assert_eq!(once.total_items(), twice.total_items());
    }

    #[test]
    fn merge_with_empty_remote_keeps_local() {
        let mut local = Cart::new();
        local.add_line(line(1, "10"), 2);

        let merged = Cart::merge(&local, &Cart::new());
        assert_eq!(merged, local);
    }

    #[test]
    fn serde_representation_is_a_bare_array() {
        let mut cart = Cart::new();
        cart.add_line(line(1, "10"), 2);
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
