//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Products
//! GET  /products                - Active product listing (cached)
//! GET  /products/{slug}         - Product detail
//!
//! # Cart
//! GET  /cart                    - Show cart
//! POST /cart/add                - Add product (quantities sum per product)
//! POST /cart/update             - Replace a line's quantity
//! POST /cart/remove             - Remove a line
//! POST /cart/clear              - Empty the cart
//!
//! # Coupons
//! POST /coupons/validate        - Preview a discount (never consumes usage)
//!
//! # Checkout
//! POST /checkout                - Place an order (requires auth)
//! GET  /checkout/success        - Confirm a card payment (?session_id=...)
//! GET  /checkout/cancel         - Cancelled card payment
//!
//! # Auth
//! POST /auth/register           - Register and sign in
//! POST /auth/login              - Sign in (merges cart replicas)
//! POST /auth/logout             - Sign out
//!
//! # Account (requires auth)
//! GET  /account/orders          - Order history
//! GET  /account/orders/{id}     - Order detail with items
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/success", get(checkout::confirm_payment))
        .route("/cancel", get(checkout::cancel_payment))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/coupons/validate", post(coupons::validate))
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
