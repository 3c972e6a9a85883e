//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//!
//! # Auth
//! POST /auth/login                 - Admin login
//! POST /auth/logout                - Admin logout
//!
//! # Dashboard
//! GET  /dashboard                  - Order counts and revenue by status
//!
//! # Orders
//! GET  /orders                     - Paginated listing (?status=&page=)
//! GET  /orders/{id}                - Detail with items
//! POST /orders/{id}/status         - Status update
//! POST /orders/{id}/archive        - Soft-remove
//! PUT  /orders/{id}                - Full edit (delete-and-reinsert items)
//!
//! # Catalog
//! GET  /products                   - All products
//! POST /products                   - Create
//! PUT  /products/{id}              - Update
//! DELETE /products/{id}            - Delete (deactivates when referenced)
//!
//! # Coupons
//! GET  /coupons                    - All coupons
//! POST /coupons                    - Create
//! PUT  /coupons/{id}               - Update
//! DELETE /coupons/{id}             - Delete
//!
//! # Shipping
//! GET  /shipping-zones             - All zones
//! POST /shipping-zones             - Create
//! PUT  /shipping-zones/{id}        - Update
//! DELETE /shipping-zones/{id}      - Delete
//!
//! # Settings
//! GET  /settings/payments          - Payment method toggles
//! PUT  /settings/payments          - Update payment toggles
//!
//! # Admin users (super_admin only)
//! GET  /admin-users                - All admin accounts
//! POST /admin-users                - Create
//! POST /admin-users/{id}/role      - Change role
//! ```

pub mod admin_users;
pub mod auth;
pub mod coupons;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod settings;
pub mod shipping;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::show))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show).put(orders::edit))
        .route("/orders/{id}/status", post(orders::update_status))
        .route("/orders/{id}/archive", post(orders::archive))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route("/coupons", get(coupons::index).post(coupons::create))
        .route("/coupons/{id}", put(coupons::update).delete(coupons::remove))
        .route(
            "/shipping-zones",
            get(shipping::index).post(shipping::create),
        )
        .route(
            "/shipping-zones/{id}",
            put(shipping::update).delete(shipping::remove),
        )
        .route(
            "/settings/payments",
            get(settings::show_payments).put(settings::update_payments),
        )
        .route(
            "/admin-users",
            get(admin_users::index).post(admin_users::create),
        )
        .route("/admin-users/{id}/role", post(admin_users::set_role))
}
