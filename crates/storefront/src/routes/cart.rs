//! Cart route handlers.
//!
//! The session holds the local cart replica and is updated synchronously
//! on every mutation; for logged-in shoppers the remote replica write is
//! debounced through [`CartSyncer`]. Remote failures never fail these
//! handlers.
//!
//! [`CartSyncer`]: crate::services::cart::CartSyncer

use axum::{Json, extract::State, response::IntoResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::{Cart, CartLine, ProductId};

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Product};
use crate::services::cart::{save_session_cart, session_cart};
use crate::state::AppState;

/// Cart payload returned by every cart endpoint.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total_items: u32,
    pub subtotal: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().to_vec(),
            total_items: cart.total_items(),
            subtotal: cart.subtotal(),
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

/// Persist a mutated cart: session copy immediately, remote copy after the
/// debounce quiet period (logged-in shoppers only).
async fn persist(
    state: &AppState,
    session: &Session,
    user: Option<&CurrentUser>,
    cart: &Cart,
) -> Result<()> {
    save_session_cart(session, cart)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    if let Some(user) = user {
        state.cart_sync().schedule(user.id, cart.clone());
    }

    Ok(())
}

/// Show the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> impl IntoResponse {
    let cart = session_cart(&session).await;
    Json(CartView::from(&cart))
}

/// Add a product to the cart.
///
/// The line snapshot (name, price, image) is taken from the catalog at add
/// time; an unknown or inactive product is a 404.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(req): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let products = ProductRepository::new(state.pool());
    let product: Product = products
        .get_by_ids(&[req.product_id])
        .await?
        .into_iter()
        .find(|p| p.active)
        .ok_or_else(|| AppError::NotFound(format!("product {}", req.product_id)))?;

    let line = CartLine {
        id: product.id,
        name: product.name,
        price: product.price,
        image: product.image,
        slug: product.slug,
        category: product.category,
        quantity: 1,
    };

    let mut cart = session_cart(&session).await;
    cart.add_line(line, req.quantity.unwrap_or(1));
    persist(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Replace a line's quantity. Quantities below 1 are silently ignored.
#[instrument(skip(state, session, user))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session_cart(&session).await;
    cart.set_quantity(req.product_id, req.quantity);
    persist(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove a line. No error if the line is absent.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Json(req): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = session_cart(&session).await;
    cart.remove_line(req.product_id);
    persist(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Empty the cart.
#[instrument(skip(state, session, user))]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<CartView>> {
    let mut cart = session_cart(&session).await;
    cart.clear();
    persist(&state, &session, user.as_ref(), &cart).await?;

    Ok(Json(CartView::from(&cart)))
}
