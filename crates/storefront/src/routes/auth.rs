//! Authentication route handlers.
//!
//! Sign-in is also the cart reconciliation point: the session (local)
//! replica and the profile (remote) replica are merged, remote entries
//! winning, and the merged cart becomes both replicas. The merge is
//! idempotent, so repeated sign-ins neither duplicate lines nor change
//! quantities.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use tamarind_core::{Cart, Email, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::cart::CartView;
use crate::services::auth::AuthService;
use crate::services::cart::{save_session_cart, session_cart};
use crate::state::AppState;

/// Registration / login request.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Successful auth response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user_id: UserId,
    pub email: Email,
    pub cart: CartView,
}

/// Register a new shopper and sign them in.
#[instrument(skip(state, session, req))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.register(&req.email, &req.password).await?;

    sign_in(&state, &session, &user.id, &user.email).await
}

/// Login with email and password.
#[instrument(skip(state, session, req))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&req.email, &req.password).await?;

    sign_in(&state, &session, &user.id, &user.email).await
}

/// Logout. The session cart stays behind as a guest cart.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<serde_json::Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Establish the session identity and reconcile the cart replicas.
async fn sign_in(
    state: &AppState,
    session: &Session,
    user_id: &UserId,
    email: &Email,
) -> Result<Json<AuthResponse>> {
    let current = CurrentUser {
        id: *user_id,
        email: email.clone(),
    };
    set_current_user(session, &current)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    let users = UserRepository::new(state.pool());
    let local = session_cart(session).await;
    let remote = users.get_cart(*user_id).await.unwrap_or_else(|e| {
        // A fetch failure must not block sign-in; fall back to the local
        // replica and let the next sync repair the remote copy.
        tracing::warn!(user_id = %user_id, "remote cart fetch failed: {e}");
        Cart::new()
    });

    let merged = Cart::merge(&local, &remote);

    save_session_cart(session, &merged)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    // The merge result is persisted immediately, not debounced: sign-in is
    // rare and the shopper may go straight to checkout, which snapshots
    // the remote copy.
    if let Err(e) = users.save_cart(*user_id, &merged).await {
        tracing::warn!(user_id = %user_id, "remote cart sync failed: {e}");
    }

    Ok(Json(AuthResponse {
        success: true,
        user_id: *user_id,
        email: email.clone(),
        cart: CartView::from(&merged),
    }))
}
