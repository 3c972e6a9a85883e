//! HTTP middleware for the admin API.

pub mod auth;
pub mod session;

pub use auth::{RequireAdmin, RequireSuperAdmin, RequireWriter, set_current_admin};
pub use session::create_session_layer;
