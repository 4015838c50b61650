//! OAuth authentication
//!
//! Handles:
//! - Provider-agnostic OAuth 2.0 authorization code flow
//! - Stateless HMAC-signed session tokens
//! - Authentication extractor for API handlers

mod middleware;
mod oauth;
pub mod session;

pub use middleware::CurrentUser;
pub use oauth::auth_router;
pub use session::{Session, create_session_token, verify_session_token};
