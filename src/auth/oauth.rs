//! OAuth login flow
//!
//! Implements the OAuth 2.0 authorization code flow against the
//! configured provider. On first login the user row is created by
//! upsert, keyed on the provider-prefixed subject id.

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    routing::get,
};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::Cookie;
use rand::{Rng, distributions::Alphanumeric};
use serde::Deserialize;

use super::session::{Session, create_session_token};
use crate::AppState;
use crate::data::User;
use crate::error::AppError;

const STATE_COOKIE: &str = "oauth_state";
const SESSION_COOKIE: &str = "session";

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - GET /auth/login - Redirect to the provider
/// - GET /auth/callback - OAuth callback
/// - POST /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/auth/login", get(provider_redirect))
        .route("/auth/callback", get(provider_callback))
        .route("/logout", axum::routing::post(logout))
}

// =============================================================================
// Login Page
// =============================================================================

/// GET /login
///
/// Renders a simple login page with a sign-in link.
async fn login_page() -> impl IntoResponse {
    Html(
        r#"
        <!DOCTYPE html>
        <html>
        <head><title>Login - Mikromatter</title></head>
        <body>
            <h1>Mikromatter</h1>
            <p>Please sign in to continue</p>
            <a href="/auth/login">Sign in</a>
        </body>
        </html>
    "#,
    )
}

// =============================================================================
// Provider flow
// =============================================================================

/// GET /auth/login
///
/// Redirects the browser to the provider's authorization page.
///
/// # Steps
/// 1. Generate CSRF state token
/// 2. Store state in cookie
/// 3. Redirect with client_id, redirect_uri, scope, state
async fn provider_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let provider = &state.config.auth.provider;
    let csrf_state = generate_csrf_state();

    let mut authorize_url = url::Url::parse(&provider.authorize_url)
        .map_err(|e| AppError::Config(format!("invalid authorize_url: {}", e)))?;
    authorize_url
        .query_pairs_mut()
        .append_pair("client_id", &provider.client_id)
        .append_pair("redirect_uri", &callback_url(&state))
        .append_pair("response_type", "code")
        .append_pair("scope", &provider.scope)
        .append_pair("state", &csrf_state);

    let cookie = Cookie::build((STATE_COOKIE, csrf_state))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .build();

    Ok((jar.add(cookie), Redirect::to(authorize_url.as_str())))
}

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code
    code: String,
    /// CSRF state token
    state: String,
}

/// Provider token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OpenID-style profile claims from the userinfo endpoint
#[derive(Debug, Deserialize)]
struct ProviderUser {
    sub: String,
    email: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
    bio: Option<String>,
    location: Option<String>,
}

/// GET /auth/callback
///
/// Handles the OAuth callback from the provider.
///
/// # Steps
/// 1. Verify CSRF state
/// 2. Exchange code for access token
/// 3. Fetch profile claims from the userinfo endpoint
/// 4. Upsert the user (id = "{provider}:{sub}")
/// 5. Create session and set cookie
/// 6. Redirect to home
async fn provider_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    verify_csrf_state(&query.state, &jar)?;

    let provider = &state.config.auth.provider;

    // Exchange the code for an access token
    let token: TokenResponse = state
        .http_client
        .post(&provider.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", query.code.as_str()),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
            ("redirect_uri", callback_url(&state).as_str()),
        ])
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Fetch the profile claims
    let profile: ProviderUser = state
        .http_client
        .get(&provider.userinfo_url)
        .bearer_auth(&token.access_token)
        .header("Accept", "application/json")
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // Upsert the user by provider-prefixed id
    let now = chrono::Utc::now();
    let user = state
        .db
        .upsert_user(&User {
            id: format!("{}:{}", provider.name, profile.sub),
            email: profile.email,
            first_name: profile.given_name,
            last_name: profile.family_name,
            profile_image_url: profile.picture,
            bio: profile.bio,
            location: profile.location,
            created_at: now,
            updated_at: now,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    // Issue the session cookie
    let session = Session::for_user(&user.id, state.config.auth.session_max_age);
    let token = create_session_token(&session, &state.config.auth.session_secret)?;

    let session_cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .build();

    let jar = jar.remove(Cookie::from(STATE_COOKIE)).add(session_cookie);
    Ok((jar, Redirect::to("/")))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Clears the session cookie and redirects to login.
async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, Redirect::to("/login"))
}

// =============================================================================
// Helpers
// =============================================================================

fn callback_url(state: &AppState) -> String {
    format!(
        "{}/auth/callback",
        state.config.server.base_url().trim_end_matches('/')
    )
}

/// Generate a random CSRF state token
fn generate_csrf_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Verify CSRF state from cookie matches callback state
fn verify_csrf_state(state: &str, jar: &CookieJar) -> Result<(), AppError> {
    let stored = jar.get(STATE_COOKIE).ok_or(AppError::Unauthorized)?;
    if stored.value() != state {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
