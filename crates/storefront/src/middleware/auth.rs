//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in user (or the shop admin) in
//! route handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use riziky_core::account::UserProfile;
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::session_keys;
use crate::state::AppState;

/// Read the signed-in user from the request's session, if any.
async fn current_user(parts: &Parts) -> Result<Option<UserProfile>, AppError> {
    let Some(session) = parts.extensions.get::<Session>() else {
        return Err(AppError::Internal("session layer missing".to_string()));
    };
    Ok(session.get(session_keys::CURRENT_USER).await?)
}

/// Extractor that requires a signed-in user.
///
/// Rejects with `401 Unauthorized` when nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> String {
///     format!("Bonjour, {}!", user.first_name)
/// }
/// ```
pub struct RequireAuth(pub UserProfile);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("login required".to_string()))
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed in.
pub struct OptionalAuth(pub Option<UserProfile>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_user(parts).await?))
    }
}

/// Extractor that requires the configured admin account.
///
/// Rejects with `401` when signed out and `403` for any other user.
pub struct RequireAdmin(pub UserProfile);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if user.is_admin(&state.config().admin_email) {
            Ok(Self(user))
        } else {
            tracing::warn!(user_id = %user.id, "Non-admin user denied admin access");
            Err(AppError::Forbidden("admin access required".to_string()))
        }
    }
}

/// Helper to set the signed-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &UserProfile,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the signed-in user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<UserProfile>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
