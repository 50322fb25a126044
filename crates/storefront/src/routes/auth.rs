//! Authentication route handlers.
//!
//! Handles login, two-step registration (form, then emailed code), logout and
//! password-reset requests. Every backend round-trip is simulated.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use riziky_core::account::{self, PendingRegistration, RegistrationForm, UserProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::session_keys;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Verification code form data.
#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub code: String,
}

/// Forgot password form data.
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Signed-in user response.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub user: UserProfile,
    pub is_admin: bool,
}

impl SessionUser {
    pub(crate) fn new(state: &AppState, user: UserProfile) -> Self {
        let is_admin = user.is_admin(&state.config().admin_email);
        Self { user, is_admin }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn sign_in(session: &Session, user: &UserProfile) -> Result<()> {
    // Fresh session ID on privilege change
    session.cycle_id().await?;
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Sign in.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<Json<SessionUser>> {
    state.simulate_latency().await;
    let user = account::login(&form.email, &form.password)?;
    sign_in(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(SessionUser::new(&state, user)))
}

/// First registration step: validate the form and wait for the emailed code.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<RegistrationForm>,
) -> Result<Response> {
    state.simulate_latency().await;
    let pending = form.validate()?;
    session
        .insert(session_keys::PENDING_REGISTRATION, &pending)
        .await?;
    tracing::info!("Registration pending email verification");

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "email": pending.email,
            "verification_required": true,
        })),
    )
        .into_response())
}

/// Second registration step: confirm the code and sign the new user in.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<VerifyForm>,
) -> Result<Response> {
    let pending: PendingRegistration = session
        .get(session_keys::PENDING_REGISTRATION)
        .await?
        .ok_or_else(|| AppError::BadRequest("no registration awaiting verification".to_string()))?;

    state.simulate_latency().await;
    let user = pending.verify(&form.code)?;
    session
        .remove::<PendingRegistration>(session_keys::PENDING_REGISTRATION)
        .await?;
    sign_in(&session, &user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(SessionUser::new(&state, user))).into_response())
}

/// Sign out. The cart stays with the visitor; checkout and admin state go.
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    session
        .remove_value(session_keys::CHECKOUT)
        .await?;
    session
        .remove_value(session_keys::ADMIN_CATALOG)
        .await?;
    session.remove_value(session_keys::ADMIN_TABLE).await?;
    clear_sentry_user();
    tracing::info!("User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Request a password-reset email.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(form): Json<ForgotPasswordForm>,
) -> Result<Json<serde_json::Value>> {
    state.simulate_latency().await;
    let email = account::request_password_reset(&form.email)?;
    tracing::info!("Password reset requested");
    Ok(Json(json!({ "email": email, "sent": true })))
}
