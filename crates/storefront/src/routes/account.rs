//! Account route handlers (all require a signed-in user).

use axum::{Json, extract::State, http::StatusCode};
use riziky_core::account::{self, OrderHistoryEntry, PasswordChange, ProfileUpdate};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::middleware::{RequireAuth, set_current_user};
use crate::routes::auth::SessionUser;
use crate::state::AppState;

/// Profile overview.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Json<SessionUser> {
    Json(SessionUser::new(&state, user))
}

/// Edit personal information.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(mut user): RequireAuth,
    session: Session,
    Json(form): Json<ProfileUpdate>,
) -> Result<Json<SessionUser>> {
    user.apply_update(form)?;
    set_current_user(&session, &user).await?;
    tracing::info!("Profile updated");
    Ok(Json(SessionUser::new(&state, user)))
}

/// Change password.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(form): Json<PasswordChange>,
) -> Result<StatusCode> {
    form.validate()?;
    state.simulate_latency().await;
    tracing::info!("Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Order history.
pub async fn orders(RequireAuth(_user): RequireAuth) -> Json<Vec<OrderHistoryEntry>> {
    Json(account::order_history())
}
