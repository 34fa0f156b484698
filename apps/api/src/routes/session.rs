use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::session::{Role, Session, SessionUser};
use crate::state::AppState;

/// Resolves the caller and applies the role gate. A wrong role or a disabled
/// account becomes `AppError::Redirect` to where the user belongs.
pub async fn authorize(state: &AppState, session: &Session, allowed: &[Role]) -> Result<SessionUser, AppError> {
    let user = state.source.current_user(session).await?;
    user.gate(allowed).map_err(AppError::Redirect)?;
    Ok(user)
}

#[derive(Serialize)]
pub struct LandingResponse {
    pub user: SessionUser,
    pub landing: &'static str,
}

/// GET /api/v1/session/landing
pub async fn handle_landing(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<LandingResponse>, AppError> {
    let user = state.source.current_user(&session).await?;
    let landing = user.landing_page();
    Ok(Json(LandingResponse { user, landing }))
}
