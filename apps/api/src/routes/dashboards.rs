use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, warn};

use crate::backend::{BackendError, Collection, Document, Removal};
use crate::errors::AppError;
use crate::models::CandidateStatus;
use crate::pages::dashboards::{self, AdminDashboard, HiringManagerDashboard, RecruiterDashboard};
use crate::routes::session::authorize;
use crate::routes::views::StatusUpdate;
use crate::session::{Role, Session, SessionUser};
use crate::state::AppState;
use crate::table::Record;

/// Collection or empty, with the failure turned into a page-level message.
fn or_empty(result: Result<Vec<Record>, BackendError>, what: &str, error: &mut Option<String>) -> Vec<Record> {
    match result {
        Ok(records) => records,
        Err(e) => {
            warn!("Dashboard fetch of {what} failed: {e}");
            if error.is_none() {
                *error = Some(e.detail().unwrap_or("Failed to fetch metrics").to_string());
            }
            Vec::new()
        }
    }
}

/// GET /api/v1/dashboards/hiring-manager
pub async fn handle_hiring_manager(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<HiringManagerDashboard>, AppError> {
    let user = authorize(&state, &session, &[Role::HiringManager]).await?;
    Ok(Json(load_hiring_manager(&state, &session, &user).await))
}

/// DELETE /api/v1/dashboards/hiring-manager/recruiters/:id
pub async fn handle_delete_recruiter(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<HiringManagerDashboard>, AppError> {
    remove_and_reload(&state, &session, Removal::Recruiter(id)).await
}

/// DELETE /api/v1/dashboards/hiring-manager/job-roles/:id
pub async fn handle_delete_job_role(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<HiringManagerDashboard>, AppError> {
    remove_and_reload(&state, &session, Removal::JobRole(id)).await
}

async fn remove_and_reload(
    state: &AppState,
    session: &Session,
    removal: Removal,
) -> Result<Json<HiringManagerDashboard>, AppError> {
    let user = authorize(state, session, &[Role::HiringManager]).await?;
    state.source.remove(session, removal.clone()).await?;
    info!("Removed {:?}", removal);
    Ok(Json(load_hiring_manager(state, session, &user).await))
}

async fn load_hiring_manager(state: &AppState, session: &Session, user: &SessionUser) -> HiringManagerDashboard {
    let (candidates, recruiters, job_roles) = tokio::join!(
        state.source.list(&session, Collection::CompanyCandidates),
        state.source.list(&session, Collection::Recruiters),
        state.source.list(&session, Collection::JobRoles),
    );
    let mut error = None;
    let candidates = or_empty(candidates, "candidates", &mut error);
    let recruiters = or_empty(recruiters, "recruiters", &mut error);
    let job_roles = or_empty(job_roles, "job roles", &mut error);

    let mut dashboard = dashboards::hiring_manager(user, &candidates, &recruiters, &job_roles);
    dashboard.error = error;
    dashboard
}

/// GET /api/v1/dashboards/recruiter
pub async fn handle_recruiter(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<RecruiterDashboard>, AppError> {
    let user = authorize(&state, &session, &[Role::Recruiter]).await?;
    Ok(Json(load_recruiter(&state, &session, &user).await))
}

/// PATCH /api/v1/dashboards/recruiter/candidates/:id/status
/// Select/reject from the recruiter dashboard, answered with the dashboard
/// re-derived from a fresh fetch.
pub async fn handle_recruiter_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<RecruiterDashboard>, AppError> {
    let user = authorize(&state, &session, &[Role::Recruiter]).await?;
    let status: CandidateStatus = req.status.parse().map_err(AppError::Validation)?;

    state.source.update_candidate_status(&session, &id, status).await?;
    info!("Candidate {id} set to {status} from the recruiter dashboard");

    Ok(Json(load_recruiter(&state, &session, &user).await))
}

async fn load_recruiter(state: &AppState, session: &Session, user: &SessionUser) -> RecruiterDashboard {
    let mut error = None;
    let candidates = or_empty(
        state.source.list(session, Collection::RecruiterCandidates).await,
        "recruiter candidates",
        &mut error,
    );

    let mut dashboard = dashboards::recruiter(user, &candidates);
    dashboard.error = error;
    dashboard
}

/// GET /api/v1/dashboards/admin
/// Metrics and charts fail independently.
pub async fn handle_admin(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AdminDashboard>, AppError> {
    let user = authorize(&state, &session, &[Role::Admin]).await?;

    let (metrics, performance, calls) = tokio::join!(
        state.source.document(&session, Document::AdminMetrics),
        state.source.list(&session, Collection::EndpointPerformance),
        state.source.list(&session, Collection::ApiCallsOverTime),
    );

    let mut error = None;
    let metrics = match metrics {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Admin metrics unavailable: {e}");
            error = Some(e.detail().unwrap_or("Failed to fetch metrics").to_string());
            None
        }
    };
    // Both charts load together: either failing blanks the pair.
    let mut charts_error = None;
    let (performance, calls) = match (performance, calls) {
        (Ok(performance), Ok(calls)) => (performance, calls),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Admin chart data unavailable: {e}");
            charts_error = Some("Failed to fetch chart data".to_string());
            (Vec::new(), Vec::new())
        }
    };

    let mut dashboard = dashboards::admin(&user, metrics, performance, calls);
    dashboard.error = error;
    dashboard.charts_error = charts_error;
    Ok(Json(dashboard))
}
