pub mod dashboards;
pub mod health;
pub mod session;
pub mod views;

use axum::{
    routing::{delete, get, patch},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session/landing", get(session::handle_landing))
        // Tabular pages
        .route("/api/v1/views/:page", get(views::handle_get_view))
        .route(
            "/api/v1/views/:page/rows/:id/status",
            patch(views::handle_update_status),
        )
        .route(
            "/api/v1/candidates/:id/decision",
            patch(views::handle_candidate_decision),
        )
        .route(
            "/api/v1/users/:id/toggle-status",
            patch(views::handle_toggle_user),
        )
        // Role dashboards
        .route(
            "/api/v1/dashboards/hiring-manager",
            get(dashboards::handle_hiring_manager),
        )
        .route(
            "/api/v1/dashboards/hiring-manager/recruiters/:id",
            delete(dashboards::handle_delete_recruiter),
        )
        .route(
            "/api/v1/dashboards/hiring-manager/job-roles/:id",
            delete(dashboards::handle_delete_job_role),
        )
        .route("/api/v1/dashboards/recruiter", get(dashboards::handle_recruiter))
        .route(
            "/api/v1/dashboards/recruiter/candidates/:id/status",
            patch(dashboards::handle_recruiter_status),
        )
        .route("/api/v1/dashboards/admin", get(dashboards::handle_admin))
        .with_state(state)
}
