use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::Document;
use crate::errors::AppError;
use crate::models::{CandidateStatus, Decision};
use crate::pages::{Page, ViewRow};
use crate::routes::session::authorize;
use crate::session::{Role, Session};
use crate::state::AppState;
use crate::table::{FilterSet, LookupTable, Lookups, PageState, Record, SortDirection, SortDirective};

const SORT_PARAM: &str = "sort";
const DIRECTION_PARAM: &str = "direction";

/// Filters and sort directive read from the query string. Every parameter
/// other than `sort` and `direction` is a filter value.
#[derive(Debug, Default)]
pub struct ViewQuery {
    pub filters: FilterSet,
    pub sort: SortDirective,
}

impl ViewQuery {
    pub fn parse(mut params: HashMap<String, String>) -> Result<Self, AppError> {
        let direction = match params.remove(DIRECTION_PARAM).as_deref() {
            None | Some("") | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "direction must be 'asc' or 'desc', got '{other}'"
                )))
            }
        };
        let key = params.remove(SORT_PARAM).filter(|k| !k.is_empty());
        Ok(ViewQuery {
            filters: params.into_iter().collect(),
            sort: SortDirective { key, direction },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TableViewResponse {
    pub page: Page,
    pub rows: Vec<ViewRow>,
    /// Size of the fetched collection before filtering.
    pub total: usize,
    pub visible: usize,
    pub sort: SortDirective,
    /// Directive a click on each sortable column would produce.
    pub next_sort: Vec<SortDirective>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fetches a page's collection and its lookup table concurrently.
/// A failed lookup only costs display names; a failed primary fetch leaves
/// the page empty with an error string.
pub async fn load_page(state: &AppState, session: &Session, page: Page) -> PageState {
    let mut page_state = PageState::default();
    let rows_ticket = page_state.rows.begin_fetch();
    let lookup_ticket = page_state.lookups.begin_fetch();

    let lookup = async {
        match page.lookup() {
            Some(source) => Some((source, state.source.list(session, source.collection).await)),
            None => None,
        }
    };
    let (rows, lookup) = tokio::join!(state.source.list(session, page.collection()), lookup);

    match rows {
        Ok(records) => {
            page_state.rows.commit(rows_ticket, records);
        }
        Err(e) => {
            warn!("Fetching {:?} for {:?} failed: {e}", page.collection(), page);
            let message = e.detail().unwrap_or(page.fetch_error()).to_string();
            page_state.fail(rows_ticket, message);
        }
    }

    if let Some((source, result)) = lookup {
        match result {
            Ok(records) => {
                let table = LookupTable::from_records(&records, source.name_field);
                debug!("Lookup {} resolves {} names", source.name, table.len());
                page_state
                    .lookups
                    .commit(lookup_ticket, Lookups::default().with(source.name, table));
            }
            Err(e) => warn!("Lookup {} unavailable, showing raw ids: {e}", source.name),
        }
    }

    page_state
}

pub fn render(page: Page, page_state: &PageState, query: &ViewQuery) -> TableViewResponse {
    let spec = page.spec();
    let lookups = page_state.lookups.get();
    let records = page_state.records();
    let view = spec.derive(records, &query.filters, &query.sort, lookups);

    TableViewResponse {
        page,
        total: records.len(),
        visible: view.len(),
        rows: view.into_iter().map(|r| page.decorate(r, lookups)).collect(),
        sort: query.sort.clone(),
        next_sort: spec.next_directives(&query.sort),
        error: page_state.error.clone(),
    }
}

/// GET /api/v1/views/:page
pub async fn handle_get_view(
    State(state): State<AppState>,
    session: Session,
    Path(page): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TableViewResponse>, AppError> {
    let page: Page = page.parse()?;
    authorize(&state, &session, page.allowed_roles()).await?;
    let query = ViewQuery::parse(params)?;

    let page_state = load_page(&state, &session, page).await;
    Ok(Json(render(page, &page_state, &query)))
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// PATCH /api/v1/views/:page/rows/:id/status
/// Applies the status upstream, then answers with the page re-derived from a
/// fresh fetch.
pub async fn handle_update_status(
    State(state): State<AppState>,
    session: Session,
    Path((page, id)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    Json(req): Json<StatusUpdate>,
) -> Result<Json<TableViewResponse>, AppError> {
    let page: Page = page.parse()?;
    authorize(&state, &session, page.allowed_roles()).await?;
    if page == Page::ManageUsers {
        return Err(AppError::Validation(
            "User rows have no review status; use the toggle-status endpoint".to_string(),
        ));
    }
    let status: CandidateStatus = req.status.parse().map_err(AppError::Validation)?;
    let query = ViewQuery::parse(params)?;

    state.source.update_candidate_status(&session, &id, status).await?;
    info!("Candidate {id} set to {status} from {:?}", page);

    let page_state = load_page(&state, &session, page).await;
    Ok(Json(render(page, &page_state, &query)))
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// PATCH /api/v1/candidates/:id/decision
/// Select/reject from the candidate feedback page. Repeating the decision
/// already in effect moves the candidate back to pending.
pub async fn handle_candidate_decision(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Record>, AppError> {
    authorize(&state, &session, &[Role::Recruiter, Role::HiringManager]).await?;

    let candidate = state.source.document(&session, Document::Candidate(id.clone())).await?;
    let current = candidate.text("status").and_then(|s| s.parse().ok());
    let next = CandidateStatus::after(current, req.decision);

    state.source.update_candidate_status(&session, &id, next).await?;
    info!("Candidate {id} decision {:?}: now {next}", req.decision);

    let refreshed = state.source.document(&session, Document::Candidate(id)).await?;
    Ok(Json(refreshed))
}

/// PATCH /api/v1/users/:id/toggle-status
/// Answers with the refreshed manage-users view under the caller's filters.
pub async fn handle_toggle_user(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<TableViewResponse>, AppError> {
    let page = Page::ManageUsers;
    authorize(&state, &session, page.allowed_roles()).await?;
    let query = ViewQuery::parse(params)?;

    let is_active = state.source.toggle_user_status(&session, &id).await?;
    info!("User {id} is_active={is_active}");

    let page_state = load_page(&state, &session, page).await;
    Ok(Json(render(page, &page_state, &query)))
}
