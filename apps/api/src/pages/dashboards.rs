//! Landing dashboards of each role, derived from freshly fetched collections.

use serde::Serialize;
use serde_json::Value;

use crate::pages::{candidate_row, ViewRow, RECRUITERS, SCORE_FIELD};
use crate::session::SessionUser;
use crate::table::metrics::{
    average_of, count_status, max_of, most_frequent, most_recent, recruiter_accuracy, top_n,
    lowest_shortlisting_role,
};
use crate::table::{LookupTable, Lookups, Record};

const NO_APPLICATIONS: &str = "No applications yet";
const NOT_AVAILABLE: &str = "N/A";

fn greeting(user: &SessionUser, fallback: &str) -> String {
    user.full_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Percentage as the backend prints floats: `75.0`, `66.67`.
fn percent(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Recruiter record with stat defaults filled in and `accuracy` computed.
pub fn with_recruiter_stats(recruiter: &Record) -> Record {
    let mut out = recruiter.clone();
    for field in ["uploaded_cvs", "selected_candidates", "shortlisted_candidates"] {
        if !out.is_present(field) {
            out.set(field, Value::from(0));
        }
    }
    if !out.is_present("status") {
        out.set("status", Value::from("Active"));
    }
    let accuracy = recruiter_accuracy(
        out.number("selected_candidates"),
        out.number("shortlisted_candidates"),
    );
    out.set("accuracy", Value::from(accuracy));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HiringManagerMetrics {
    pub most_applied_role: String,
    pub avg_fit_score: f64,
    pub total_candidates: usize,
    pub top_recruiter: String,
    pub lowest_shortlisting: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HiringManagerDashboard {
    pub greeting: String,
    pub metrics: HiringManagerMetrics,
    /// Three job roles with the most applications.
    pub top_job_roles: Vec<Record>,
    /// First three job roles as listed by the backend, plus the full count.
    pub job_roles: Vec<Record>,
    pub total_job_roles: usize,
    pub recruiters: Vec<Record>,
    /// Selected and shortlisted candidates, best score first.
    pub candidate_summary: Vec<ViewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn hiring_manager_metrics(
    candidates: &[Record],
    recruiters: &[Record],
    job_roles: &[Record],
) -> HiringManagerMetrics {
    if candidates.is_empty() {
        return HiringManagerMetrics {
            most_applied_role: NO_APPLICATIONS.to_string(),
            avg_fit_score: 0.0,
            total_candidates: 0,
            top_recruiter: NOT_AVAILABLE.to_string(),
            lowest_shortlisting: NOT_AVAILABLE.to_string(),
        };
    }

    let with_stats: Vec<Record> = recruiters.iter().map(with_recruiter_stats).collect();
    let top_recruiter = top_n(&with_stats, "accuracy", 1)
        .first()
        .map(|r| {
            format!(
                "{} ({}%)",
                r.text("full_name").unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                percent(r.number("accuracy"))
            )
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    HiringManagerMetrics {
        most_applied_role: most_frequent(candidates, "job_role_title", "Unknown")
            .unwrap_or_else(|| NO_APPLICATIONS.to_string()),
        avg_fit_score: average_of(candidates, SCORE_FIELD),
        total_candidates: candidates.len(),
        top_recruiter,
        lowest_shortlisting: lowest_shortlisting_role(job_roles, candidates)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

pub fn hiring_manager(
    user: &SessionUser,
    candidates: &[Record],
    recruiters: &[Record],
    job_roles: &[Record],
) -> HiringManagerDashboard {
    let lookups = Lookups::default().with(RECRUITERS, LookupTable::from_records(recruiters, "full_name"));
    let summary = candidates.iter().filter(|c| {
        matches!(c.text("status").as_deref(), Some("selected") | Some("shortlisted"))
    });

    HiringManagerDashboard {
        greeting: greeting(user, "Manager"),
        metrics: hiring_manager_metrics(candidates, recruiters, job_roles),
        top_job_roles: top_n(job_roles, "applications_count", 3).into_iter().cloned().collect(),
        job_roles: job_roles.iter().take(3).cloned().collect(),
        total_job_roles: job_roles.len(),
        recruiters: recruiters.iter().map(with_recruiter_stats).collect(),
        candidate_summary: top_n(summary, SCORE_FIELD, usize::MAX)
            .into_iter()
            .map(|c| candidate_row(c, &lookups))
            .collect(),
        error: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterMetrics {
    pub most_applied_role: String,
    pub avg_fit_score: f64,
    #[serde(rename = "totalCVs")]
    pub total_cvs: usize,
    pub rejected: usize,
    pub shortlisted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruiterDashboard {
    pub greeting: String,
    pub metrics: RecruiterMetrics,
    /// Five most recently uploaded candidates.
    pub recent_candidates: Vec<ViewRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn recruiter_metrics(candidates: &[Record]) -> RecruiterMetrics {
    RecruiterMetrics {
        most_applied_role: most_frequent(candidates, "job_role_title", "Unknown")
            .unwrap_or_else(|| NO_APPLICATIONS.to_string()),
        avg_fit_score: average_of(candidates, SCORE_FIELD),
        total_cvs: candidates.len(),
        rejected: count_status(candidates, "status", "rejected"),
        shortlisted: count_status(candidates, "status", "shortlisted"),
    }
}

pub fn recruiter(user: &SessionUser, candidates: &[Record]) -> RecruiterDashboard {
    let lookups = Lookups::default();
    RecruiterDashboard {
        greeting: greeting(user, "Recruiter"),
        metrics: recruiter_metrics(candidates),
        recent_candidates: most_recent(candidates, "created_at", 5)
            .into_iter()
            .map(|c| candidate_row(c, &lookups))
            .collect(),
        error: None,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub greeting: String,
    pub metrics: Option<Record>,
    pub endpoint_performance: Vec<Record>,
    pub api_calls_over_time: Vec<Record>,
    /// Slowest recorded response over all endpoints, `None` without data.
    pub max_response_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts_error: Option<String>,
}

pub fn admin(
    user: &SessionUser,
    metrics: Option<Record>,
    endpoint_performance: Vec<Record>,
    api_calls_over_time: Vec<Record>,
) -> AdminDashboard {
    AdminDashboard {
        greeting: greeting(user, "Admin"),
        max_response_time: max_of(&endpoint_performance, "max"),
        metrics,
        endpoint_performance,
        api_calls_over_time,
        error: None,
        charts_error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::table::record::record;
    use serde_json::json;

    fn manager() -> SessionUser {
        SessionUser {
            full_name: None,
            role: Role::HiringManager,
            is_active: true,
        }
    }

    fn candidates() -> Vec<Record> {
        vec![
            record(json!({"id": "c1", "job_role_id": "j1", "job_role_title": "Backend", "ats_score": 80, "status": "shortlisted", "recruiter_id": "r1", "created_at": "2024-05-01T09:00:00"})),
            record(json!({"id": "c2", "job_role_id": "j1", "job_role_title": "Backend", "ats_score": 60, "status": "rejected", "recruiter_id": "r1", "created_at": "2024-05-03T09:00:00"})),
            record(json!({"id": "c3", "job_role_id": "j2", "job_role_title": "Data", "ats_score": 91, "status": "selected", "recruiter_id": "r2", "created_at": "2024-05-02T09:00:00"})),
            record(json!({"id": "c4", "job_role_id": "j2", "job_role_title": "Data", "status": "pending", "recruiter_id": "r3"})),
        ]
    }

    fn recruiters() -> Vec<Record> {
        vec![
            record(json!({"id": "r1", "full_name": "Dana Lee", "selected_candidates": 1, "shortlisted_candidates": 4})),
            record(json!({"id": "r2", "full_name": "Sam Roy", "selected_candidates": 3, "shortlisted_candidates": 4})),
        ]
    }

    fn job_roles() -> Vec<Record> {
        vec![
            record(json!({"id": "j1", "title": "Backend", "applications_count": 2})),
            record(json!({"id": "j2", "title": "Data", "applications_count": 5})),
            record(json!({"id": "j3", "title": "Design"})),
            record(json!({"id": "j4", "title": "Ops", "applications_count": 1})),
        ]
    }

    #[test]
    fn test_recruiter_stats_defaults() {
        let r = with_recruiter_stats(&record(json!({"id": "r9"})));
        assert_eq!(r.number("uploaded_cvs"), 0.0);
        assert_eq!(r.number("accuracy"), 0.0);
        assert_eq!(r.text("status").as_deref(), Some("Active"));
    }

    #[test]
    fn test_hiring_manager_metrics() {
        let m = hiring_manager_metrics(&candidates(), &recruiters(), &job_roles());
        assert_eq!(m.most_applied_role, "Backend");
        assert_eq!(m.avg_fit_score, 77.0);
        assert_eq!(m.total_candidates, 4);
        assert_eq!(m.top_recruiter, "Sam Roy (75.0%)");
        assert_eq!(m.lowest_shortlisting, "Data");
    }

    #[test]
    fn test_accuracy_keeps_one_decimal() {
        assert_eq!(percent(75.0), "75.0");
        assert_eq!(percent(66.67), "66.67");
        assert_eq!(percent(0.0), "0.0");
    }

    #[test]
    fn test_hiring_manager_metrics_without_candidates() {
        let m = hiring_manager_metrics(&[], &recruiters(), &job_roles());
        assert_eq!(m.most_applied_role, NO_APPLICATIONS);
        assert_eq!(m.top_recruiter, NOT_AVAILABLE);
        assert_eq!(m.lowest_shortlisting, NOT_AVAILABLE);
    }

    #[test]
    fn test_hiring_manager_dashboard_sections() {
        let d = hiring_manager(&manager(), &candidates(), &recruiters(), &job_roles());
        assert_eq!(d.greeting, "Manager");
        let top: Vec<String> = d.top_job_roles.iter().filter_map(|r| r.key()).collect();
        assert_eq!(top, vec!["j2", "j1", "j4"]);
        assert_eq!(d.job_roles.len(), 3);
        assert_eq!(d.total_job_roles, 4);
        let summary: Vec<String> = d.candidate_summary.iter().filter_map(|r| r.record.key()).collect();
        assert_eq!(summary, vec!["c3", "c1"]);
        assert_eq!(d.candidate_summary[0].recruiter_name.as_deref(), Some("Sam Roy"));
    }

    #[test]
    fn test_recruiter_dashboard() {
        let user = SessionUser {
            full_name: Some("Rita".to_string()),
            role: Role::Recruiter,
            is_active: true,
        };
        let d = recruiter(&user, &candidates());
        assert_eq!(d.greeting, "Rita");
        assert_eq!(d.metrics.total_cvs, 4);
        assert_eq!(d.metrics.rejected, 1);
        assert_eq!(d.metrics.shortlisted, 1);
        let recent: Vec<String> = d.recent_candidates.iter().filter_map(|r| r.record.key()).collect();
        assert_eq!(recent, vec!["c2", "c3", "c1", "c4"]);

        let json = serde_json::to_value(&d.metrics).unwrap();
        assert_eq!(json["totalCVs"], 4);
        assert_eq!(json["mostAppliedRole"], "Backend");
    }

    #[test]
    fn test_recruiter_dashboard_empty() {
        let m = recruiter_metrics(&[]);
        assert_eq!(m.most_applied_role, NO_APPLICATIONS);
        assert_eq!(m.avg_fit_score, 0.0);
        assert_eq!(m.total_cvs, 0);
    }

    #[test]
    fn test_admin_max_response_time() {
        let user = SessionUser {
            full_name: Some(String::new()),
            role: Role::Admin,
            is_active: true,
        };
        let perf = vec![
            record(json!({"endpoint": "/a", "avg": 0.2, "max": 0.9})),
            record(json!({"endpoint": "/b", "avg": 0.4, "max": 1.7})),
        ];
        let calls = vec![record(json!({"date": "2024-05-01", "calls": 40}))];
        let d = admin(&user, None, perf, calls);
        assert_eq!(d.greeting, "Admin");
        assert_eq!(d.max_response_time, Some(1.7));
        assert_eq!(d.api_calls_over_time.len(), 1);
        assert_eq!(admin(&user, None, Vec::new(), Vec::new()).max_response_time, None);
    }
}
