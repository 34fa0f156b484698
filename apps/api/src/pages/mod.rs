//! Catalogue of the tabular dashboard pages. Each page is a [`TableSpec`]
//! plus the collection it reads, the lookup it needs and the roles allowed in.

pub mod dashboards;

use std::str::FromStr;

use serde::Serialize;

use crate::backend::Collection;
use crate::errors::AppError;
use crate::session::Role;
use crate::table::metrics::ScoreBand;
use crate::table::{Column, FieldSource, FilterRule, Lookups, Predicate, Record, TableSpec};

pub const RECRUITERS: &str = "recruiters";
pub const SCORE_FIELD: &str = "ats_score";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    ManageCvs,
    ManageCandidates,
    FinalListing,
    AdminCvs,
    ManageUsers,
}

impl FromStr for Page {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manage-cvs" => Ok(Page::ManageCvs),
            "manage-candidates" => Ok(Page::ManageCandidates),
            "final-listing" => Ok(Page::FinalListing),
            "admin-cvs" => Ok(Page::AdminCvs),
            "manage-users" => Ok(Page::ManageUsers),
            other => Err(AppError::NotFound(format!("Unknown page '{other}'"))),
        }
    }
}

/// Secondary collection resolved into a lookup table for a page.
#[derive(Debug, Clone, Copy)]
pub struct LookupSource {
    pub name: &'static str,
    pub collection: Collection,
    pub name_field: &'static str,
}

const RECRUITER_LOOKUP: LookupSource = LookupSource {
    name: RECRUITERS,
    collection: Collection::Recruiters,
    name_field: "full_name",
};

fn recruiter_name() -> FieldSource {
    FieldSource::Lookup {
        field: "recruiter_id",
        table: RECRUITERS,
    }
}

fn candidate_columns() -> Vec<Column> {
    vec![
        Column::text("candidate_name"),
        Column::text("job_role_title"),
        Column::text("recruiter_id"),
        Column::numeric(SCORE_FIELD),
        Column::text("status"),
    ]
}

impl Page {
    pub fn collection(self) -> Collection {
        match self {
            Page::ManageUsers => Collection::Users,
            _ => Collection::CompanyCandidates,
        }
    }

    pub fn allowed_roles(self) -> &'static [Role] {
        match self {
            Page::ManageCvs | Page::ManageCandidates | Page::FinalListing => &[Role::HiringManager],
            Page::AdminCvs | Page::ManageUsers => &[Role::Admin],
        }
    }

    pub fn lookup(self) -> Option<LookupSource> {
        match self {
            Page::ManageCvs | Page::ManageCandidates | Page::FinalListing => Some(RECRUITER_LOOKUP),
            Page::AdminCvs | Page::ManageUsers => None,
        }
    }

    /// Page-level message shown when the primary fetch fails without a backend detail.
    pub fn fetch_error(self) -> &'static str {
        match self {
            Page::ManageCvs | Page::AdminCvs => "Failed to fetch CVs",
            Page::ManageCandidates | Page::FinalListing => "Failed to fetch candidates",
            Page::ManageUsers => "Failed to fetch users",
        }
    }

    pub fn spec(self) -> TableSpec {
        match self {
            Page::ManageCvs => TableSpec {
                filters: vec![
                    FilterRule::new("position", Predicate::Contains(FieldSource::Raw("job_role_title"))),
                    FilterRule::new("fileName", Predicate::Contains(FieldSource::Raw("candidate_name"))),
                    FilterRule::new("scoreRange", Predicate::ScoreRange(SCORE_FIELD)),
                    FilterRule::new("recruiter", Predicate::Contains(recruiter_name())),
                    FilterRule::new("status", Predicate::Exact("status")),
                ],
                columns: candidate_columns(),
                ..TableSpec::default()
            },
            Page::ManageCandidates => TableSpec {
                filters: vec![
                    FilterRule::new("name", Predicate::Contains(FieldSource::Raw("candidate_name"))),
                    FilterRule::new("position", Predicate::Contains(FieldSource::Raw("job_role_title"))),
                    FilterRule::new("scoreRange", Predicate::ScoreRange(SCORE_FIELD)),
                    FilterRule::new("recruiter", Predicate::Contains(recruiter_name())),
                    FilterRule::new("status", Predicate::Exact("status")),
                ],
                columns: candidate_columns(),
                ..TableSpec::default()
            },
            Page::FinalListing => TableSpec {
                filters: Vec::new(),
                columns: vec![
                    Column::text("candidate_name"),
                    Column::text("job_role_title"),
                    Column::text("recruiter_id"),
                    Column::numeric(SCORE_FIELD),
                ],
                scope: Some(("status", "shortlisted")),
                default_desc: Some(SCORE_FIELD),
            },
            Page::AdminCvs => TableSpec {
                filters: vec![
                    FilterRule::new("recruiter", Predicate::Contains(FieldSource::Raw("recruiter_id"))),
                    FilterRule::new("fileName", Predicate::Contains(FieldSource::Raw("cv_url"))),
                    FilterRule::new("scoreRange", Predicate::ScoreRange(SCORE_FIELD)),
                    FilterRule::new("status", Predicate::Exact("status")),
                ],
                columns: vec![
                    Column::text("id"),
                    Column::text("cv_url"),
                    Column::text("recruiter_id"),
                    Column::numeric(SCORE_FIELD),
                ],
                ..TableSpec::default()
            },
            Page::ManageUsers => TableSpec {
                filters: vec![
                    FilterRule::new("name", Predicate::Contains(FieldSource::Raw("full_name"))),
                    FilterRule::new("company", Predicate::Contains(FieldSource::Raw("company_code"))),
                    FilterRule::new("role", Predicate::Exact("role")),
                    FilterRule::new("status", Predicate::ActiveFlag("is_active")),
                ],
                columns: vec![
                    Column::text("id"),
                    Column::text("full_name"),
                    Column::text("email"),
                    Column::text("company_code"),
                    Column::text("role"),
                    Column::boolean("is_active"),
                ],
                ..TableSpec::default()
            },
        }
    }

    /// Row as rendered: the raw record plus display-only derived fields.
    pub fn decorate(self, record: &Record, lookups: &Lookups) -> ViewRow {
        match self {
            Page::ManageUsers => ViewRow::plain(record),
            _ => candidate_row(record, lookups),
        }
    }
}

/// Candidate row with its score band and the recruiter's display name
/// (raw id when the recruiter is not in the lookup).
pub fn candidate_row(record: &Record, lookups: &Lookups) -> ViewRow {
    let recruiter_name = record.text("recruiter_id").map(|id| {
        lookups
            .table(RECRUITERS)
            .map(|t| t.display(&id))
            .unwrap_or(id)
    });
    ViewRow {
        record: record.clone(),
        score_band: Some(ScoreBand::from_score(record.number(SCORE_FIELD))),
        recruiter_name,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewRow {
    #[serde(flatten)]
    pub record: Record,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_band: Option<ScoreBand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recruiter_name: Option<String>,
}

impl ViewRow {
    pub fn plain(record: &Record) -> Self {
        Self {
            record: record.clone(),
            score_band: None,
            recruiter_name: None,
        }
    }
}
