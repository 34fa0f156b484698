//! Summary values derived from record collections for dashboard cards.
//!
//! Everything here is a pure function of its inputs. Absent numeric fields
//! count as 0 and an empty collection yields zero, `None` or an empty list.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::table::record::Record;
use crate::table::sort::{sort_view, Column, SortDirection};

/// Number of records matching `predicate`.
pub fn count_where<'a, I, P>(records: I, predicate: P) -> usize
where
    I: IntoIterator<Item = &'a Record>,
    P: Fn(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(r)).count()
}

/// Number of records whose `field` equals `value` exactly.
pub fn count_status<'a>(records: impl IntoIterator<Item = &'a Record>, field: &str, value: &str) -> usize {
    count_where(records, |r| r.text(field).as_deref() == Some(value))
}

/// Largest value of a numeric field, `None` for an empty collection.
/// Unparsable values count as 0.
pub fn max_of<'a>(records: impl IntoIterator<Item = &'a Record>, field: &str) -> Option<f64> {
    records
        .into_iter()
        .map(|r| r.number(field))
        .map(|x| if x.is_nan() { 0.0 } else { x })
        .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |m| m.max(x))))
}

/// First `n` records by a numeric field, highest first. Ties keep collection order.
pub fn top_n<'a>(records: impl IntoIterator<Item = &'a Record>, field: &'static str, n: usize) -> Vec<&'a Record> {
    let mut view: Vec<&Record> = records.into_iter().collect();
    sort_view(&mut view, &Column::numeric(field), SortDirection::Desc);
    view.truncate(n);
    view
}

/// Mean of the records that carry a usable `field`, rounded to one decimal.
/// Unparsable values are skipped like absent ones. 0 when none remain.
pub fn average_of<'a>(records: impl IntoIterator<Item = &'a Record>, field: &str) -> f64 {
    let scores: Vec<f64> = records
        .into_iter()
        .filter(|r| r.is_present(field))
        .map(|r| r.number(field))
        .filter(|s| !s.is_nan())
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Most frequent value of `field`. Records without the field count as
/// `fallback`. Ties go to the value seen first.
pub fn most_frequent<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    field: &str,
    fallback: &str,
) -> Option<String> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let value = record.text(field).unwrap_or_else(|| fallback.to_string());
        let count = counts.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }
    let mut best: Option<(&String, usize)> = None;
    for value in &order {
        let count = counts[value];
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.clone())
}

/// Parses backend timestamps: RFC 3339, or naive ISO 8601 taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// `n` most recent records by a timestamp field. Unparsable timestamps sort last.
pub fn most_recent<'a>(records: impl IntoIterator<Item = &'a Record>, field: &str, n: usize) -> Vec<&'a Record> {
    let mut view: Vec<(&Record, Option<DateTime<Utc>>)> = records
        .into_iter()
        .map(|r| (r, r.text(field).as_deref().and_then(parse_timestamp)))
        .collect();
    view.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    view.into_iter().take(n).map(|(r, _)| r).collect()
}

/// Display band of an ATS score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Weak,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => ScoreBand::Excellent,
            s if s >= 70.0 => ScoreBand::Good,
            s if s >= 50.0 => ScoreBand::Fair,
            s if s >= 30.0 => ScoreBand::Weak,
            _ => ScoreBand::Poor,
        }
    }
}

/// Selected-to-shortlisted ratio as a percentage with two decimals.
pub fn recruiter_accuracy(selected: f64, shortlisted: f64) -> f64 {
    if shortlisted > 0.0 {
        ((selected / shortlisted) * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Title of the job role with the lowest shortlisted share among roles that
/// received at least one candidate. Ties go to the earlier role.
pub fn lowest_shortlisting_role(job_roles: &[Record], candidates: &[Record]) -> Option<String> {
    let mut lowest: Option<(String, f64)> = None;
    for role in job_roles {
        let Some(role_id) = role.key() else { continue };
        let applied: Vec<&Record> = candidates
            .iter()
            .filter(|c| c.text("job_role_id").as_deref() == Some(role_id.as_str()))
            .collect();
        if applied.is_empty() {
            continue;
        }
        let shortlisted = count_status(applied.iter().copied(), "status", "shortlisted");
        let rate = shortlisted as f64 / applied.len() as f64;
        if lowest.as_ref().map_or(true, |(_, r)| rate < *r) {
            let title = role.text("title").unwrap_or_else(|| "Unknown".to_string());
            lowest = Some((title, rate));
        }
    }
    lowest.map(|(title, _)| title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::record;
    use serde_json::json;

    #[test]
    fn test_empty_collection_aggregates() {
        let empty: Vec<Record> = Vec::new();
        assert_eq!(count_status(&empty, "status", "shortlisted"), 0);
        assert_eq!(max_of(&empty, "max"), None);
        assert!(top_n(&empty, "ats_score", 3).is_empty());
        assert_eq!(average_of(&empty, "ats_score"), 0.0);
        assert_eq!(most_frequent(&empty, "job_role_title", "Unknown"), None);
    }

    #[test]
    fn test_max_defaults_absent_to_zero() {
        let rows = vec![
            record(json!({"endpoint": "/a", "max": 1.25})),
            record(json!({"endpoint": "/b"})),
            record(json!({"endpoint": "/c", "max": "3.5"})),
        ];
        assert_eq!(max_of(&rows, "max"), Some(3.5));
        let absent = vec![record(json!({"endpoint": "/b"}))];
        assert_eq!(max_of(&absent, "max"), Some(0.0));
        let junk = vec![record(json!({"max": "slow"}))];
        assert_eq!(max_of(&junk, "max"), Some(0.0));
    }

    #[test]
    fn test_top_n_is_stable_and_bounded() {
        let rows = vec![
            record(json!({"id": "a", "ats_score": 50})),
            record(json!({"id": "b", "ats_score": 90})),
            record(json!({"id": "c", "ats_score": "90"})),
            record(json!({"id": "d"})),
        ];
        let top: Vec<String> = top_n(&rows, "ats_score", 3).iter().filter_map(|r| r.key()).collect();
        assert_eq!(top, vec!["b", "c", "a"]);
        let all: Vec<String> = top_n(&rows, "ats_score", 10).iter().filter_map(|r| r.key()).collect();
        assert_eq!(all, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_average_skips_missing_scores() {
        let rows = vec![
            record(json!({"ats_score": 70})),
            record(json!({"ats_score": 81})),
            record(json!({"ats_score": null})),
            record(json!({})),
        ];
        assert_eq!(average_of(&rows, "ats_score"), 75.5);
    }

    #[test]
    fn test_average_skips_unparsable_scores() {
        let rows = vec![record(json!({"ats_score": 70})), record(json!({"ats_score": "n/a"}))];
        let avg = average_of(&rows, "ats_score");
        assert_eq!(avg, 70.0);
        assert_eq!(serde_json::to_value(avg).unwrap(), json!(70.0));

        let junk = vec![record(json!({"ats_score": "n/a"}))];
        assert_eq!(average_of(&junk, "ats_score"), 0.0);
    }

    #[test]
    fn test_most_frequent_first_wins_ties() {
        let rows = vec![
            record(json!({"job_role_title": "Backend"})),
            record(json!({"job_role_title": "Data"})),
            record(json!({"job_role_title": "Data"})),
            record(json!({"job_role_title": "Backend"})),
            record(json!({})),
        ];
        assert_eq!(most_frequent(&rows, "job_role_title", "Unknown").as_deref(), Some("Backend"));
    }

    #[test]
    fn test_most_recent_orders_by_timestamp() {
        let rows = vec![
            record(json!({"id": "old", "created_at": "2024-01-01T10:00:00"})),
            record(json!({"id": "bad", "created_at": "yesterday"})),
            record(json!({"id": "new", "created_at": "2024-03-01T10:00:00.123456"})),
            record(json!({"id": "mid", "created_at": "2024-02-01T10:00:00Z"})),
        ];
        let recent: Vec<String> = most_recent(&rows, "created_at", 3).iter().filter_map(|r| r.key()).collect();
        assert_eq!(recent, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(95.0), ScoreBand::Excellent);
        assert_eq!(ScoreBand::from_score(70.0), ScoreBand::Good);
        assert_eq!(ScoreBand::from_score(69.9), ScoreBand::Fair);
        assert_eq!(ScoreBand::from_score(30.0), ScoreBand::Weak);
        assert_eq!(ScoreBand::from_score(f64::NAN), ScoreBand::Poor);
    }

    #[test]
    fn test_recruiter_accuracy() {
        assert_eq!(recruiter_accuracy(2.0, 3.0), 66.67);
        assert_eq!(recruiter_accuracy(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_lowest_shortlisting_role() {
        let roles = vec![
            record(json!({"id": "j1", "title": "Backend"})),
            record(json!({"id": "j2", "title": "Data"})),
            record(json!({"id": "j3", "title": "Empty"})),
        ];
        let candidates = vec![
            record(json!({"job_role_id": "j1", "status": "shortlisted"})),
            record(json!({"job_role_id": "j1", "status": "pending"})),
            record(json!({"job_role_id": "j2", "status": "rejected"})),
        ];
        assert_eq!(lowest_shortlisting_role(&roles, &candidates).as_deref(), Some("Data"));
        assert_eq!(lowest_shortlisting_role(&roles, &[]), None);
    }
}
