use tracing::debug;

use crate::table::lookup::Lookups;
use crate::table::record::Record;

/// Ticket handed out when a fetch starts; only the latest ticket may commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Latest-wins holder for one piece of fetched state.
#[derive(Debug, Default)]
pub struct FetchSlot<T> {
    value: T,
    issued: u64,
}

impl<T> FetchSlot<T> {
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        FetchTicket(self.issued)
    }

    /// Replaces the held value if `ticket` is the most recent one issued.
    /// Returns false (and drops `value`) for a stale response.
    pub fn commit(&mut self, ticket: FetchTicket, value: T) -> bool {
        if ticket.0 != self.issued {
            debug!("dropping stale response (ticket {} < {})", ticket.0, self.issued);
            return false;
        }
        self.value = value;
        true
    }

    pub fn get(&self) -> &T {
        &self.value
    }
}

/// State of one page instance: its primary collection, its lookup tables and
/// the page-level error string shown instead of rows when the fetch failed.
#[derive(Debug, Default)]
pub struct PageState {
    pub rows: FetchSlot<Vec<Record>>,
    pub lookups: FetchSlot<Lookups>,
    pub error: Option<String>,
}

impl PageState {
    pub fn records(&self) -> &[Record] {
        self.rows.get()
    }

    /// Records a failed primary fetch. The collection is emptied so every
    /// derived value falls back to its empty-input result.
    pub fn fail(&mut self, ticket: FetchTicket, message: String) {
        if self.rows.commit(ticket, Vec::new()) {
            self.error = Some(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::record;
    use serde_json::json;

    #[test]
    fn test_stale_response_does_not_overwrite_newer_state() {
        let mut page = PageState::default();
        let first = page.rows.begin_fetch();
        let second = page.rows.begin_fetch();

        assert!(page.rows.commit(second, vec![record(json!({"id": "fresh"}))]));
        assert!(!page.rows.commit(first, vec![record(json!({"id": "stale"}))]));
        assert_eq!(page.records()[0].key().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_failed_fetch_empties_rows_and_sets_error() {
        let mut page = PageState::default();
        let ticket = page.rows.begin_fetch();
        page.rows.commit(ticket, vec![record(json!({"id": "1"}))]);

        let retry = page.rows.begin_fetch();
        page.fail(retry, "Failed to fetch candidates".to_string());
        assert!(page.records().is_empty());
        assert_eq!(page.error.as_deref(), Some("Failed to fetch candidates"));
    }

    #[test]
    fn test_stale_failure_is_ignored() {
        let mut page = PageState::default();
        let old = page.rows.begin_fetch();
        let new = page.rows.begin_fetch();
        page.rows.commit(new, vec![record(json!({"id": "1"}))]);
        page.fail(old, "late error".to_string());
        assert_eq!(page.records().len(), 1);
        assert!(page.error.is_none());
    }
}
