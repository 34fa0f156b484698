use tracing::debug;

use crate::table::filter::{self, FilterRule, FilterSet};
use crate::table::lookup::Lookups;
use crate::table::record::Record;
use crate::table::sort::{sort_view, Column, SortDirection, SortDirective};

/// Parametrised description of one tabular page: which filters it offers,
/// which columns can be sorted and how rows are ordered by default.
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    pub filters: Vec<FilterRule>,
    pub columns: Vec<Column>,
    /// Fixed `(field, value)` constraint applied before any user filter.
    pub scope: Option<(&'static str, &'static str)>,
    /// Numeric field sorted descending when no key is selected, and also when
    /// that same field is selected (direction is then ignored).
    pub default_desc: Option<&'static str>,
}

impl TableSpec {
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn in_scope(&self, record: &Record) -> bool {
        match self.scope {
            Some((field, value)) => record
                .text(field)
                .map(|v| v.eq_ignore_ascii_case(value))
                .unwrap_or(false),
            None => true,
        }
    }

    /// Filtered, ordered view of `records`.
    pub fn derive<'a>(
        &self,
        records: &'a [Record],
        filters: &FilterSet,
        sort: &SortDirective,
        lookups: &Lookups,
    ) -> Vec<&'a Record> {
        let mut view: Vec<&Record> = filter::apply(records, &self.filters, filters, lookups)
            .into_iter()
            .filter(|r| self.in_scope(r))
            .collect();

        match (sort.key.as_deref(), self.default_desc) {
            (None, Some(field)) => sort_view(&mut view, &Column::numeric(field), SortDirection::Desc),
            (Some(key), Some(field)) if key == field => {
                sort_view(&mut view, &Column::numeric(field), SortDirection::Desc)
            }
            (Some(key), _) => match self.column(key) {
                Some(column) => sort_view(&mut view, column, sort.direction),
                None => debug!("ignoring sort on non-sortable column '{key}'"),
            },
            (None, None) => {}
        }

        view
    }

    /// Directive each sortable column would produce if selected next.
    pub fn next_directives(&self, current: &SortDirective) -> Vec<SortDirective> {
        self.columns.iter().map(|c| current.toggle(c.key)).collect()
    }
}
