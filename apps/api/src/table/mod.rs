//! Table view engine: filter predicates, comparator sorting and derived
//! metrics over loosely typed backend records.

pub mod filter;
pub mod lookup;
pub mod metrics;
pub mod page;
pub mod record;
pub mod sort;
pub mod view;

pub use filter::{FieldSource, FilterRule, FilterSet, Predicate};
pub use lookup::{LookupTable, Lookups};
pub use page::PageState;
pub use record::Record;
pub use sort::{Column, SortDirection, SortDirective};
pub use view::TableSpec;
