use std::collections::HashMap;

use crate::table::record::Record;

/// Identifier → display name map built from a secondary collection
/// (e.g. recruiter id → recruiter full name).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupTable {
    names: HashMap<String, String>,
}

impl LookupTable {
    /// Builds the table from records keyed by `id`/`_id`. Records without a key
    /// or without a name are skipped.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>, name_field: &str) -> Self {
        let names = records
            .into_iter()
            .filter_map(|r| Some((r.key()?, r.text(name_field)?)))
            .collect();
        Self { names }
    }

    pub fn resolve(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display text for an identifier, falling back to the raw identifier.
    pub fn display(&self, id: &str) -> String {
        self.resolve(id).unwrap_or(id).to_string()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Named lookup tables available to a page derivation.
#[derive(Debug, Clone, Default)]
pub struct Lookups {
    tables: HashMap<&'static str, LookupTable>,
}

impl Lookups {
    pub fn insert(&mut self, name: &'static str, table: LookupTable) {
        self.tables.insert(name, table);
    }

    pub fn with(mut self, name: &'static str, table: LookupTable) -> Self {
        self.insert(name, table);
        self
    }

    pub fn table(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name)
    }

    /// Resolved name for `id` in table `name`, `None` when either is missing.
    pub fn resolve(&self, name: &str, id: &str) -> Option<&str> {
        self.table(name).and_then(|t| t.resolve(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::record::record;
    use serde_json::json;

    #[test]
    fn test_lookup_falls_back_to_raw_id() {
        let recruiters = vec![
            record(json!({"id": "r1", "full_name": "Dana Lee"})),
            record(json!({"_id": "r2", "full_name": "Sam Roy"})),
            record(json!({"full_name": "No Key"})),
        ];
        let table = LookupTable::from_records(&recruiters, "full_name");
        assert_eq!(table.len(), 2);
        assert_eq!(table.display("r1"), "Dana Lee");
        assert_eq!(table.display("r2"), "Sam Roy");
        assert_eq!(table.display("r9"), "r9");
    }

    #[test]
    fn test_missing_table_resolves_to_none() {
        let lookups = Lookups::default();
        assert_eq!(lookups.resolve("recruiters", "r1"), None);
    }
}
