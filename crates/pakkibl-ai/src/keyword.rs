//! Keyword-match classification.
//!
//! Walks the ordered [`CategoryTable`] and returns the entry for the first
//! keyword found as a substring of the lowercased query. Substring matching
//! is literal: "hacked my account" does not match "cyber".

use pakkibl_core::{
    CategoryTable, ClassificationResult, LegalEntry, Outcome, QueryError, normalize_query,
    validate_query,
};

use crate::classifier::CategoryClassifier;

pub struct KeywordClassifier {
    table: CategoryTable,
}

impl KeywordClassifier {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    /// Find the first entry whose keyword occurs in the query.
    ///
    /// `Ok(None)` means no keyword matched.
    pub fn lookup(&self, query: &str) -> Result<Option<(&str, &LegalEntry)>, QueryError> {
        let query = normalize_query(validate_query(query)?);
        Ok(self
            .table
            .iter()
            .find(|(keyword, _)| query.contains(keyword)))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(CategoryTable::builtin())
    }
}

impl CategoryClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn classify(&self, query: &str) -> Result<Outcome, QueryError> {
        Ok(match self.lookup(query)? {
            Some((_, entry)) => Outcome::Matched(ClassificationResult::certain(&entry.category)),
            None => Outcome::NoMatch,
        })
    }

    fn entry_for(&self, query: &str) -> Option<&LegalEntry> {
        self.lookup(query).ok().flatten().map(|(_, entry)| entry)
    }
}
