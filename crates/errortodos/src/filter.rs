//! Search and filtering for the record list.

use crate::model::{ErrorRecord, Status};

/// Criteria for narrowing the record list. All criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive text matched against title, description and category.
    pub search: String,
    /// Only records with this status; `None` means all.
    pub status: Option<Status>,
    /// Only records with exactly this category; `None` means all.
    pub category: Option<String>,
}

impl RecordFilter {
    /// Whether `record` passes every criterion.
    #[must_use]
    pub fn matches(&self, record: &ErrorRecord) -> bool {
        self.matches_search(record)
            && self.status.map_or(true, |s| record.status == s)
            && self
                .category
                .as_deref()
                .map_or(true, |c| record.category == c)
    }

    fn matches_search(&self, record: &ErrorRecord) -> bool {
        let needle = self.search.to_lowercase();
        [&record.title, &record.description, &record.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// The records that pass, in their original order.
    #[must_use]
    pub fn apply<'r>(&self, records: &'r [ErrorRecord]) -> Vec<&'r ErrorRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Distinct categories in first-seen order.
#[must_use]
pub fn categories(records: &[ErrorRecord]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        if !seen.contains(&record.category.as_str()) {
            seen.push(&record.category);
        }
    }
    seen
}
