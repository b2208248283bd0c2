use crate::models::document::{Document, DocumentCategory};
use crate::models::raw::RawRow;

/// Mapping and filtering of customer documents.
pub struct DocumentService;

impl DocumentService {
    pub fn new() -> Self {
        Self
    }

    /// Map raw document rows; rows without an id are skipped.
    pub fn map_rows(&self, rows: &[RawRow]) -> Vec<Document> {
        rows.iter()
            .map(Document::from_row)
            .filter(|d| !d.id.is_empty())
            .collect()
    }

    /// Case-insensitive title search, optionally narrowed to one category.
    pub fn filter<'a>(
        &self,
        documents: &'a [Document],
        query: &str,
        category: Option<DocumentCategory>,
    ) -> Vec<&'a Document> {
        let q = query.trim().to_lowercase();
        documents
            .iter()
            .filter(|d| q.is_empty() || d.title.to_lowercase().contains(&q))
            .filter(|d| category.map_or(true, |c| d.category == c))
            .collect()
    }

    /// Documents attached to one policy.
    pub fn for_policy<'a>(&self, documents: &'a [Document], policy_id: &str) -> Vec<&'a Document> {
        documents
            .iter()
            .filter(|d| d.policy_id.as_deref() == Some(policy_id))
            .collect()
    }
}

impl Default for DocumentService {
    fn default() -> Self {
        Self::new()
    }
}
