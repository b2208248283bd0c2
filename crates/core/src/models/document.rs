use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::{self, LogicalField};

use super::raw::RawRow;

pub const DEFAULT_DOCUMENT_TITLE: &str = "Dokument";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentCategory {
    /// Vertrag
    Contract,
    /// Rechnung
    Invoice,
    /// Bescheinigung
    Certificate,
    /// Sonstiges
    Other,
}

impl DocumentCategory {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "vertrag" => DocumentCategory::Contract,
            "rechnung" => DocumentCategory::Invoice,
            "bescheinigung" => DocumentCategory::Certificate,
            _ => DocumentCategory::Other,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DocumentCategory::Contract => "Vertrag",
            DocumentCategory::Invoice => "Rechnung",
            DocumentCategory::Certificate => "Bescheinigung",
            DocumentCategory::Other => "Sonstiges",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A customer document (contract, invoice, certificate) viewable as a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub customer_id: Option<String>,
    pub title: String,
    pub url: Option<String>,
    pub category: DocumentCategory,
    pub date: Option<NaiveDate>,
    pub policy_id: Option<String>,
}

impl Document {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            id: normalize::resolve_text(row, LogicalField::DocumentId).unwrap_or_default(),
            customer_id: normalize::resolve_text(row, LogicalField::DocumentCustomerId),
            title: normalize::resolve_text(row, LogicalField::DocumentTitle)
                .unwrap_or_else(|| DEFAULT_DOCUMENT_TITLE.to_string()),
            url: normalize::resolve_text(row, LogicalField::DocumentUrl),
            category: normalize::resolve_text(row, LogicalField::DocumentCategory)
                .map_or(DocumentCategory::Other, |label| DocumentCategory::from_label(&label)),
            date: normalize::resolve_date(row, LogicalField::DocumentDate),
            policy_id: normalize::resolve_text(row, LogicalField::DocumentPolicyId),
        }
    }
}
