use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::normalize::{self, LogicalField};

use super::raw::RawRow;

pub const DEFAULT_CUSTOMER_NAME: &str = "Benutzer";

/// The authenticated customer's key for every data fetch: a lower-cased,
/// trimmed e-mail address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerIdentity(String);

impl CustomerIdentity {
    /// Normalize an e-mail address. Blank input means the session lost its
    /// e-mail and the customer has to sign in again.
    pub fn parse(email: &str) -> Result<Self, CoreError> {
        let normalized = email.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(CoreError::MissingEmail);
        }
        Ok(Self(normalized))
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    De,
    En,
}

/// Profile data of the signed-in customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub language: Language,
    pub created_at: Option<NaiveDate>,
    pub birth_date: Option<NaiveDate>,
    pub postal_code: Option<String>,
    pub occupation: Option<String>,
    pub user_type: Option<String>,
}

impl CustomerProfile {
    pub fn from_row(row: &RawRow) -> Self {
        let language = match normalize::resolve_text(row, LogicalField::Language)
            .map(|l| l.to_lowercase())
            .as_deref()
        {
            Some("en") => Language::En,
            _ => Language::De,
        };

        Self {
            id: normalize::resolve_text(row, LogicalField::CustomerId),
            name: normalize::resolve_text(row, LogicalField::CustomerName)
                .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
            email: normalize::resolve(row, LogicalField::CustomerEmail)
                .map(normalize::normalize_email)
                .unwrap_or_default(),
            phone: normalize::resolve_text(row, LogicalField::CustomerPhone),
            avatar_url: normalize::resolve_text(row, LogicalField::AvatarUrl),
            language,
            created_at: normalize::resolve_date(row, LogicalField::CreatedAt),
            birth_date: normalize::resolve_date(row, LogicalField::BirthDate),
            postal_code: normalize::resolve_text(row, LogicalField::PostalCode),
            occupation: normalize::resolve_text(row, LogicalField::Occupation),
            user_type: normalize::resolve_text(row, LogicalField::UserType),
        }
    }
}
