use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{self, LogicalField};

use super::investment::{EtfAllocation, DEFAULT_PRODUCT_NAME, DEFAULT_PROVIDER_NAME};
use super::raw::RawRow;

/// Insurance / investment category of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyCategory {
    /// Lebensversicherung
    Life,
    /// Rentenversicherung
    Pension,
    /// Fondspolice / Investmentfonds
    Fund,
    /// Sachversicherung
    Property,
    /// Krankenversicherung
    Health,
    /// Direct investment
    Investment,
    /// Anything the backend labels differently
    Other,
}

impl PolicyCategory {
    /// Every category, in the order the policy list offers them as filters.
    pub const ALL: [PolicyCategory; 7] = [
        PolicyCategory::Pension,
        PolicyCategory::Fund,
        PolicyCategory::Life,
        PolicyCategory::Health,
        PolicyCategory::Property,
        PolicyCategory::Investment,
        PolicyCategory::Other,
    ];

    /// Parse the backend's German label. Unknown labels map to `Other`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "leben" => PolicyCategory::Life,
            "rente" => PolicyCategory::Pension,
            "fonds" => PolicyCategory::Fund,
            "sach" => PolicyCategory::Property,
            "kranken" => PolicyCategory::Health,
            "invest" => PolicyCategory::Investment,
            _ => PolicyCategory::Other,
        }
    }

    /// The German label shown in the UI.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PolicyCategory::Life => "Leben",
            PolicyCategory::Pension => "Rente",
            PolicyCategory::Fund => "Fonds",
            PolicyCategory::Property => "Sach",
            PolicyCategory::Health => "Kranken",
            PolicyCategory::Investment => "Invest",
            PolicyCategory::Other => "Sonstiges",
        }
    }

    /// Categories that carry an investment value worth showing even at 0.
    #[must_use]
    pub fn is_value_bearing(self) -> bool {
        matches!(
            self,
            PolicyCategory::Fund
                | PolicyCategory::Pension
                | PolicyCategory::Life
                | PolicyCategory::Investment
        )
    }
}

impl std::fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single value in a policy's performance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A policy as delivered by the function backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: String,
    pub customer_id: Option<String>,
    pub provider_name: String,
    pub product_name: String,
    pub monthly_contribution: f64,
    pub current_value: f64,
    pub return_percent: f64,
    /// Sorted by date ascending; points with an unreadable date or value are dropped
    pub performance_history: Vec<PerformancePoint>,
    pub category: PolicyCategory,
    pub contract_start: Option<NaiveDate>,
    pub contract_number: Option<String>,
    pub etf_allocations: Vec<EtfAllocation>,
}

impl Policy {
    pub fn from_row(row: &RawRow) -> Self {
        let performance_history = match normalize::resolve(row, LogicalField::PerformanceHistory) {
            Some(Value::Array(items)) => {
                let mut points: Vec<PerformancePoint> = items
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|item| {
                        Some(PerformancePoint {
                            date: normalize::resolve_date(item, LogicalField::HistoryDate)?,
                            value: normalize::resolve_number(item, LogicalField::HistoryValue)?,
                        })
                    })
                    .collect();
                points.sort_by_key(|p| p.date);
                points
            }
            _ => Vec::new(),
        };

        let etf_allocations = match normalize::resolve(row, LogicalField::EtfAllocations) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_object)
                .map(EtfAllocation::from_row)
                .collect(),
            _ => Vec::new(),
        };

        Self {
            id: normalize::resolve_text(row, LogicalField::PolicyId).unwrap_or_default(),
            customer_id: normalize::resolve_text(row, LogicalField::PolicyCustomerId),
            provider_name: normalize::resolve_text(row, LogicalField::ProviderName)
                .unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string()),
            product_name: normalize::resolve_text(row, LogicalField::ProductName)
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            monthly_contribution: normalize::resolve_number(row, LogicalField::MonthlyContribution)
                .unwrap_or(0.0),
            current_value: normalize::resolve_number(row, LogicalField::CurrentValue)
                .unwrap_or(0.0),
            return_percent: normalize::resolve_number(row, LogicalField::ReturnPercent)
                .unwrap_or(0.0),
            performance_history,
            category: normalize::resolve_text(row, LogicalField::PolicyCategory)
                .map_or(PolicyCategory::Other, |label| PolicyCategory::from_label(&label)),
            contract_start: normalize::resolve_date(row, LogicalField::StartDate),
            contract_number: normalize::resolve_text(row, LogicalField::ContractNumber),
            etf_allocations,
        }
    }

    /// Whether the policy list should show a portfolio value for this policy.
    #[must_use]
    pub fn shows_value(&self) -> bool {
        self.current_value > 0.0 || self.category.is_value_bearing()
    }
}
