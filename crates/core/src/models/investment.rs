use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::{self, LogicalField};

use super::raw::RawRow;

pub const DEFAULT_PRODUCT_NAME: &str = "Police";
pub const DEFAULT_PROVIDER_NAME: &str = "Unbekannt";

/// A customer's investment contract, normalized from either backend
/// generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// Product name (e.g., "PrivatRente Perspektive")
    pub product_name: String,

    /// Insurer / fund provider (e.g., "Allianz")
    pub provider_name: String,

    /// Recurring monthly contribution, never negative
    pub monthly_contribution: f64,

    /// One-time payment at contract start, never negative
    pub one_time_payment: f64,

    /// Net amount paid in so far, if the backend tracks it
    pub net_paid_in: Option<f64>,

    /// Current portfolio value ("Depotwert"), if populated
    pub current_value: Option<f64>,

    /// Return percentage as reported by the backend (signed)
    pub return_percent: Option<f64>,

    /// Contract start date
    pub start_date: Option<NaiveDate>,

    /// Normalized e-mail of the owning customer, if the row carries one
    pub customer_email: Option<String>,
}

impl Investment {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            product_name: normalize::resolve_text(row, LogicalField::ProductName)
                .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
            provider_name: normalize::resolve_text(row, LogicalField::ProviderName)
                .unwrap_or_else(|| DEFAULT_PROVIDER_NAME.to_string()),
            monthly_contribution: non_negative(normalize::resolve_number(
                row,
                LogicalField::MonthlyContribution,
            )),
            one_time_payment: non_negative(normalize::resolve_number(
                row,
                LogicalField::OneTimePayment,
            )),
            net_paid_in: normalize::resolve_number(row, LogicalField::NetPaidIn),
            current_value: normalize::resolve_number(row, LogicalField::CurrentValue),
            return_percent: normalize::resolve_number(row, LogicalField::ReturnPercent),
            start_date: normalize::resolve_date(row, LogicalField::StartDate),
            customer_email: row_email(row),
        }
    }
}

/// One historical record of portfolio value and cumulative paid-in amount.
///
/// Values stay optional: a missing figure is forward-filled when charting,
/// not silently replaced by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub date: Option<NaiveDate>,
    pub portfolio_value: Option<f64>,
    pub paid_in_to_date: Option<f64>,
    pub return_percent: Option<f64>,
}

impl PortfolioSnapshot {
    pub fn new(date: NaiveDate, portfolio_value: f64, paid_in_to_date: f64) -> Self {
        Self {
            date: Some(date),
            portfolio_value: Some(portfolio_value),
            paid_in_to_date: Some(paid_in_to_date),
            return_percent: None,
        }
    }

    pub fn from_row(row: &RawRow) -> Self {
        Self {
            date: normalize::resolve_date(row, LogicalField::SnapshotDate),
            portfolio_value: normalize::resolve_number(row, LogicalField::SnapshotValue),
            paid_in_to_date: normalize::resolve_number(row, LogicalField::SnapshotPaidIn),
            return_percent: normalize::resolve_number(row, LogicalField::SnapshotReturn),
        }
    }
}

/// One fund line of the customer's ETF allocation.
///
/// Weights are passed through as delivered; they need not sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtfAllocation {
    pub isin: Option<String>,
    pub name: String,
    pub percentage: Option<f64>,
}

impl EtfAllocation {
    pub fn from_row(row: &RawRow) -> Self {
        let isin = normalize::resolve_text(row, LogicalField::EtfIsin);
        let name = normalize::resolve_text(row, LogicalField::EtfName)
            .or_else(|| isin.clone())
            .unwrap_or_default();
        Self {
            isin,
            name,
            percentage: normalize::resolve_number(row, LogicalField::EtfWeight),
        }
    }
}

/// The aggregate handed to the UI for one customer.
///
/// Built fresh on every fetch and never mutated afterwards; derived values
/// (metrics, chart series) are computed into new objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyBundle {
    /// Normalized e-mail of the customer
    pub email: String,

    /// Zero or one investment contract
    pub investment: Option<Investment>,

    /// ETF allocation lines
    pub etfs: Vec<EtfAllocation>,

    /// Portfolio history, sorted by date ascending
    pub snapshots: Vec<PortfolioSnapshot>,
}

impl PolicyBundle {
    /// `true` when there is neither an investment record nor any history.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.investment.is_none() && self.snapshots.is_empty()
    }

    /// The most recent snapshot, if any.
    #[must_use]
    pub fn last_snapshot(&self) -> Option<&PortfolioSnapshot> {
        self.snapshots.last()
    }

    /// Names of the funds held, for display lists.
    #[must_use]
    pub fn fund_names(&self) -> Vec<&str> {
        self.etfs.iter().map(|e| e.name.as_str()).filter(|n| !n.is_empty()).collect()
    }
}

pub(crate) fn row_email(row: &RawRow) -> Option<String> {
    normalize::resolve(row, LogicalField::CustomerEmail)
        .map(normalize::normalize_email)
        .filter(|e| !e.is_empty())
}

fn non_negative(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0).max(0.0)
}
