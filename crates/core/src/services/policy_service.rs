use serde::{Deserialize, Serialize};

use crate::models::chart::{ChartLayout, PlottedLine, ValueRange};
use crate::models::policy::{Policy, PolicyCategory};
use crate::models::raw::RawRow;
use crate::services::chart_service::{padded_range, ChartService};

/// Aggregates over a customer's policy list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyTotals {
    /// Sum of all current values
    pub total_value: f64,

    /// Sum of all monthly contributions
    pub total_monthly: f64,

    /// Mean return over policies with a positive return, 0 if there are none
    pub average_return: f64,

    /// Number of policies counted
    pub count: usize,
}

/// Mapping, filtering and aggregation of function-backend policies.
pub struct PolicyService {
    chart_service: ChartService,
}

impl PolicyService {
    pub fn new() -> Self {
        Self {
            chart_service: ChartService::new(),
        }
    }

    /// Map raw policy rows; rows without an id are skipped.
    pub fn map_rows(&self, rows: &[RawRow]) -> Vec<Policy> {
        rows.iter()
            .map(Policy::from_row)
            .filter(|p| !p.id.is_empty())
            .collect()
    }

    /// Case-insensitive search on product and provider, optionally narrowed
    /// to one category (`None` means all categories).
    ///
    /// The query is trimmed first: surrounding whitespace never narrows the
    /// result, and a blank query matches everything.
    pub fn filter<'a>(
        &self,
        policies: &'a [Policy],
        query: &str,
        category: Option<PolicyCategory>,
    ) -> Vec<&'a Policy> {
        let q = query.trim().to_lowercase();
        policies
            .iter()
            .filter(|p| {
                q.is_empty()
                    || p.product_name.to_lowercase().contains(&q)
                    || p.provider_name.to_lowercase().contains(&q)
            })
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect()
    }

    pub fn totals(&self, policies: &[Policy]) -> PolicyTotals {
        let total_value = policies.iter().map(|p| p.current_value).sum();
        let total_monthly = policies.iter().map(|p| p.monthly_contribution).sum();

        let positive: Vec<f64> = policies
            .iter()
            .map(|p| p.return_percent)
            .filter(|r| *r > 0.0)
            .collect();
        let average_return = if positive.is_empty() {
            0.0
        } else {
            positive.iter().sum::<f64>() / positive.len() as f64
        };

        PolicyTotals {
            total_value,
            total_monthly,
            average_return,
            count: policies.len(),
        }
    }

    /// Vertical scale for a performance history: 5 % below the minimum and
    /// 5 % above the maximum. A flat history falls back to the padded range
    /// used by the dashboard chart.
    pub fn history_range(&self, policy: &Policy) -> Option<ValueRange> {
        let values: Vec<f64> = policy.performance_history.iter().map(|p| p.value).collect();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        let range = ValueRange {
            min: min * 0.95,
            max: max * 1.05,
        };
        if range.span() > 0.0 {
            Some(range)
        } else {
            padded_range(values)
        }
    }

    /// Plot a policy's performance history, `None` if it has none.
    pub fn history_chart(&self, policy: &Policy, layout: &ChartLayout) -> Option<PlottedLine> {
        let range = self.history_range(policy)?;
        let values: Vec<f64> = policy.performance_history.iter().map(|p| p.value).collect();
        Some(self.chart_service.plot_line(&values, range, layout))
    }
}

impl Default for PolicyService {
    fn default() -> Self {
        Self::new()
    }
}
