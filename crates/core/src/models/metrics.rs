use serde::{Deserialize, Serialize};

/// Headline KPIs of a customer's portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Current portfolio value (investment record first, then last snapshot)
    pub current_value: f64,

    /// Total amount paid in (stored total, last snapshot, or schedule estimate)
    pub invested_value: f64,

    /// current_value - invested_value
    pub delta: f64,

    /// delta / invested_value * 100, or 0 when nothing was invested
    pub delta_percent: f64,
}

impl PortfolioMetrics {
    /// Derive delta and percentage from the two resolved values.
    #[must_use]
    pub fn from_values(current_value: f64, invested_value: f64) -> Self {
        let delta = current_value - invested_value;
        let delta_percent = if invested_value > 0.0 {
            (delta / invested_value) * 100.0
        } else {
            0.0
        };
        Self {
            current_value,
            invested_value,
            delta,
            delta_percent,
        }
    }

    #[must_use]
    pub fn is_gain(&self) -> bool {
        self.delta >= 0.0
    }
}
