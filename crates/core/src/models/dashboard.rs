use serde::{Deserialize, Serialize};

use super::chart::{ChartSeries, ValueRange};
use super::investment::PolicyBundle;
use super::metrics::PortfolioMetrics;

/// Everything the home screen renders, computed in one pass from one bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub bundle: PolicyBundle,
    pub metrics: PortfolioMetrics,
    pub chart: ChartSeries,

    /// Padded value range of `chart`; `None` when the chart is empty
    pub value_range: Option<ValueRange>,
}
