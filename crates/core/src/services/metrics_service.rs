use chrono::{DateTime, Utc};

use crate::models::investment::{Investment, PolicyBundle, PortfolioSnapshot};
use crate::models::metrics::PortfolioMetrics;
use crate::normalize;

/// Average month length used to turn elapsed time into contribution months.
pub const AVERAGE_MONTH_DAYS: f64 = 30.44;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Resolves the headline portfolio numbers from whichever source is populated.
///
/// The investment record is authoritative when filled in; the snapshot table
/// is the fallback (it may lag, or be the only source for older accounts).
/// Every input may be missing: the chain bottoms out at 0, never at an error.
pub struct MetricsService;

impl MetricsService {
    pub fn new() -> Self {
        Self
    }

    /// Current portfolio value.
    ///
    /// 1. `investment.current_value`, if > 0
    /// 2. the last snapshot's portfolio value
    /// 3. 0
    #[must_use]
    pub fn resolve_current_value(
        &self,
        investment: Option<&Investment>,
        snapshots: &[PortfolioSnapshot],
    ) -> f64 {
        if let Some(value) = investment
            .and_then(|i| i.current_value)
            .filter(|v| *v > 0.0)
        {
            return value;
        }
        snapshots
            .last()
            .and_then(|s| s.portfolio_value)
            .unwrap_or(0.0)
    }

    /// Total amount invested; the first positive source wins.
    ///
    /// 1. `investment.net_paid_in`
    /// 2. the last snapshot's cumulative paid-in amount
    /// 3. `monthly_contribution × whole months since start + one_time_payment`
    #[must_use]
    pub fn resolve_invested_value(
        &self,
        investment: Option<&Investment>,
        snapshots: &[PortfolioSnapshot],
        now: DateTime<Utc>,
    ) -> f64 {
        if let Some(net) = investment.and_then(|i| i.net_paid_in).filter(|v| *v > 0.0) {
            return net;
        }

        if let Some(paid) = snapshots
            .last()
            .and_then(|s| s.paid_in_to_date)
            .filter(|v| *v > 0.0)
        {
            return paid;
        }

        match investment {
            Some(inv) => {
                let months = self.whole_months_elapsed(inv, now);
                inv.monthly_contribution * months as f64 + inv.one_time_payment
            }
            None => 0.0,
        }
    }

    /// Whole average-length months between the contract start and `now`.
    ///
    /// 0 when the start date is unknown or lies in the future.
    #[must_use]
    pub fn whole_months_elapsed(&self, investment: &Investment, now: DateTime<Utc>) -> u32 {
        let Some(start) = investment.start_date.and_then(normalize::utc_midnight) else {
            return 0;
        };
        let elapsed_ms = (now - start).num_milliseconds() as f64;
        let months = (elapsed_ms / (AVERAGE_MONTH_DAYS * MS_PER_DAY)).floor();
        if months.is_finite() && months > 0.0 {
            months as u32
        } else {
            0
        }
    }

    /// Resolve all headline KPIs for a bundle.
    #[must_use]
    pub fn resolve(&self, bundle: &PolicyBundle, now: DateTime<Utc>) -> PortfolioMetrics {
        let investment = bundle.investment.as_ref();
        let current = self.resolve_current_value(investment, &bundle.snapshots);
        let invested = self.resolve_invested_value(investment, &bundle.snapshots, now);
        PortfolioMetrics::from_values(current, invested)
    }
}

impl Default for MetricsService {
    fn default() -> Self {
        Self::new()
    }
}
