use log::{debug, warn};

use crate::models::investment::{
    row_email, EtfAllocation, Investment, PolicyBundle, PortfolioSnapshot,
};
use crate::models::raw::{RawPolicyBundle, RawRow};

/// Turns raw backend rows into a typed [`PolicyBundle`].
///
/// This is the only place untyped rows are read for the dashboard; the
/// metric and chart layers work on the typed entities exclusively.
pub struct BundleService;

impl BundleService {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a fetched bundle.
    ///
    /// - Rows that name a different customer e-mail than the bundle's are
    ///   dropped (a customer has at most one investment, keyed by e-mail).
    /// - Snapshots are sorted by date ascending; the sort is stable and rows
    ///   without a readable date go first. Same-date rows are kept as-is.
    /// - ETF allocations keep backend order.
    pub fn normalize(&self, raw: &RawPolicyBundle) -> PolicyBundle {
        let email = raw.email.trim().to_lowercase();
        let belongs = |row: &RawRow| match row_email(row) {
            Some(owner) if !email.is_empty() && owner != email => {
                warn!("Dropping row for {owner} from bundle of {email}");
                false
            }
            _ => true,
        };

        let investment = raw
            .investment
            .as_ref()
            .filter(|row| belongs(*row))
            .map(Investment::from_row);

        let etfs: Vec<EtfAllocation> = raw
            .etfs
            .iter()
            .filter(|row| belongs(*row))
            .map(EtfAllocation::from_row)
            .collect();

        let mut snapshots: Vec<PortfolioSnapshot> = raw
            .snapshots
            .iter()
            .filter(|row| belongs(*row))
            .map(PortfolioSnapshot::from_row)
            .collect();
        snapshots.sort_by_key(|s| s.date);

        let undated = snapshots.iter().filter(|s| s.date.is_none()).count();
        if undated > 0 {
            debug!("{undated} of {} snapshots have no readable date", snapshots.len());
        }

        PolicyBundle {
            email,
            investment,
            etfs,
            snapshots,
        }
    }
}

impl Default for BundleService {
    fn default() -> Self {
        Self::new()
    }
}
