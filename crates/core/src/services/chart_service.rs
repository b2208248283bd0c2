use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use log::debug;

use crate::models::chart::{
    ChartLayout, ChartPoint, ChartSeries, PlotPoint, PlottedChart, PlottedLine, SeriesKind,
    ValueRange,
};
use crate::models::investment::{Investment, PolicyBundle, PortfolioSnapshot};
use crate::models::metrics::PortfolioMetrics;
use crate::services::format::format_date_de;

/// Fewer dated snapshots than this and the chart is simulated from the
/// contribution schedule instead of drawn from history.
pub const SPARSE_HISTORY_THRESHOLD: usize = 6;

/// Length of the chart window, counted back from the last snapshot.
pub const CHART_WINDOW_DAYS: i64 = 365;

/// Ease-in exponent of the simulated growth curve. Keeps early synthetic
/// months from showing implausibly large returns.
pub const SIMULATION_EASE_EXPONENT: f64 = 1.65;

/// Vertical padding: the largest of these wins.
pub const PAD_MAGNITUDE_RATIO: f64 = 0.04;
pub const PAD_SPAN_RATIO: f64 = 0.12;
pub const PAD_FLOOR: f64 = 1.0;

/// A point before gap filling: values may still be missing.
#[derive(Debug, Clone)]
struct DraftPoint {
    date: NaiveDate,
    portfolio_value: Option<f64>,
    invested_value: Option<f64>,
    synthetic: bool,
}

impl DraftPoint {
    fn recorded(snapshot: &PortfolioSnapshot, date: NaiveDate) -> Self {
        Self {
            date,
            portfolio_value: snapshot.portfolio_value,
            invested_value: snapshot.paid_in_to_date,
            synthetic: false,
        }
    }
}

/// Generates the "last 12 months" chart series from a bundle.
///
/// Every number on the dashboard chart is computed here; callers only draw.
/// These data conditions are handled:
/// - dense history: recorded snapshots, windowed, with a left-edge anchor
/// - exactly one dated snapshot: a single recorded point
/// - sparse history: one simulated point per calendar month
/// - no investment record: whatever snapshots exist, plotted as recorded
///
/// In every case gaps are forward-filled and the right edge equals the
/// headline KPIs exactly.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Build the chart series.
    ///
    /// `metrics` must be the resolved KPIs of the same bundle; `now` is the
    /// window end when there is no dated snapshot.
    #[must_use]
    pub fn build_chart_series(
        &self,
        bundle: &PolicyBundle,
        metrics: &PortfolioMetrics,
        now: DateTime<Utc>,
    ) -> ChartSeries {
        if bundle.is_empty() {
            return ChartSeries::empty();
        }

        // Snapshots are sorted with undated rows first; those can't be placed
        // on a time axis.
        let dated: Vec<(NaiveDate, &PortfolioSnapshot)> = bundle
            .snapshots
            .iter()
            .filter_map(|s| s.date.map(|d| (d, s)))
            .collect();

        let end_date = dated.last().map_or_else(|| now.date_naive(), |(d, _)| *d);
        let start_date = bundle.investment.as_ref().and_then(|i| i.start_date);
        let window_start = self.window_start(end_date, start_date);

        let (kind, drafts) = if dated.len() >= SPARSE_HISTORY_THRESHOLD {
            (SeriesKind::Recorded, self.recorded_points(&dated, window_start))
        } else if let [(date, snapshot)] = dated.as_slice() {
            // A lone snapshot is drawn as itself, investment record or not.
            (SeriesKind::Recorded, vec![DraftPoint::recorded(snapshot, *date)])
        } else if let Some(investment) = &bundle.investment {
            debug!(
                "Only {} dated snapshots, simulating {window_start}..{end_date}",
                dated.len()
            );
            (
                SeriesKind::Simulated,
                self.simulated_points(investment, metrics, window_start, end_date),
            )
        } else {
            let drafts: Vec<DraftPoint> = dated
                .iter()
                .map(|(date, s)| DraftPoint::recorded(s, *date))
                .collect();
            (SeriesKind::Recorded, drafts)
        };

        if drafts.is_empty() {
            return ChartSeries::empty();
        }

        ChartSeries {
            kind,
            points: self.finalize(drafts, metrics),
        }
    }

    /// `max(contract start, end − 365 days)`, never after `end_date`.
    #[must_use]
    pub fn window_start(&self, end_date: NaiveDate, start_date: Option<NaiveDate>) -> NaiveDate {
        let year_before = end_date - Duration::days(CHART_WINDOW_DAYS);
        let start = match start_date {
            Some(start) => start.max(year_before),
            None => year_before,
        };
        start.min(end_date)
    }

    /// Padded min/max across both lines, or `None` for an empty series.
    ///
    /// Padding is the largest of 4 % of the largest magnitude, 12 % of the
    /// span, and 1, so a flat account never collapses to a zero-height plot.
    #[must_use]
    pub fn value_range(&self, series: &ChartSeries) -> Option<ValueRange> {
        let values = series
            .points
            .iter()
            .flat_map(|p| [p.portfolio_value, p.invested_value]);
        padded_range(values)
    }

    /// Project a value series onto the plot area.
    ///
    /// Points are spaced evenly; a lone point sits at the horizontal midpoint.
    /// Higher values are drawn nearer the top.
    #[must_use]
    pub fn project(&self, values: &[f64], range: &ValueRange, layout: &ChartLayout) -> Vec<PlotPoint> {
        let n = values.len();
        let span = range.span();
        let inner_width = layout.width - layout.pad_x * 2.0;
        let inner_height = layout.height - layout.pad_y * 2.0;

        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = if n == 1 {
                    layout.width / 2.0
                } else {
                    layout.pad_x + (i as f64 * inner_width) / (n - 1) as f64
                };
                let y = if span > 0.0 {
                    layout.pad_y + ((range.max - v) / span) * inner_height
                } else {
                    layout.height / 2.0
                };
                PlotPoint { x, y }
            })
            .collect()
    }

    /// Project both lines of a series and build their SVG paths.
    ///
    /// Returns `None` for an empty series; the caller shows an empty state.
    #[must_use]
    pub fn plot(&self, series: &ChartSeries, layout: &ChartLayout) -> Option<PlottedChart> {
        let range = self.value_range(series)?;
        let first = series.points.first()?;
        let last = series.points.last()?;

        let portfolio = self.project(&series.portfolio_values(), &range, layout);
        let invested = self.project(&series.invested_values(), &range, layout);

        Some(PlottedChart {
            layout: *layout,
            range,
            portfolio_path: line_path(&portfolio),
            invested_path: line_path(&invested),
            portfolio,
            invested,
            first_label: format_date_de(first.date),
            last_label: format_date_de(last.date),
        })
    }

    /// Project a single line with an explicit range, including the filled
    /// area underneath it.
    #[must_use]
    pub fn plot_line(&self, values: &[f64], range: ValueRange, layout: &ChartLayout) -> PlottedLine {
        let points = self.project(values, &range, layout);
        PlottedLine {
            range,
            line_path: line_path(&points),
            area_path: area_path(&points, layout),
            points,
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Dense branch: keep the window, fall back to everything if the window
    /// is empty, and anchor the line at `window_start`.
    fn recorded_points(
        &self,
        dated: &[(NaiveDate, &PortfolioSnapshot)],
        window_start: NaiveDate,
    ) -> Vec<DraftPoint> {
        let mut retained: Vec<DraftPoint> = dated
            .iter()
            .filter(|(date, _)| *date >= window_start)
            .map(|(date, s)| DraftPoint::recorded(s, *date))
            .collect();

        if retained.is_empty() {
            retained = dated
                .iter()
                .map(|(date, s)| DraftPoint::recorded(s, *date))
                .collect();
        }

        if let Some(first) = retained.first() {
            if first.date > window_start {
                let anchor = DraftPoint {
                    date: window_start,
                    synthetic: true,
                    ..first.clone()
                };
                retained.insert(0, anchor);
            }
        }

        retained
    }

    /// Sparse branch: one point per calendar month, paid-in following the
    /// contribution schedule rescaled to end at the invested value, and
    /// value easing in towards the current value.
    fn simulated_points(
        &self,
        investment: &Investment,
        metrics: &PortfolioMetrics,
        window_start: NaiveDate,
        end_date: NaiveDate,
    ) -> Vec<DraftPoint> {
        let dates = month_dates(window_start, end_date);
        let n = dates.len();
        if n == 0 {
            return Vec::new();
        }

        let schedule: Vec<f64> = dates
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let months = match investment.start_date {
                    Some(start) => months_between(start, *date).max(0),
                    None => i as i32,
                };
                investment.one_time_payment + investment.monthly_contribution * f64::from(months)
            })
            .collect();

        let invested = metrics.invested_value;
        let scheduled_total = schedule[n - 1];
        let scale = (scheduled_total > 0.0).then(|| invested / scheduled_total);
        if scale.is_none() {
            debug!("Contribution schedule projects nothing; simulating flat paid-in");
        }

        let extra_growth = if invested > 0.0 {
            metrics.current_value / invested - 1.0
        } else {
            0.0
        };

        dates
            .into_iter()
            .zip(schedule)
            .enumerate()
            .map(|(i, (date, scheduled))| {
                let paid_in = scale.map_or(invested, |s| scheduled * s);
                let progress = if n == 1 {
                    1.0
                } else {
                    i as f64 / (n - 1) as f64
                };
                let value = paid_in * (1.0 + extra_growth * progress.powf(SIMULATION_EASE_EXPONENT));
                DraftPoint {
                    date,
                    portfolio_value: Some(value),
                    invested_value: Some(paid_in),
                    synthetic: true,
                }
            })
            .collect()
    }

    /// Forward-fill both lines independently and pin the right edge to the
    /// resolved KPIs.
    fn finalize(&self, drafts: Vec<DraftPoint>, metrics: &PortfolioMetrics) -> Vec<ChartPoint> {
        let portfolio: Vec<Option<f64>> = drafts.iter().map(|d| d.portfolio_value).collect();
        let invested: Vec<Option<f64>> = drafts.iter().map(|d| d.invested_value).collect();
        let portfolio = forward_fill(&portfolio, metrics.current_value);
        let invested = forward_fill(&invested, metrics.invested_value);

        let mut points: Vec<ChartPoint> = drafts
            .into_iter()
            .zip(portfolio.into_iter().zip(invested))
            .map(|(draft, (portfolio_value, invested_value))| ChartPoint {
                date: draft.date,
                portfolio_value,
                invested_value,
                synthetic: draft.synthetic,
            })
            .collect();

        if let Some(last) = points.last_mut() {
            last.portfolio_value = metrics.current_value;
            last.invested_value = metrics.invested_value;
        }
        points
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace missing or non-finite values with the nearest preceding finite
/// value. Leading gaps take `fallback_first`.
#[must_use]
pub fn forward_fill(values: &[Option<f64>], fallback_first: f64) -> Vec<f64> {
    let mut last_known: Option<f64> = None;
    values
        .iter()
        .map(|v| match v.filter(|x| x.is_finite()) {
            Some(x) => {
                last_known = Some(x);
                x
            }
            None => last_known.unwrap_or(fallback_first),
        })
        .collect()
}

/// Padded min/max over arbitrary values; non-finite values are ignored.
#[must_use]
pub fn padded_range<I>(values: I) -> Option<ValueRange>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            None => Some((v, v)),
        })?;

    let magnitude = min.abs().max(max.abs());
    let pad = (PAD_MAGNITUDE_RATIO * magnitude)
        .max(PAD_SPAN_RATIO * (max - min))
        .max(PAD_FLOOR);

    Some(ValueRange {
        min: min - pad,
        max: max + pad,
    })
}

/// SVG path through the points: `"M x y L x y …"`. Empty for no points.
#[must_use]
pub fn line_path(points: &[PlotPoint]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let cmd = if i == 0 { 'M' } else { 'L' };
            format!("{cmd} {:.2} {:.2}", p.x, p.y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Closed SVG path filling the area between the line and the plot bottom.
#[must_use]
pub fn area_path(points: &[PlotPoint], layout: &ChartLayout) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    let bottom = layout.height - layout.pad_y;
    format!(
        "{} L {:.2} {bottom:.2} L {:.2} {bottom:.2} Z",
        line_path(points),
        last.x,
        first.x
    )
}

/// Calendar-month difference, ignoring the day of month.
fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

/// One date per calendar month from `start`'s month to `end`'s month.
///
/// The first date is `start`, the last is `end`, the ones between fall on
/// the first of their month. Same month → just `end`.
fn month_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let total = months_between(start, end);
    if total < 0 {
        return vec![end];
    }
    let base = start.year() * 12 + start.month0() as i32;
    (0..=total)
        .filter_map(|k| {
            if k == total {
                Some(end)
            } else if k == 0 {
                Some(start)
            } else {
                let idx = base + k;
                NaiveDate::from_ymd_opt(idx.div_euclid(12), idx.rem_euclid(12) as u32 + 1, 1)
            }
        })
        .collect()
}
