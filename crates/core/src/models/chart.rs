use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single data point of the "last 12 months" portfolio chart.
///
/// Plot-ready values produced by the chart service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// The date for this data point
    pub date: NaiveDate,

    /// Portfolio value at this date
    pub portfolio_value: f64,

    /// Cumulative amount paid in at this date
    pub invested_value: f64,

    /// `true` for the window anchor and simulated months
    pub synthetic: bool,
}

/// How a chart series was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Nothing to plot; the caller shows an empty-state message
    Empty,
    /// Built from recorded snapshots
    Recorded,
    /// Interpolated from the contribution schedule because history is sparse
    Simulated,
}

/// A plot-ready series of chart points, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub kind: SeriesKind,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            kind: SeriesKind::Empty,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn portfolio_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.portfolio_value).collect()
    }

    #[must_use]
    pub fn invested_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.invested_value).collect()
    }
}

/// Padded vertical scale of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Plot area geometry, in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub pad_x: f64,
    pub pad_y: f64,
}

impl ChartLayout {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pad_x: 10.0,
            pad_y: 10.0,
        }
    }

    #[must_use]
    pub fn with_padding(mut self, pad_x: f64, pad_y: f64) -> Self {
        self.pad_x = pad_x;
        self.pad_y = pad_y;
        self
    }
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self::new(320.0, 140.0)
    }
}

/// A projected point in plot coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

/// Both chart lines projected onto a layout, ready for an SVG path element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottedChart {
    pub layout: ChartLayout,
    pub range: ValueRange,
    pub portfolio: Vec<PlotPoint>,
    pub invested: Vec<PlotPoint>,
    pub portfolio_path: String,
    pub invested_path: String,
    /// First date, formatted `dd.mm.yyyy`
    pub first_label: String,
    /// Last date, formatted `dd.mm.yyyy`
    pub last_label: String,
}

/// A single projected line with its filled area, e.g. a policy's
/// performance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlottedLine {
    pub range: ValueRange,
    pub points: Vec<PlotPoint>,
    pub line_path: String,
    pub area_path: String,
}
