// ═══════════════════════════════════════════════════════════════════
// Service Tests — BundleService, MetricsService, ChartService,
// PolicyService, DocumentService, display formatting
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};

use policy_portal_core::models::chart::{ChartLayout, PlotPoint, SeriesKind, ValueRange};
use policy_portal_core::models::document::{Document, DocumentCategory};
use policy_portal_core::models::investment::{Investment, PolicyBundle, PortfolioSnapshot};
use policy_portal_core::models::metrics::PortfolioMetrics;
use policy_portal_core::models::policy::{Policy, PolicyCategory};
use policy_portal_core::models::raw::{RawPolicyBundle, RawRow};
use policy_portal_core::services::bundle_service::BundleService;
use policy_portal_core::services::chart_service::{
    forward_fill, line_path, padded_range, ChartService, SPARSE_HISTORY_THRESHOLD,
};
use policy_portal_core::services::document_service::DocumentService;
use policy_portal_core::services::format::{format_currency_eur, format_date_de, format_percent};
use policy_portal_core::services::metrics_service::MetricsService;
use policy_portal_core::services::policy_service::PolicyService;

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn row(value: Value) -> RawRow {
    match value {
        Value::Object(map) => map,
        other => panic!("test row must be an object, got {other}"),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at_noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).single().expect("valid instant")
}

fn raw_bundle(investment: Option<Value>, snapshots: Vec<Value>) -> RawPolicyBundle {
    RawPolicyBundle {
        email: "kunde@example.de".into(),
        investment: investment.map(row),
        etfs: Vec::new(),
        snapshots: snapshots.into_iter().map(row).collect(),
    }
}

fn bundle(investment: Option<Value>, snapshots: Vec<Value>) -> PolicyBundle {
    BundleService::new().normalize(&raw_bundle(investment, snapshots))
}

fn monthly_snapshots(count: usize, first: NaiveDate) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let d = first + Duration::days(30 * i as i64);
            json!({
                "datum": d.format("%Y-%m-%d").to_string(),
                "portfolio_wert": 1000.0 + 100.0 * i as f64,
                "eingezahlt_bis_dahin": 900.0 + 80.0 * i as f64,
            })
        })
        .collect()
}

fn series_for(b: &PolicyBundle, now: DateTime<Utc>) -> (PortfolioMetrics, policy_portal_core::models::chart::ChartSeries) {
    let metrics = MetricsService::new().resolve(b, now);
    let series = ChartService::new().build_chart_series(b, &metrics, now);
    (metrics, series)
}

// ═══════════════════════════════════════════════════════════════════
// BundleService
// ═══════════════════════════════════════════════════════════════════

mod bundle_normalization {
    use super::*;

    #[test]
    fn normalizes_email() {
        let mut raw = raw_bundle(None, vec![]);
        raw.email = "  Kunde@Example.DE ".into();
        let b = BundleService::new().normalize(&raw);
        assert_eq!(b.email, "kunde@example.de");
    }

    #[test]
    fn maps_investment_from_either_generation() {
        let postgres = bundle(
            Some(json!({ "produkt": "Fondspolice", "depotwert": "12.500,00", "monatsbeitrag": 150 })),
            vec![],
        );
        let functions = bundle(
            Some(json!({ "productName": "Fondspolice", "currentValue": 12500, "monthlyContribution": "150" })),
            vec![],
        );
        let a = postgres.investment.expect("investment");
        let b = functions.investment.expect("investment");
        assert_eq!(a.product_name, b.product_name);
        assert_eq!(a.current_value, Some(12500.0));
        assert_eq!(b.current_value, Some(12500.0));
        assert_eq!(a.monthly_contribution, 150.0);
        assert_eq!(b.monthly_contribution, 150.0);
    }

    #[test]
    fn sorts_snapshots_ascending_with_undated_first() {
        let b = bundle(
            None,
            vec![
                json!({ "datum": "2024-03-01", "portfolio_wert": 3 }),
                json!({ "datum": "kaputt", "portfolio_wert": 0 }),
                json!({ "datum": "01.01.2024", "portfolio_wert": 1 }),
                json!({ "datum": "2024-02-01", "portfolio_wert": 2 }),
            ],
        );
        let values: Vec<Option<f64>> = b.snapshots.iter().map(|s| s.portfolio_value).collect();
        assert_eq!(values, vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(b.snapshots[0].date, None);
    }

    #[test]
    fn same_date_snapshots_keep_backend_order() {
        let b = bundle(
            None,
            vec![
                json!({ "datum": "2024-02-01", "portfolio_wert": "erste" }),
                json!({ "datum": "2024-02-01", "portfolio_wert": 2 }),
            ],
        );
        assert_eq!(b.snapshots[0].portfolio_value, None);
        assert_eq!(b.snapshots[1].portfolio_value, Some(2.0));
    }

    #[test]
    fn drops_rows_of_other_customers() {
        let mut raw = raw_bundle(
            Some(json!({ "kunde_email": "someone@else.de", "depotwert": 1 })),
            vec![
                json!({ "kunde_email": "KUNDE@example.de", "datum": "2024-01-01", "portfolio_wert": 5 }),
                json!({ "kunde_email": "other@example.de", "datum": "2024-02-01", "portfolio_wert": 6 }),
            ],
        );
        raw.etfs = vec![row(json!({ "isin": "IE00B4L5Y983", "name": "MSCI World", "prozent": 60 }))];
        let b = BundleService::new().normalize(&raw);
        assert!(b.investment.is_none());
        assert_eq!(b.snapshots.len(), 1);
        assert_eq!(b.snapshots[0].portfolio_value, Some(5.0));
        assert_eq!(b.etfs.len(), 1);
    }

    #[test]
    fn etfs_keep_backend_order_and_weights() {
        let mut raw = raw_bundle(None, vec![]);
        raw.etfs = vec![
            row(json!({ "isin": "A", "name": "Small", "prozent": "10,5" })),
            row(json!({ "isin": "B", "name": "Large", "prozent": 120 })),
            row(json!({ "isin": "C", "prozent": null })),
        ];
        let b = BundleService::new().normalize(&raw);
        assert_eq!(b.fund_names(), vec!["Small", "Large", "C"]);
        assert_eq!(b.etfs[0].percentage, Some(10.5));
        assert_eq!(b.etfs[1].percentage, Some(120.0));
        assert_eq!(b.etfs[2].percentage, None);
    }

    #[test]
    fn empty_bundle() {
        let b = bundle(None, vec![]);
        assert!(b.is_empty());
        assert!(b.last_snapshot().is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// MetricsService
// ═══════════════════════════════════════════════════════════════════

mod metric_resolution {
    use super::*;

    fn investment(value: Value) -> Investment {
        Investment::from_row(&row(value))
    }

    fn snapshot(value: Value) -> PortfolioSnapshot {
        PortfolioSnapshot::from_row(&row(value))
    }

    #[test]
    fn current_value_from_investment() {
        let inv = investment(json!({ "depotwert": 1000 }));
        assert_eq!(MetricsService::new().resolve_current_value(Some(&inv), &[]), 1000.0);
    }

    #[test]
    fn current_value_falls_back_to_last_snapshot() {
        let inv = investment(json!({ "depotwert": 0 }));
        let snaps = [snapshot(json!({ "portfolio_wert": 750 }))];
        assert_eq!(MetricsService::new().resolve_current_value(Some(&inv), &snaps), 750.0);
    }

    #[test]
    fn current_value_defaults_to_zero() {
        let inv = investment(json!({}));
        assert_eq!(MetricsService::new().resolve_current_value(Some(&inv), &[]), 0.0);
        assert_eq!(MetricsService::new().resolve_current_value(None, &[]), 0.0);
    }

    #[test]
    fn invested_prefers_net_paid_in() {
        let inv = investment(json!({ "eingezahlt_netto": 4200, "monatsbeitrag": 100 }));
        let snaps = [snapshot(json!({ "eingezahlt_bis_dahin": 300 }))];
        let now = at_noon(2025, 6, 15);
        assert_eq!(MetricsService::new().resolve_invested_value(Some(&inv), &snaps, now), 4200.0);
    }

    #[test]
    fn invested_falls_back_to_last_snapshot() {
        let inv = investment(json!({ "eingezahlt_netto": 0 }));
        let snaps = [snapshot(json!({ "eingezahlt_bis_dahin": 300 }))];
        let now = at_noon(2025, 6, 15);
        assert_eq!(MetricsService::new().resolve_invested_value(Some(&inv), &snaps, now), 300.0);
    }

    #[test]
    fn invested_estimated_from_schedule() {
        let now = at_noon(2025, 6, 15);
        let start = (now - Duration::days(153)).format("%Y-%m-%d").to_string();
        let inv = investment(json!({
            "eingezahlt_netto": 0,
            "monatsbeitrag": 100,
            "startdatum": start,
            "einmalzahlung": 50,
        }));
        let snaps = [snapshot(json!({ "eingezahlt_bis_dahin": 0 }))];
        assert_eq!(MetricsService::new().resolve_invested_value(Some(&inv), &snaps, now), 550.0);
    }

    #[test]
    fn unparseable_start_counts_no_months() {
        let inv = investment(json!({ "monatsbeitrag": 100, "startdatum": "bald", "einmalzahlung": 50 }));
        let now = at_noon(2025, 6, 15);
        assert_eq!(MetricsService::new().whole_months_elapsed(&inv, now), 0);
        assert_eq!(MetricsService::new().resolve_invested_value(Some(&inv), &[], now), 50.0);
    }

    #[test]
    fn future_start_counts_no_months() {
        let inv = investment(json!({ "monatsbeitrag": 100, "startdatum": "2030-01-01" }));
        assert_eq!(MetricsService::new().whole_months_elapsed(&inv, at_noon(2025, 6, 15)), 0);
    }

    #[test]
    fn no_sources_resolve_to_zero() {
        assert_eq!(
            MetricsService::new().resolve_invested_value(None, &[], at_noon(2025, 6, 15)),
            0.0
        );
    }

    #[test]
    fn delta_and_percent() {
        let b = bundle(Some(json!({ "depotwert": 1100, "eingezahlt_netto": 1000 })), vec![]);
        let m = MetricsService::new().resolve(&b, at_noon(2025, 6, 15));
        assert_eq!(m.current_value, 1100.0);
        assert_eq!(m.invested_value, 1000.0);
        assert_eq!(m.delta, 100.0);
        assert!((m.delta_percent - 10.0).abs() < 1e-9);
        assert!(m.is_gain());
    }

    #[test]
    fn delta_percent_is_zero_without_investment() {
        let m = PortfolioMetrics::from_values(500.0, 0.0);
        assert_eq!(m.delta, 500.0);
        assert_eq!(m.delta_percent, 0.0);
        assert!(m.delta_percent.is_finite());
    }

    #[test]
    fn loss_is_negative() {
        let m = PortfolioMetrics::from_values(800.0, 1000.0);
        assert_eq!(m.delta, -200.0);
        assert!((m.delta_percent + 20.0).abs() < 1e-9);
        assert!(!m.is_gain());
    }
}

// ═══════════════════════════════════════════════════════════════════
// ChartService — series
// ═══════════════════════════════════════════════════════════════════

mod chart_series {
    use super::*;

    #[test]
    fn empty_bundle_gives_empty_series() {
        let b = bundle(None, vec![]);
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert!(series.is_empty());
        assert_eq!(series.kind, SeriesKind::Empty);
    }

    #[test]
    fn single_snapshot_gives_single_point() {
        let b = bundle(
            None,
            vec![json!({ "datum": "2024-11-30", "portfolio_wert": 750, "eingezahlt_bis_dahin": 700 })],
        );
        let (metrics, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.len(), 1);
        let point = &series.points[0];
        assert!(point.portfolio_value.is_finite());
        assert!(point.invested_value.is_finite());
        assert_eq!(point.portfolio_value, metrics.current_value);
        assert_eq!(point.date, date(2024, 11, 30));

        let plotted = ChartService::new()
            .plot(&series, &ChartLayout::default())
            .expect("one point plots");
        assert_eq!(plotted.portfolio.len(), 1);
        assert_eq!(plotted.portfolio[0].x, 160.0);
        assert!(plotted.portfolio[0].y.is_finite());
        assert_eq!(plotted.first_label, "30.11.2024");
        assert_eq!(plotted.last_label, "30.11.2024");
    }

    #[test]
    fn dense_history_is_recorded_with_anchor() {
        let b = bundle(
            Some(json!({ "depotwert": 2000 })),
            monthly_snapshots(8, date(2024, 7, 1)),
        );
        let (_, series) = series_for(&b, at_noon(2025, 3, 1));
        assert_eq!(series.kind, SeriesKind::Recorded);
        // 8 snapshots plus an anchor at the window start
        assert_eq!(series.len(), 9);
        let first = &series.points[0];
        assert!(first.synthetic);
        assert_eq!(first.portfolio_value, series.points[1].portfolio_value);
        assert_eq!(first.invested_value, series.points[1].invested_value);
        let end = b.last_snapshot().and_then(|s| s.date).expect("dated");
        assert_eq!(first.date, end - Duration::days(365));
    }

    #[test]
    fn right_edge_matches_kpis() {
        // Investment record disagrees with the last snapshot on purpose
        let b = bundle(
            Some(json!({ "depotwert": 9999, "eingezahlt_netto": 5000 })),
            monthly_snapshots(10, date(2024, 3, 1)),
        );
        let (metrics, series) = series_for(&b, at_noon(2025, 3, 1));
        let last = series.points.last().expect("points");
        assert_eq!(last.portfolio_value, metrics.current_value);
        assert_eq!(last.invested_value, metrics.invested_value);
        assert_eq!(last.portfolio_value, 9999.0);
        assert_eq!(last.invested_value, 5000.0);
    }

    #[test]
    fn single_snapshot_with_investment_gives_single_point() {
        let b = bundle(
            Some(json!({ "depotwert": 1500, "eingezahlt_netto": 1200, "monatsbeitrag": 100, "startdatum": "2024-01-01" })),
            vec![json!({ "datum": "2024-12-01", "portfolio_wert": 1400, "eingezahlt_bis_dahin": 1100 })],
        );
        let (metrics, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.kind, SeriesKind::Recorded);
        assert_eq!(series.len(), 1);
        let point = &series.points[0];
        assert_eq!(point.date, date(2024, 12, 1));
        assert!(!point.synthetic);
        // Right edge is the resolved KPIs, not the snapshot's own values
        assert_eq!(point.portfolio_value, metrics.current_value);
        assert_eq!(point.invested_value, metrics.invested_value);
        assert_eq!(point.portfolio_value, 1500.0);
        assert_eq!(point.invested_value, 1200.0);
    }

    #[test]
    fn right_edge_matches_kpis_when_sparse() {
        let b = bundle(
            Some(json!({ "depotwert": 1500, "eingezahlt_netto": 1200, "monatsbeitrag": 100, "startdatum": "2024-01-01" })),
            vec![
                json!({ "datum": "2024-11-01", "portfolio_wert": 1300, "eingezahlt_bis_dahin": 1000 }),
                json!({ "datum": "2024-12-01", "portfolio_wert": 1400, "eingezahlt_bis_dahin": 1100 }),
            ],
        );
        let (metrics, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.kind, SeriesKind::Simulated);
        assert!(series.len() > 1);
        let last = series.points.last().expect("points");
        assert_eq!(last.portfolio_value, metrics.current_value);
        assert_eq!(last.invested_value, metrics.invested_value);
    }

    #[test]
    fn sparse_history_is_simulated_per_month() {
        let b = bundle(
            Some(json!({
                "depotwert": 1500,
                "eingezahlt_netto": 1200,
                "monatsbeitrag": 100,
                "startdatum": "2024-01-01",
            })),
            vec![],
        );
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.kind, SeriesKind::Simulated);
        // January 2024 through January 2025
        assert_eq!(series.len(), 13);
        assert!(series.points.iter().all(|p| p.synthetic));
        assert_eq!(series.points[0].date, date(2024, 1, 16));
        assert_eq!(series.points[1].date, date(2024, 2, 1));
        assert_eq!(series.points[12].date, date(2025, 1, 15));

        // Paid-in follows the schedule (100 per month) and ends at 1200
        assert_eq!(series.points[0].invested_value, 0.0);
        assert!((series.points[6].invested_value - 600.0).abs() < 1e-9);
        assert_eq!(series.points[12].invested_value, 1200.0);
        assert_eq!(series.points[12].portfolio_value, 1500.0);
    }

    #[test]
    fn simulation_eases_in() {
        let b = bundle(
            Some(json!({
                "depotwert": 2000,
                "eingezahlt_netto": 1000,
                "einmalzahlung": 1000,
                "startdatum": "2024-01-01",
            })),
            vec![],
        );
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        // Flat paid-in, so the value curve is the growth curve alone
        let values = series.portfolio_values();
        assert_eq!(values[0], 1000.0);
        let midpoint = values[values.len() / 2];
        assert!(midpoint < 1500.0, "ease-in keeps the middle below linear, got {midpoint}");
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn zero_schedule_gives_flat_paid_in() {
        let b = bundle(
            Some(json!({ "depotwert": 600, "eingezahlt_netto": 500, "startdatum": "2024-06-01" })),
            vec![],
        );
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.kind, SeriesKind::Simulated);
        assert!(series.invested_values().iter().all(|v| *v == 500.0));
    }

    #[test]
    fn window_starts_at_contract_start_when_later() {
        let b = bundle(
            Some(json!({ "depotwert": 600, "eingezahlt_netto": 500, "monatsbeitrag": 50, "startdatum": "2024-10-10" })),
            vec![],
        );
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.points[0].date, date(2024, 10, 10));
        assert_eq!(series.len(), 4);
    }

    #[test]
    fn fewer_than_threshold_without_investment_is_recorded() {
        let b = bundle(None, monthly_snapshots(SPARSE_HISTORY_THRESHOLD - 1, date(2024, 6, 1)));
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert_eq!(series.kind, SeriesKind::Recorded);
        assert_eq!(series.len(), SPARSE_HISTORY_THRESHOLD - 1);
        assert!(series.points.iter().all(|p| !p.synthetic));
    }

    #[test]
    fn gaps_are_forward_filled() {
        let mut snaps = monthly_snapshots(7, date(2024, 4, 1));
        snaps[2]["portfolio_wert"] = json!("unbekannt");
        snaps[3]["portfolio_wert"] = Value::Null;
        snaps[4]["eingezahlt_bis_dahin"] = json!("");
        let b = bundle(Some(json!({ "depotwert": 5000 })), snaps);
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));

        for p in &series.points {
            assert!(p.portfolio_value.is_finite());
            assert!(p.invested_value.is_finite());
        }
        // Index shift of one for the anchor
        let v = series.portfolio_values();
        assert_eq!(v[3], v[2]);
        assert_eq!(v[4], v[2]);
        let i = series.invested_values();
        assert_eq!(i[5], i[4]);
    }

    #[test]
    fn undated_snapshots_are_not_charted() {
        let mut snaps = monthly_snapshots(6, date(2024, 6, 1));
        snaps.push(json!({ "portfolio_wert": 123 }));
        let b = bundle(Some(json!({ "depotwert": 5000 })), snaps);
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert!(series.points.iter().all(|p| p.portfolio_value != 123.0));
    }

    #[test]
    fn build_is_idempotent() {
        let b = bundle(
            Some(json!({ "depotwert": 1500, "eingezahlt_netto": 1200, "monatsbeitrag": 100, "startdatum": "2024-01-01" })),
            monthly_snapshots(3, date(2024, 9, 1)),
        );
        let now = at_noon(2025, 1, 15);
        let (m1, s1) = series_for(&b, now);
        let (m2, s2) = series_for(&b, now);
        assert_eq!(m1, m2);
        assert_eq!(s1, s2);
    }

    #[test]
    fn window_start_never_after_end() {
        let svc = ChartService::new();
        let end = date(2025, 1, 15);
        assert_eq!(svc.window_start(end, Some(date(2026, 1, 1))), end);
        assert_eq!(svc.window_start(end, None), end - Duration::days(365));
        assert_eq!(svc.window_start(end, Some(date(2024, 9, 1))), date(2024, 9, 1));
    }
}

// ═══════════════════════════════════════════════════════════════════
// ChartService — scale & geometry
// ═══════════════════════════════════════════════════════════════════

mod chart_geometry {
    use super::*;

    #[test]
    fn forward_fill_gaps() {
        let filled = forward_fill(&[None, Some(1.0), None, Some(f64::NAN), Some(3.0)], 9.0);
        assert_eq!(filled, vec![9.0, 1.0, 1.0, 1.0, 3.0]);
    }

    #[test]
    fn forward_fill_never_leaves_nan() {
        let filled = forward_fill(&[Some(f64::INFINITY), None, Some(f64::NAN)], 0.0);
        assert!(filled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn flat_values_get_padding_floor_or_magnitude() {
        let range = padded_range([100.0, 100.0]).expect("range");
        assert_eq!(range, ValueRange { min: 96.0, max: 104.0 });

        let zero = padded_range([0.0, 0.0]).expect("range");
        assert_eq!(zero, ValueRange { min: -1.0, max: 1.0 });
    }

    #[test]
    fn span_padding_wins_for_wide_ranges() {
        let range = padded_range([0.0, 1000.0]).expect("range");
        // max(40, 120, 1) = 120
        assert_eq!(range, ValueRange { min: -120.0, max: 1120.0 });
    }

    #[test]
    fn padded_range_ignores_non_finite() {
        assert!(padded_range([f64::NAN]).is_none());
        assert!(padded_range(Vec::<f64>::new()).is_none());
    }

    #[test]
    fn custom_padding_moves_plot_edges() {
        let layout = ChartLayout::new(100.0, 50.0).with_padding(20.0, 5.0);
        assert_eq!((layout.pad_x, layout.pad_y), (20.0, 5.0));
        let range = ValueRange { min: 0.0, max: 10.0 };
        let points = ChartService::new().project(&[0.0, 5.0, 10.0], &range, &layout);
        assert_eq!(
            points,
            vec![
                PlotPoint { x: 20.0, y: 45.0 },
                PlotPoint { x: 50.0, y: 25.0 },
                PlotPoint { x: 80.0, y: 5.0 },
            ]
        );
    }

    #[test]
    fn project_spreads_points_and_inverts_y() {
        let layout = ChartLayout::new(100.0, 50.0);
        let range = ValueRange { min: 0.0, max: 10.0 };
        let points = ChartService::new().project(&[0.0, 10.0], &range, &layout);
        assert_eq!(points, vec![PlotPoint { x: 10.0, y: 40.0 }, PlotPoint { x: 90.0, y: 10.0 }]);
    }

    #[test]
    fn line_path_format() {
        assert_eq!(line_path(&[]), "");
        let path = line_path(&[PlotPoint { x: 0.0, y: 1.0 }, PlotPoint { x: 2.5, y: 3.0 }]);
        assert_eq!(path, "M 0.00 1.00 L 2.50 3.00");
    }

    #[test]
    fn plot_empty_series_is_none() {
        let b = bundle(None, vec![]);
        let (_, series) = series_for(&b, at_noon(2025, 1, 15));
        assert!(ChartService::new().plot(&series, &ChartLayout::default()).is_none());
        assert!(ChartService::new().value_range(&series).is_none());
    }

    #[test]
    fn plot_dense_series() {
        let b = bundle(Some(json!({ "depotwert": 2000 })), monthly_snapshots(8, date(2024, 7, 1)));
        let (_, series) = series_for(&b, at_noon(2025, 3, 1));
        let layout = ChartLayout::default();
        let plotted = ChartService::new().plot(&series, &layout).expect("plot");
        assert_eq!(plotted.portfolio.len(), series.len());
        assert!(plotted.portfolio_path.starts_with("M "));
        assert!(plotted
            .portfolio
            .iter()
            .chain(&plotted.invested)
            .all(|p| p.y >= layout.pad_y && p.y <= layout.height - layout.pad_y));
        assert_eq!(plotted.portfolio[0].x, layout.pad_x);
        assert_eq!(plotted.portfolio.last().map(|p| p.x), Some(layout.width - layout.pad_x));
    }

    #[test]
    fn plot_line_area_closes_at_bottom() {
        let layout = ChartLayout::new(100.0, 50.0);
        let line = ChartService::new().plot_line(&[1.0, 2.0], ValueRange { min: 0.0, max: 3.0 }, &layout);
        assert!(line.area_path.ends_with("L 90.00 40.00 L 10.00 40.00 Z"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// PolicyService
// ═══════════════════════════════════════════════════════════════════

mod policy_list {
    use super::*;

    fn policies() -> Vec<Policy> {
        PolicyService::new().map_rows(&[
            row(json!({
                "id": "1", "versicherer": "Allianz", "produkt": "PrivatRente Perspektive",
                "monatsbeitrag": 250, "depotwert": 45780.5, "rendite": 7.8, "kategorie": "Rente",
                "performanceHistorie": [
                    { "date": "2024-02-01", "value": 40000 },
                    { "date": "2024-01-01", "value": 38000 },
                    { "date": "kaputt", "value": 1 },
                ],
            })),
            row(json!({
                "id": "2", "versicherer": "DWS", "produkt": "Top Dividende Fonds",
                "monatsbeitrag": 150, "depotwert": 28340.25, "rendite": 5.2, "kategorie": "Fonds",
            })),
            row(json!({
                "id": "5", "versicherer": "AXA", "produkt": "Krankenversicherung Komfort",
                "monatsbeitrag": 320, "depotwert": 0, "rendite": 0, "kategorie": "Kranken",
            })),
            row(json!({ "produkt": "ohne id" })),
        ])
    }

    #[test]
    fn map_rows_skips_rows_without_id() {
        assert_eq!(policies().len(), 3);
    }

    #[test]
    fn history_sorted_and_cleaned() {
        let p = &policies()[0];
        let dates: Vec<NaiveDate> = p.performance_history.iter().map(|h| h.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1)]);
    }

    #[test]
    fn filter_by_query_and_category() {
        let list = policies();
        let svc = PolicyService::new();
        assert_eq!(svc.filter(&list, "allianz", None).len(), 1);
        assert_eq!(svc.filter(&list, "FONDS", None).len(), 1);
        assert_eq!(svc.filter(&list, "", Some(PolicyCategory::Health)).len(), 1);
        assert_eq!(svc.filter(&list, "", None).len(), 3);
        assert!(svc.filter(&list, "dws", Some(PolicyCategory::Pension)).is_empty());
    }

    #[test]
    fn filter_ignores_surrounding_whitespace() {
        let list = policies();
        let svc = PolicyService::new();
        assert_eq!(svc.filter(&list, "  Allianz ", None).len(), 1);
        assert_eq!(svc.filter(&list, "   ", None).len(), 3);
    }

    #[test]
    fn totals_average_only_positive_returns() {
        let t = PolicyService::new().totals(&policies());
        assert!((t.total_value - 74120.75).abs() < 1e-9);
        assert_eq!(t.total_monthly, 720.0);
        assert!((t.average_return - 6.5).abs() < 1e-9);
        assert_eq!(t.count, 3);
    }

    #[test]
    fn totals_of_empty_list() {
        let t = PolicyService::new().totals(&[]);
        assert_eq!(t.average_return, 0.0);
        assert_eq!(t.count, 0);
    }

    #[test]
    fn shows_value() {
        let list = policies();
        assert!(list[0].shows_value());
        assert!(!list[2].shows_value());
    }

    #[test]
    fn history_range() {
        let range = PolicyService::new().history_range(&policies()[0]).expect("range");
        assert!((range.min - 36100.0).abs() < 1e-9);
        assert!((range.max - 42000.0).abs() < 1e-9);
    }

    #[test]
    fn flat_history_range_is_padded() {
        let mut p = policies().remove(0);
        for point in &mut p.performance_history {
            point.value = 0.0;
        }
        let range = PolicyService::new().history_range(&p).expect("range");
        assert!(range.span() > 0.0);
    }

    #[test]
    fn history_chart() {
        let list = policies();
        let svc = PolicyService::new();
        let chart = svc.history_chart(&list[0], &ChartLayout::default()).expect("chart");
        assert_eq!(chart.points.len(), 2);
        assert!(chart.area_path.ends_with('Z'));
        assert!(svc.history_chart(&list[1], &ChartLayout::default()).is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// DocumentService
// ═══════════════════════════════════════════════════════════════════

mod document_list {
    use super::*;

    fn documents() -> Vec<Document> {
        DocumentService::new().map_rows(&[
            row(json!({ "id": "d1", "titel": "Versicherungsschein Rente", "kategorie": "Vertrag", "policy_id": "1" })),
            row(json!({ "id": "d2", "title": "Beitragsrechnung 2024", "kategorie": "Rechnung", "policyId": "1" })),
            row(json!({ "id": "d3", "titel": "Steuerbescheinigung", "kategorie": "Bescheinigung" })),
            row(json!({ "titel": "ohne id" })),
        ])
    }

    #[test]
    fn map_rows() {
        let docs = documents();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].title, "Beitragsrechnung 2024");
        assert_eq!(docs[2].category, DocumentCategory::Certificate);
    }

    #[test]
    fn filter_keeps_backend_order() {
        let docs = documents();
        let svc = DocumentService::new();
        let ids: Vec<&str> = svc.filter(&docs, "", None).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["d1", "d2", "d3"]);
        assert_eq!(svc.filter(&docs, "rechnung", None).len(), 1);
        assert_eq!(svc.filter(&docs, "", Some(DocumentCategory::Contract)).len(), 1);
        assert!(svc.filter(&docs, "", Some(DocumentCategory::Other)).is_empty());
    }

    #[test]
    fn for_policy() {
        let docs = documents();
        let ids: Vec<&str> = DocumentService::new()
            .for_policy(&docs, "1")
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(ids, vec!["d1", "d2"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Display formatting
// ═══════════════════════════════════════════════════════════════════

mod display_format {
    use super::*;

    #[test]
    fn currency() {
        assert_eq!(format_currency_eur(1234.5), "1.234,50 €");
        assert_eq!(format_currency_eur(0.0), "0,00 €");
        assert_eq!(format_currency_eur(999.999), "1.000,00 €");
        assert_eq!(format_currency_eur(1_234_567.891), "1.234.567,89 €");
    }

    #[test]
    fn negative_currency() {
        assert_eq!(format_currency_eur(-1234.5), "-1.234,50 €");
        assert_eq!(format_currency_eur(-0.001), "0,00 €");
    }

    #[test]
    fn non_finite_currency() {
        assert_eq!(format_currency_eur(f64::NAN), "0,00 €");
        assert_eq!(format_currency_eur(f64::INFINITY), "0,00 €");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(5.2), "+5.20%");
        assert_eq!(format_percent(-1.0), "-1.00%");
        assert_eq!(format_percent(0.0), "+0.00%");
        assert_eq!(format_percent(-0.0), "+0.00%");
    }

    #[test]
    fn date() {
        assert_eq!(format_date_de(super::date(2024, 3, 1)), "01.03.2024");
    }
}
