//! Revenue analytics helpers.
//!
//! Pure transforms applied to a normalized report just before display or
//! export: the what-if revenue override and period-over-period growth
//! rates for the revenue timeseries. Neither touches the stored raw
//! report, so an override can be cleared without losing data.

use serde::{Deserialize, Serialize};

use crate::report::{ReportDocument, SeriesPoint};

/// A revenue series point annotated with its growth rate relative to the
/// previous period, as a percentage rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Period label carried over from the source point.
    pub period: String,
    /// Revenue value carried over from the source point.
    pub value: f64,
    /// Growth versus the previous point, in percent. The first point and
    /// any point following a zero-revenue period report 0.
    pub growth_pct: f64,
}

/// Rounds to two decimal places for display-friendly figures.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Annotates a revenue series with period-over-period growth percentages.
///
/// The first point has no predecessor and reports 0. A zero previous
/// value would divide by zero, so those points also report 0 rather than
/// an infinite rate.
pub fn compute_mom_growth(series: &[SeriesPoint]) -> Vec<GrowthPoint> {
    series
        .iter()
        .enumerate()
        .map(|(index, point)| {
            let growth_pct = if index == 0 {
                0.0
            } else {
                let previous = series[index - 1].value;
                if previous == 0.0 {
                    0.0
                } else {
                    round2((point.value - previous) / previous * 100.0)
                }
            };
            GrowthPoint {
                period: point.period.clone(),
                value: point.value,
                growth_pct,
            }
        })
        .collect()
}

/// Applies a what-if revenue override to a normalized report.
///
/// When the report carries a latest quarter with positive revenue, that
/// figure is replaced and the revenue timeseries is rescaled by the same
/// factor so the chart stays proportional. Without a usable quarter the
/// series is rescaled against its final point instead. With neither, the
/// report comes back unchanged. `None` or a non-finite override is a
/// no-op.
pub fn apply_revenue_override(
    report: &ReportDocument,
    new_revenue: Option<f64>,
) -> ReportDocument {
    let Some(target) = new_revenue.filter(|value| value.is_finite()) else {
        return report.clone();
    };

    let mut adjusted = report.clone();

    if let Some(latest) = adjusted.financial_analysis.latest_quarter.as_mut() {
        if latest.revenue > 0.0 {
            let factor = target / latest.revenue;
            latest.revenue = target;
            scale_series(
                &mut adjusted
                    .internal_data_analysis
                    .computed_metrics
                    .revenue_timeseries,
                factor,
            );
            return adjusted;
        }
    }

    let series = &mut adjusted
        .internal_data_analysis
        .computed_metrics
        .revenue_timeseries;
    if !series.is_empty() {
        let last = series.last().map(|point| point.value).unwrap_or(1.0);
        let base = if last == 0.0 { 1.0 } else { last };
        let factor = target / base;
        scale_series(series, factor);
    }

    adjusted
}

fn scale_series(series: &mut [SeriesPoint], factor: f64) {
    for point in series.iter_mut() {
        point.value = round2(point.value * factor);
    }
}
