use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::KlimatError;
use crate::series::{current_year, trapezoidal_integration, year_range};
use crate::types::{with_metadata, ComputationOutput, Percent, Rate, Tonnes, Year, YearSeries};
use crate::KlimatResult;

/// Base year the Carbon-Law decline curve is anchored at.
pub const CARBON_LAW_BASE_YEAR: Year = 2025;

/// Horizon year through which compliance is evaluated.
pub const CARBON_LAW_HORIZON_YEAR: Year = 2050;

/// Fixed annual reduction rate of the Carbon-Law curve.
pub const CARBON_LAW_ANNUAL_REDUCTION_RATE: Rate = dec!(0.1172);

/// Sentinel budget delta for entities whose projected 2025 emissions are
/// already at or below zero: trivially under budget. Callers test identity
/// against this constant, not magnitude.
pub const UNDER_BUDGET_SENTINEL: Tonnes = dec!(-1_000_000_000);

/// A series whose latest reported year lags "now" by more than this many
/// years gets a staleness warning in its report.
const STALE_DATA_YEARS: Year = 2;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A least-squares line fitted to an entity's historical yearly emissions.
/// Purely a function of its input series: the same series always yields the
/// same coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    /// Tonnes per year
    pub slope: Decimal,
    pub intercept: Decimal,
    /// First year used for the fit
    pub base_year: Year,
}

impl TrendAnalysis {
    /// Predicted emissions at an arbitrary year.
    pub fn evaluate_at(&self, year: Year) -> Tonnes {
        self.slope * Decimal::from(year) + self.intercept
    }
}

/// Bundled trend analysis for one entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trendline: Option<TrendAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_paris: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_budget_tonnes: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_from_base_year_pct: Option<Percent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_year: Option<Year>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_year: Option<Year>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Ordinary least-squares linear fit over the series' (year, value) points.
/// Returns None when fewer than two points exist: a line cannot be fit.
pub fn calculate_trendline(series: &YearSeries) -> Option<TrendAnalysis> {
    if series.len() < 2 {
        return None;
    }

    let n = Decimal::from(series.len() as i64);
    let mut sum_x = Decimal::ZERO;
    let mut sum_y = Decimal::ZERO;
    let mut sum_xy = Decimal::ZERO;
    let mut sum_xx = Decimal::ZERO;

    for (&year, &value) in series {
        let x = Decimal::from(year);
        sum_x += x;
        sum_y += value;
        sum_xy += x * value;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator.is_zero() {
        // Distinct map keys make this unreachable for n >= 2, but a fit over
        // a degenerate x-spread has no answer either way.
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    let base_year = *series.keys().next()?;

    Some(TrendAnalysis {
        slope,
        intercept,
        base_year,
    })
}

/// Whether the fitted trend, projected forward, stays within the Carbon-Law
/// decline curve anchored at the trend's 2025 estimate: cumulative integrated
/// trend emissions over [2025, 2050] must not exceed the cumulative
/// integrated Carbon-Law emissions over the same interval.
pub fn calculate_meets_paris(trend: &TrendAnalysis) -> bool {
    let base_value = trend.evaluate_at(CARBON_LAW_BASE_YEAR);
    if base_value <= Decimal::ZERO {
        return true;
    }

    let trend_cumulative = calculate_cumulative_emissions(
        base_value,
        trend.slope,
        CARBON_LAW_BASE_YEAR,
        CARBON_LAW_HORIZON_YEAR,
    );
    let carbon_law_cumulative = calculate_carbon_law_cumulative_emissions(
        base_value,
        CARBON_LAW_BASE_YEAR,
        CARBON_LAW_HORIZON_YEAR,
    );

    trend_cumulative <= carbon_law_cumulative
}

/// Carbon-Law value at `year` for a curve anchored at `base_value` in
/// `base_year`: geometric decay at the fixed annual reduction rate.
pub fn carbon_law_value(base_value: Tonnes, base_year: Year, year: Year) -> Tonnes {
    let retention = Decimal::ONE - CARBON_LAW_ANNUAL_REDUCTION_RATE;
    base_value * retention.powi((year - base_year) as i64)
}

/// Cumulative emissions of the Carbon-Law curve: geometric decay at the
/// fixed annual reduction rate from `base_value`, sampled at each year in
/// [base_year, horizon_year] and trapezoid-integrated.
pub fn calculate_carbon_law_cumulative_emissions(
    base_value: Tonnes,
    base_year: Year,
    horizon_year: Year,
) -> Tonnes {
    let curve: YearSeries = year_range(base_year, horizon_year)
        .into_iter()
        .map(|year| (year, carbon_law_value(base_value, base_year, year)))
        .collect();
    trapezoidal_integration(&curve)
}

/// Cumulative emissions of the linear extrapolation from `base_value` with
/// the given slope, sampled at each year in [base_year, horizon_year] and
/// trapezoid-integrated.
pub fn calculate_cumulative_emissions(
    base_value: Tonnes,
    slope: Decimal,
    base_year: Year,
    horizon_year: Year,
) -> Tonnes {
    let curve: YearSeries = year_range(base_year, horizon_year)
        .into_iter()
        .map(|year| (year, base_value + slope * Decimal::from(year - base_year)))
        .collect();
    trapezoidal_integration(&curve)
}

/// Tonnes over (positive) or under (negative) the Carbon-Law budget through
/// 2050. None without a trend; the under-budget sentinel when the projected
/// 2025 emissions are already at or below zero.
pub fn calculate_carbon_budget_tonnes(trend: Option<&TrendAnalysis>) -> Option<Tonnes> {
    let trend = trend?;
    let base_value = trend.evaluate_at(CARBON_LAW_BASE_YEAR);
    if base_value <= Decimal::ZERO {
        return Some(UNDER_BUDGET_SENTINEL);
    }

    let trend_cumulative = calculate_cumulative_emissions(
        base_value,
        trend.slope,
        CARBON_LAW_BASE_YEAR,
        CARBON_LAW_HORIZON_YEAR,
    );
    let carbon_law_cumulative = calculate_carbon_law_cumulative_emissions(
        base_value,
        CARBON_LAW_BASE_YEAR,
        CARBON_LAW_HORIZON_YEAR,
    );

    Some(trend_cumulative - carbon_law_cumulative)
}

/// Percentage change between the earliest and latest reported years.
/// None with fewer than two points or a zero base value; a degenerate
/// division never leaks out as NaN or infinity.
pub fn calculate_emissions_change_from_base_year(series: &YearSeries) -> Option<Percent> {
    if series.len() < 2 {
        return None;
    }
    let (_, &base_value) = series.iter().next()?;
    let (_, &latest_value) = series.iter().next_back()?;
    if base_value.is_zero() {
        return None;
    }
    Some((latest_value - base_value) / base_value * dec!(100))
}

/// Full trend analysis for one entity's historical series, wrapped in the
/// standard computation envelope. Evaluates staleness against the wall-clock
/// year; see [`analyze_trend_at`] for the explicit-year form.
pub fn analyze_trend(series: &YearSeries) -> KlimatResult<ComputationOutput<TrendReport>> {
    analyze_trend_at(series, current_year())
}

/// [`analyze_trend`] with the reference year passed in. The year only drives
/// the stale-data warning; the fit and verdicts are functions of the series
/// alone.
pub fn analyze_trend_at(
    series: &YearSeries,
    reference_year: Year,
) -> KlimatResult<ComputationOutput<TrendReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_years(series)?;

    if series.len() < 2 {
        warnings.push(
            "Fewer than two reported years; no trend can be fitted for this entity.".into(),
        );
    }

    let trendline = calculate_trendline(series);
    let meets_paris = trendline.as_ref().map(calculate_meets_paris);
    let carbon_budget_tonnes = calculate_carbon_budget_tonnes(trendline.as_ref());
    let change_from_base_year_pct = calculate_emissions_change_from_base_year(series);

    if let Some(t) = &trendline {
        if t.slope > Decimal::ZERO {
            warnings.push("Fitted emissions trend is increasing year over year.".into());
        }
    }
    if series.len() >= 2 && change_from_base_year_pct.is_none() {
        warnings.push("Base year emissions are zero; change from base year is undefined.".into());
    }
    if let Some(&latest) = series.keys().next_back() {
        if reference_year - latest > STALE_DATA_YEARS {
            warnings.push(format!(
                "Latest reported year {latest} lags {reference_year} by more than \
                 {STALE_DATA_YEARS} years; the fitted trend may be stale."
            ));
        }
    }

    let report = TrendReport {
        base_year: series.keys().next().copied(),
        latest_year: series.keys().next_back().copied(),
        trendline,
        meets_paris,
        carbon_budget_tonnes,
        change_from_base_year_pct,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "fit": "ordinary least squares over reported years",
        "carbon_law_base_year": CARBON_LAW_BASE_YEAR,
        "carbon_law_horizon_year": CARBON_LAW_HORIZON_YEAR,
        "carbon_law_annual_reduction_rate": CARBON_LAW_ANNUAL_REDUCTION_RATE,
        "cumulative_method": "yearly sampling, trapezoid rule",
        "under_budget_sentinel": UNDER_BUDGET_SENTINEL,
    });

    Ok(with_metadata(
        "Emissions Trend Analysis (OLS projection vs Carbon Law decline)",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_years(series: &YearSeries) -> KlimatResult<()> {
    for &year in series.keys() {
        if !(1800..=2200).contains(&year) {
            return Err(KlimatError::InvalidInput {
                field: "series".into(),
                reason: format!("Year {year} is outside the plausible range 1800-2200."),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series(points: &[(Year, Decimal)]) -> YearSeries {
        points.iter().copied().collect()
    }

    fn declining_series() -> YearSeries {
        series(&[(2015, dec!(150)), (2016, dec!(140)), (2017, dec!(130))])
    }

    #[test]
    fn test_trendline_perfect_line() {
        let t = calculate_trendline(&declining_series()).unwrap();
        assert_eq!(t.slope, dec!(-10));
        assert_eq!(t.intercept, dec!(20300));
        assert_eq!(t.base_year, 2015);
        assert_eq!(t.evaluate_at(2018), dec!(120));
    }

    #[test]
    fn test_trendline_single_point_is_none() {
        let s = series(&[(2020, dec!(100))]);
        assert!(calculate_trendline(&s).is_none());
    }

    #[test]
    fn test_trendline_empty_is_none() {
        assert!(calculate_trendline(&YearSeries::new()).is_none());
    }

    #[test]
    fn test_trendline_referential_transparency() {
        let s = series(&[(2018, dec!(97.3)), (2020, dec!(88.1)), (2023, dec!(71.9))]);
        let first = calculate_trendline(&s).unwrap();
        let second = calculate_trendline(&s).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_meets_paris_steep_decline() {
        // 100 at 2025 falling 20/year crosses zero in 2030; cumulative trend
        // emissions are far below any positive Carbon-Law total.
        let t = TrendAnalysis {
            slope: dec!(-20),
            intercept: dec!(100) + dec!(20) * dec!(2025),
            base_year: 2020,
        };
        assert!(calculate_meets_paris(&t));
    }

    #[test]
    fn test_meets_paris_flat_trend_fails() {
        let t = TrendAnalysis {
            slope: Decimal::ZERO,
            intercept: dec!(100),
            base_year: 2020,
        };
        assert!(!calculate_meets_paris(&t));
    }

    #[test]
    fn test_meets_paris_nonpositive_2025_is_trivially_true() {
        let t = TrendAnalysis {
            slope: Decimal::ZERO,
            intercept: Decimal::ZERO,
            base_year: 2020,
        };
        assert!(calculate_meets_paris(&t));
    }

    #[test]
    fn test_carbon_law_cumulative_one_step() {
        // (100 + 100 * 0.8828) / 2 = 94.14
        let total = calculate_carbon_law_cumulative_emissions(dec!(100), 2025, 2026);
        assert_eq!(total, dec!(94.14));
    }

    #[test]
    fn test_carbon_law_cumulative_degenerate_interval() {
        assert_eq!(
            calculate_carbon_law_cumulative_emissions(dec!(100), 2025, 2025),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_cumulative_emissions_linear() {
        // 100, 90, 80 over two years: 95 + 85 = 180
        let total = calculate_cumulative_emissions(dec!(100), dec!(-10), 2025, 2027);
        assert_eq!(total, dec!(180));
    }

    #[test]
    fn test_carbon_budget_none_without_trend() {
        assert!(calculate_carbon_budget_tonnes(None).is_none());
    }

    #[test]
    fn test_carbon_budget_sentinel_for_nonpositive_2025() {
        let t = TrendAnalysis {
            slope: dec!(-5),
            intercept: dec!(5) * dec!(2025) - dec!(10),
            base_year: 2015,
        };
        assert!(t.evaluate_at(2025) <= Decimal::ZERO);
        assert_eq!(calculate_carbon_budget_tonnes(Some(&t)), Some(UNDER_BUDGET_SENTINEL));
    }

    #[test]
    fn test_carbon_budget_flat_trend_is_over_budget() {
        let t = TrendAnalysis {
            slope: Decimal::ZERO,
            intercept: dec!(100),
            base_year: 2020,
        };
        let budget = calculate_carbon_budget_tonnes(Some(&t)).unwrap();
        // Flat 100 t/year integrates to 2500; the Carbon-Law total is lower.
        assert!(budget > Decimal::ZERO);
        let expected = dec!(2500)
            - calculate_carbon_law_cumulative_emissions(dec!(100), 2025, 2050);
        assert_eq!(budget, expected);
    }

    #[test]
    fn test_change_from_base_year() {
        let s = series(&[(2015, dec!(100)), (2020, dec!(80))]);
        assert_eq!(calculate_emissions_change_from_base_year(&s), Some(dec!(-20)));
    }

    #[test]
    fn test_change_from_base_year_zero_base_is_none() {
        let s = series(&[(2015, dec!(0)), (2020, dec!(80))]);
        assert!(calculate_emissions_change_from_base_year(&s).is_none());
    }

    #[test]
    fn test_change_from_base_year_single_point_is_none() {
        let s = series(&[(2020, dec!(80))]);
        assert!(calculate_emissions_change_from_base_year(&s).is_none());
    }

    #[test]
    fn test_analyze_trend_report() {
        let report = analyze_trend(&declining_series()).unwrap();
        let r = &report.result;
        assert_eq!(r.base_year, Some(2015));
        assert_eq!(r.latest_year, Some(2017));
        assert!(r.trendline.is_some());
        assert!(r.meets_paris.is_some());
        assert!(r.carbon_budget_tonnes.is_some());
        assert_eq!(report.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_analyze_trend_sparse_series_warns() {
        let s = series(&[(2020, dec!(100))]);
        let report = analyze_trend(&s).unwrap();
        assert!(report.warnings.iter().any(|w| w.contains("Fewer than two")));
        assert!(report.result.trendline.is_none());
        assert!(report.result.meets_paris.is_none());
    }

    #[test]
    fn test_analyze_trend_at_warns_on_stale_data() {
        let report = analyze_trend_at(&declining_series(), 2026).unwrap();
        assert!(report.warnings.iter().any(|w| w.contains("stale")));
    }

    #[test]
    fn test_analyze_trend_at_fresh_data_has_no_warnings() {
        let report = analyze_trend_at(&declining_series(), 2018).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_analyze_trend_at_boundary_lag_is_not_stale() {
        // Latest year 2017, reference 2019: exactly the allowed lag.
        let report = analyze_trend_at(&declining_series(), 2019).unwrap();
        assert!(!report.warnings.iter().any(|w| w.contains("stale")));
    }

    #[test]
    fn test_analyze_trend_rejects_implausible_year() {
        let s = series(&[(12020, dec!(100)), (12021, dec!(90))]);
        let err = analyze_trend(&s).unwrap_err();
        match err {
            KlimatError::InvalidInput { field, .. } => assert_eq!(field, "series"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }
}
