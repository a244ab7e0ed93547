use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::series::year_from_iso_date;
use crate::types::{ScopeDataPoint, Tonnes, YearSeries};

// ---------------------------------------------------------------------------
// Raw API shapes
// ---------------------------------------------------------------------------

/// A sub-field carrying a plain reported total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScopeTotal {
    #[serde(default)]
    pub total: Option<Tonnes>,
}

/// A sub-field carrying a derived total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCalculatedScope {
    #[serde(default)]
    pub calculated_total_emissions: Option<Tonnes>,
}

/// Scope 2 as the detail endpoint reports it: market-based, location-based,
/// and a derived total.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScope2 {
    #[serde(default)]
    pub mb: Option<Tonnes>,
    #[serde(default)]
    pub lb: Option<Tonnes>,
    #[serde(default)]
    pub unknown: Option<Tonnes>,
    #[serde(default)]
    pub calculated_total_emissions: Option<Tonnes>,
}

/// One GHG Protocol Scope 3 category entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScope3Category {
    #[serde(default)]
    pub category: Option<u32>,
    #[serde(default)]
    pub total: Option<Tonnes>,
}

/// Scope 3 as the detail endpoint reports it, with the category breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScope3 {
    #[serde(default)]
    pub calculated_total_emissions: Option<Tonnes>,
    #[serde(default)]
    pub categories: Vec<RawScope3Category>,
}

/// Company emissions as the list endpoint returns them: derived totals only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmissions {
    #[serde(default)]
    pub calculated_total_emissions: Option<Tonnes>,
    #[serde(default)]
    pub scope1: Option<RawScopeTotal>,
    #[serde(default)]
    pub scope2: Option<RawCalculatedScope>,
    #[serde(default)]
    pub scope3: Option<RawCalculatedScope>,
    #[serde(default)]
    pub scope1_and2: Option<RawScopeTotal>,
    #[serde(default)]
    pub biogenic_emissions: Option<RawScopeTotal>,
    #[serde(default)]
    pub stated_total_emissions: Option<RawScopeTotal>,
}

/// Company emissions as the detail endpoint returns them: full scope 2
/// breakdown and the scope 3 category list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailEmissions {
    #[serde(default)]
    pub calculated_total_emissions: Option<Tonnes>,
    #[serde(default)]
    pub scope1: Option<RawScopeTotal>,
    #[serde(default)]
    pub scope2: Option<RawScope2>,
    #[serde(default)]
    pub scope3: Option<RawScope3>,
    #[serde(default)]
    pub scope1_and2: Option<RawScopeTotal>,
    #[serde(default)]
    pub biogenic_emissions: Option<RawScopeTotal>,
    #[serde(default)]
    pub stated_total_emissions: Option<RawScopeTotal>,
}

/// The two upstream response shapes, discriminated by the caller: list
/// payloads carry derived totals, detail payloads the full breakdown.
#[derive(Debug, Clone)]
pub enum RawCompanyEmissions {
    List(ListEmissions),
    Detail(DetailEmissions),
}

/// One reporting period from the company detail endpoint. The year is the
/// first four characters of `endDate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReportingPeriod {
    pub end_date: String,
    #[serde(default)]
    pub emissions: Option<DetailEmissions>,
}

// ---------------------------------------------------------------------------
// Normalized shape
// ---------------------------------------------------------------------------

/// Company emissions with every null sub-total dropped and the scope1+2
/// fallback applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedEmissions {
    /// Calculated total, falling back to scope1And2 when null or zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope1: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope2: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope3: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope1_and2: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biogenic_emissions: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stated_total_emissions: Option<Tonnes>,
    /// Scope 3 category number → emissions; detail payloads only
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<u32, Tonnes>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Normalize either raw shape, dispatching on the variant.
pub fn clean_emissions(raw: &RawCompanyEmissions) -> CleanedEmissions {
    match raw {
        RawCompanyEmissions::List(e) => clean_list_emissions(e),
        RawCompanyEmissions::Detail(e) => clean_detail_emissions(e),
    }
}

/// Normalize a list-endpoint payload.
pub fn clean_list_emissions(raw: &ListEmissions) -> CleanedEmissions {
    let scope1_and2 = raw.scope1_and2.as_ref().and_then(|s| s.total);
    CleanedEmissions {
        total: total_with_fallback(raw.calculated_total_emissions, scope1_and2),
        scope1: raw.scope1.as_ref().and_then(|s| s.total),
        scope2: raw.scope2.as_ref().and_then(|s| s.calculated_total_emissions),
        scope3: raw.scope3.as_ref().and_then(|s| s.calculated_total_emissions),
        scope1_and2,
        biogenic_emissions: raw.biogenic_emissions.as_ref().and_then(|s| s.total),
        stated_total_emissions: raw.stated_total_emissions.as_ref().and_then(|s| s.total),
        categories: BTreeMap::new(),
    }
}

/// Normalize a detail-endpoint payload, keeping the scope 3 categories.
pub fn clean_detail_emissions(raw: &DetailEmissions) -> CleanedEmissions {
    let scope1_and2 = raw.scope1_and2.as_ref().and_then(|s| s.total);
    let categories = raw
        .scope3
        .as_ref()
        .map(|s3| {
            s3.categories
                .iter()
                .filter_map(|c| Some((c.category?, c.total?)))
                .collect()
        })
        .unwrap_or_default();

    CleanedEmissions {
        total: total_with_fallback(raw.calculated_total_emissions, scope1_and2),
        scope1: raw.scope1.as_ref().and_then(|s| s.total),
        scope2: raw.scope2.as_ref().and_then(|s| s.calculated_total_emissions),
        scope3: raw.scope3.as_ref().and_then(|s| s.calculated_total_emissions),
        scope1_and2,
        biogenic_emissions: raw.biogenic_emissions.as_ref().and_then(|s| s.total),
        stated_total_emissions: raw.stated_total_emissions.as_ref().and_then(|s| s.total),
        categories,
    }
}

/// Historical yearly totals from a company's reporting periods. Periods
/// without a parseable end date or a usable total are skipped.
pub fn reporting_periods_to_series(periods: &[RawReportingPeriod]) -> YearSeries {
    periods
        .iter()
        .filter_map(|p| {
            let year = year_from_iso_date(&p.end_date)?;
            let total = clean_detail_emissions(p.emissions.as_ref()?).total?;
            Some((year, total))
        })
        .collect()
}

/// Per-year scope breakdowns from a company's reporting periods, for the
/// scope and category chart views.
pub fn reporting_periods_to_scope_points(periods: &[RawReportingPeriod]) -> Vec<ScopeDataPoint> {
    let mut points: Vec<ScopeDataPoint> = periods
        .iter()
        .filter_map(|p| {
            let year = year_from_iso_date(&p.end_date)?;
            let cleaned = clean_detail_emissions(p.emissions.as_ref()?);
            Some(ScopeDataPoint {
                year,
                total: cleaned.total,
                scope1: cleaned.scope1,
                scope2: cleaned.scope2,
                scope3: cleaned.scope3,
                categories: cleaned.categories,
            })
        })
        .collect();
    points.sort_by_key(|p| p.year);
    points
}

fn total_with_fallback(calculated: Option<Tonnes>, scope1_and2: Option<Tonnes>) -> Option<Tonnes> {
    match calculated {
        Some(total) if total != Decimal::ZERO => Some(total),
        _ => scope1_and2.or(calculated),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
