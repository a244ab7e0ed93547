use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use klimat_core::ranking::KeyEcho;
use klimat_core::types::{KpiValue, RankedListItem, Tonnes, YearSeries};
use klimat_core::units::Locale;
use std::collections::BTreeMap;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// The dashboard sends yearly series as year-keyed JSON objects.
fn parse_series(input_json: &str) -> NapiResult<YearSeries> {
    let raw: BTreeMap<String, Option<Tonnes>> =
        serde_json::from_str(input_json).map_err(to_napi_error)?;
    Ok(klimat_core::transform::parse_year_keyed(&raw))
}

// ---------------------------------------------------------------------------
// Trend analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn fit_trendline(input_json: String) -> NapiResult<String> {
    let series = parse_series(&input_json)?;
    let output = klimat_core::trend::analyze_trend(&series).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn meets_paris(input_json: String) -> NapiResult<Option<bool>> {
    let series = parse_series(&input_json)?;
    let trendline = klimat_core::trend::calculate_trendline(&series);
    Ok(trendline.as_ref().map(klimat_core::trend::calculate_meets_paris))
}

#[napi]
pub fn carbon_budget(input_json: String) -> NapiResult<String> {
    let series = parse_series(&input_json)?;
    let trendline = klimat_core::trend::calculate_trendline(&series);
    let budget = klimat_core::trend::calculate_carbon_budget_tonnes(trendline.as_ref());
    serde_json::to_string(&budget).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Entity transforms
// ---------------------------------------------------------------------------

#[napi]
pub fn transform_municipality(input_json: String) -> NapiResult<String> {
    let raw: klimat_core::transform::municipality::RawMunicipality =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let points = klimat_core::transform::municipality::transform_municipality_emissions(&raw);
    serde_json::to_string(&points).map_err(to_napi_error)
}

#[napi]
pub fn transform_region(input_json: String) -> NapiResult<String> {
    let raw: klimat_core::transform::region::RawRegion =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let points = klimat_core::transform::region::transform_nation_or_region_emissions(&raw);
    serde_json::to_string(&points).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RankRequest {
    kpi: KpiValue,
    entities: Vec<RankedListItem>,
    #[serde(default)]
    formatted: bool,
}

#[napi]
pub fn sort_by_kpi(input_json: String) -> NapiResult<String> {
    let request: RankRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let sorted = klimat_core::ranking::sort_by_kpi(&request.entities, &request.kpi);

    if request.formatted {
        let rows: Vec<serde_json::Value> = sorted
            .iter()
            .map(|entity| {
                serde_json::json!({
                    "id": entity.id,
                    "displayName": entity.display_name,
                    "value": entity.cell(&request.kpi.key),
                    "formatted": klimat_core::ranking::format_kpi_value(
                        &entity.cell(&request.kpi.key),
                        &request.kpi,
                        &KeyEcho,
                        Locale::Sv,
                    ),
                })
            })
            .collect();
        return serde_json::to_string(&rows).map_err(to_napi_error);
    }

    serde_json::to_string(&sorted).map_err(to_napi_error)
}
