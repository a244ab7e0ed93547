use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::transform::{merged_years, parse_year_keyed};
use crate::types::{DataPoint, Tonnes, Year, YearSeries, MAX_DISPLAY_YEAR, MIN_DISPLAY_YEAR};

/// Raw values arrive in kilograms-scale units; the display layer works in
/// tonnes-scale, a factor of 1000 smaller.
const RAW_UNIT_DIVISOR: Tonnes = dec!(1_000);

/// A nation or region as the API returns it: four year-keyed
/// sub-collections, including a precomputed carbon-law curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRegion {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emissions: BTreeMap<String, Option<Tonnes>>,
    #[serde(default)]
    pub approximated_historical_emission: BTreeMap<String, Option<Tonnes>>,
    #[serde(default)]
    pub trend: BTreeMap<String, Option<Tonnes>>,
    #[serde(default)]
    pub carbon_law: BTreeMap<String, Option<Tonnes>>,
}

/// Merge a nation's or region's four sub-collections into one ascending
/// `DataPoint` list, converting raw units and clipping to the valid display
/// window.
///
/// Missing data is detected with an explicit null check: a raw `0` is a
/// reported zero and survives as `Some(0)`, it is not conflated with "no
/// data".
pub fn transform_nation_or_region_emissions(region: &RawRegion) -> Vec<DataPoint> {
    let emissions = scale(parse_year_keyed(&region.emissions));
    let approximated = scale(parse_year_keyed(&region.approximated_historical_emission));
    let trend = scale(parse_year_keyed(&region.trend));
    let carbon_law = scale(parse_year_keyed(&region.carbon_law));

    let years: BTreeSet<Year> = merged_years([
        &region.emissions,
        &region.approximated_historical_emission,
        &region.trend,
        &region.carbon_law,
    ])
    .into_iter()
    .filter(|y| (MIN_DISPLAY_YEAR..=MAX_DISPLAY_YEAR).contains(y))
    .collect();

    years
        .into_iter()
        .map(|year| DataPoint {
            year,
            total: emissions.get(&year).copied(),
            approximated: approximated.get(&year).copied(),
            trend: trend.get(&year).copied(),
            carbon_law: carbon_law.get(&year).copied(),
        })
        .collect()
}

fn scale(series: YearSeries) -> YearSeries {
    series
        .into_iter()
        .map(|(year, value)| (year, value / RAW_UNIT_DIVISOR))
        .collect()
}
