use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::transform::{merged_years, parse_year_keyed};
use crate::trend::{carbon_law_value, CARBON_LAW_BASE_YEAR};
use crate::types::{DataPoint, Tonnes, Year, MAX_DISPLAY_YEAR, MIN_DISPLAY_YEAR};

/// A municipality as the API returns it: three year-keyed sub-collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMunicipality {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub emissions: BTreeMap<String, Option<Tonnes>>,
    #[serde(default)]
    pub approximated_historical_emission: BTreeMap<String, Option<Tonnes>>,
    #[serde(default)]
    pub trend: BTreeMap<String, Option<Tonnes>>,
}

/// Merge a municipality's observed, approximated, and trend sub-collections
/// into one ascending `DataPoint` list. For years from the Carbon-Law base
/// year on, a `carbonLaw` target is derived from the best available 2025
/// baseline: the actual value, else the approximated one. Output is clipped
/// to the valid display window.
pub fn transform_municipality_emissions(municipality: &RawMunicipality) -> Vec<DataPoint> {
    let emissions = parse_year_keyed(&municipality.emissions);
    let approximated = parse_year_keyed(&municipality.approximated_historical_emission);
    let trend = parse_year_keyed(&municipality.trend);

    let baseline_2025 = emissions
        .get(&CARBON_LAW_BASE_YEAR)
        .or_else(|| approximated.get(&CARBON_LAW_BASE_YEAR))
        .copied();

    let years: BTreeSet<Year> = merged_years([
        &municipality.emissions,
        &municipality.approximated_historical_emission,
        &municipality.trend,
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
            carbon_law: match baseline_2025 {
                Some(base) if year >= CARBON_LAW_BASE_YEAR => {
                    Some(carbon_law_value(base, CARBON_LAW_BASE_YEAR, year))
                }
                _ => None,
            },
        })
        .collect()
}
