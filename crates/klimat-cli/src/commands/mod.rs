pub mod ranking;
pub mod series;
pub mod transform;
pub mod trend;

use klimat_core::transform::parse_year_keyed;
use klimat_core::types::{Tonnes, YearSeries};
use std::collections::BTreeMap;

/// Build a year series from the CLI's year-keyed JSON input shape,
/// e.g. `{"2019": 110000, "2020": 100000}`.
pub(crate) fn series_from_input(map: &BTreeMap<String, Option<Tonnes>>) -> YearSeries {
    parse_year_keyed(map)
}
