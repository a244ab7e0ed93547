//! Normalizes heterogeneous raw API entity shapes into the common
//! `YearSeries`/`DataPoint` shapes the rest of the engine consumes.

pub mod company;
pub mod municipality;
pub mod region;

use std::collections::{BTreeMap, BTreeSet};

use crate::series::parse_year;
use crate::types::{Tonnes, Year, YearSeries};

/// Parse a string-keyed, possibly-null-valued JSON map into a year series.
/// Non-numeric keys and null values are silently excluded: malformed years
/// are not fatal, and null means "no value", not zero.
pub fn parse_year_keyed(map: &BTreeMap<String, Option<Tonnes>>) -> YearSeries {
    map.iter()
        .filter_map(|(key, value)| Some((parse_year(key)?, (*value)?)))
        .collect()
}

/// Union of valid years across several raw year-keyed maps. A year whose
/// value is null is still a present year; only malformed keys are excluded.
pub(crate) fn merged_years<'a>(
    maps: impl IntoIterator<Item = &'a BTreeMap<String, Option<Tonnes>>>,
) -> BTreeSet<Year> {
    maps.into_iter()
        .flat_map(|map| map.keys())
        .filter_map(|key| parse_year(key))
        .collect()
}
