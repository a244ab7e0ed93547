use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::KlimatError;
use crate::types::{DataPoint, KpiCell, KpiValue, RankedListItem, ScopeDataPoint, Tonnes, Year};
use crate::units::{format_number, Locale};
use crate::KlimatResult;

// ---------------------------------------------------------------------------
// Translation injection
// ---------------------------------------------------------------------------

/// Translation is injected, never pulled from a global. The engine hands
/// keys to this trait and the caller decides the catalogue.
pub trait Translate {
    fn t(&self, key: &str) -> String;
}

/// Passes translation keys through unchanged. Default for the CLI and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyEcho;

impl Translate for KeyEcho {
    fn t(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Map-backed catalogue; unknown keys fall back to the key itself.
#[derive(Debug, Clone, Default)]
pub struct StaticTranslations(BTreeMap<String, String>);

impl StaticTranslations {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        StaticTranslations(entries.into_iter().collect())
    }
}

impl Translate for StaticTranslations {
    fn t(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_else(|| key.to_string())
    }
}

/// Translation key shown when a KPI has no configured null label.
const NO_DATA_KEY: &str = "noData";

// ---------------------------------------------------------------------------
// Public API — sorting
// ---------------------------------------------------------------------------

/// Stable-sorted copy of the entities under the given KPI descriptor. Does
/// not mutate the input. Entities with a null value for the KPI's key sort
/// strictly last regardless of direction; booleans compare as 1/0.
pub fn sort_by_kpi(entities: &[RankedListItem], kpi: &KpiValue) -> Vec<RankedListItem> {
    let mut sorted = entities.to_vec();
    sorted.sort_by(|a, b| compare_cells(&a.cell(&kpi.key), &b.cell(&kpi.key), kpi.higher_is_better));
    sorted
}

fn compare_cells(a: &KpiCell, b: &KpiCell, higher_is_better: bool) -> Ordering {
    match (rank_value(a), rank_value(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            if higher_is_better {
                b.cmp(&a)
            } else {
                a.cmp(&b)
            }
        }
    }
}

fn rank_value(cell: &KpiCell) -> Option<Decimal> {
    match cell {
        KpiCell::Number(n) => Some(*n),
        KpiCell::Bool(true) => Some(Decimal::ONE),
        KpiCell::Bool(false) => Some(Decimal::ZERO),
        KpiCell::Null => None,
    }
}

// ---------------------------------------------------------------------------
// Public API — KPI display formatting
// ---------------------------------------------------------------------------

/// Display string for one entity's KPI cell. Null cells use the KPI's
/// configured null label (translated) or a generic no-data label; booleans
/// use the KPI's boolean labels; numbers render with one decimal place.
pub fn format_kpi_value(
    cell: &KpiCell,
    kpi: &KpiValue,
    translate: &dyn Translate,
    locale: Locale,
) -> String {
    match cell {
        KpiCell::Null => {
            let key = kpi.null_label.as_deref().unwrap_or(NO_DATA_KEY);
            translate.t(key)
        }
        KpiCell::Bool(b) => match &kpi.boolean_labels {
            Some(labels) => translate.t(if *b { &labels.yes } else { &labels.no }),
            None => translate.t(if *b { "yes" } else { "no" }),
        },
        KpiCell::Number(n) => format_number(*n, 1, locale),
    }
}

// ---------------------------------------------------------------------------
// Public API — series filters
// ---------------------------------------------------------------------------

/// Anything keyed by a calendar year.
pub trait Yearly {
    fn year(&self) -> Year;
}

impl Yearly for DataPoint {
    fn year(&self) -> Year {
        self.year
    }
}

impl Yearly for ScopeDataPoint {
    fn year(&self) -> Year {
        self.year
    }
}

/// Points with an observed total. Charts drop these rather than render gaps
/// as zero.
pub fn with_valid_total(points: &[DataPoint]) -> Vec<DataPoint> {
    points.iter().filter(|p| p.total.is_some()).cloned().collect()
}

/// Company points reporting the given scope (1, 2, or 3).
pub fn with_valid_scope(points: &[ScopeDataPoint], scope: u32) -> Vec<ScopeDataPoint> {
    points
        .iter()
        .filter(|p| match scope {
            1 => p.scope1.is_some(),
            2 => p.scope2.is_some(),
            3 => p.scope3.is_some(),
            _ => false,
        })
        .cloned()
        .collect()
}

/// Company points reporting the given Scope 3 category.
pub fn with_valid_category(points: &[ScopeDataPoint], category: u32) -> Vec<ScopeDataPoint> {
    points
        .iter()
        .filter(|p| p.categories.contains_key(&category))
        .cloned()
        .collect()
}

/// Points within [start, end] inclusive.
pub fn in_year_range<T: Yearly + Clone>(points: &[T], start: Year, end: Year) -> Vec<T> {
    points
        .iter()
        .filter(|p| (start..=end).contains(&p.year()))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Public API — chart axis cap
// ---------------------------------------------------------------------------

/// Display-axis cap: the larger of the 85th percentile of positive values
/// and twice their median, floored at `min_cap_units` display units and
/// rounded up to a whole unit. Keeps a single outlier from flattening the
/// Y-axis for every other entity.
pub fn cap_threshold(
    values: &[Tonnes],
    min_cap_units: Decimal,
    unit_divisor: Decimal,
) -> KlimatResult<Tonnes> {
    if unit_divisor <= Decimal::ZERO {
        return Err(KlimatError::InvalidInput {
            field: "unit_divisor".into(),
            reason: "Unit divisor must be positive.".into(),
        });
    }

    let mut positive: Vec<Decimal> = values.iter().copied().filter(|v| *v > Decimal::ZERO).collect();
    positive.sort();

    let floor = min_cap_units * unit_divisor;
    let candidate = if positive.is_empty() {
        floor
    } else {
        let p85 = nearest_rank_percentile(&positive, dec!(0.85));
        let twice_median = dec!(2) * median(&positive);
        p85.max(twice_median).max(floor)
    };

    Ok((candidate / unit_divisor).ceil() * unit_divisor)
}

/// Nearest-rank percentile over an ascending-sorted non-empty slice.
fn nearest_rank_percentile(sorted: &[Decimal], pct: Decimal) -> Decimal {
    let n = Decimal::from(sorted.len() as i64);
    let rank = (pct * n).ceil().max(Decimal::ONE);
    let index = rank.to_usize().unwrap_or(1) - 1;
    sorted[index.min(sorted.len() - 1)]
}

/// Median over an ascending-sorted non-empty slice.
fn median(sorted: &[Decimal]) -> Decimal {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / dec!(2)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(id: &str, key: &str, cell: KpiCell) -> RankedListItem {
        RankedListItem {
            id: id.into(),
            name: id.into(),
            display_name: id.into(),
            values: [(key.to_string(), cell)].into_iter().collect(),
        }
    }

    fn numeric_kpi(higher_is_better: bool) -> KpiValue {
        KpiValue {
            label: "kpi.budget".into(),
            key: "carbonBudgetTonnes".into(),
            unit: "tCO₂e".into(),
            higher_is_better,
            is_boolean: false,
            boolean_labels: None,
            null_label: Some("kpi.noBudget".into()),
        }
    }

    fn boolean_kpi() -> KpiValue {
        KpiValue {
            label: "kpi.meetsParis".into(),
            key: "meetsParis".into(),
            unit: String::new(),
            higher_is_better: true,
            is_boolean: true,
            boolean_labels: Some(crate::types::BooleanLabels {
                yes: "kpi.meets".into(),
                no: "kpi.doesNotMeet".into(),
            }),
            null_label: None,
        }
    }

    #[test]
    fn test_sort_nulls_last_ascending() {
        let kpi = numeric_kpi(false);
        let entities = vec![
            item("a", &kpi.key, KpiCell::Null),
            item("b", &kpi.key, KpiCell::Number(dec!(5))),
            item("c", &kpi.key, KpiCell::Number(dec!(-3))),
        ];
        let sorted = sort_by_kpi(&entities, &kpi);
        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_nulls_last_descending() {
        let kpi = numeric_kpi(true);
        let entities = vec![
            item("a", &kpi.key, KpiCell::Null),
            item("b", &kpi.key, KpiCell::Number(dec!(5))),
            item("c", &kpi.key, KpiCell::Number(dec!(-3))),
        ];
        let sorted = sort_by_kpi(&entities, &kpi);
        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let kpi = numeric_kpi(true);
        let entities = vec![
            item("a", &kpi.key, KpiCell::Number(dec!(5))),
            item("b", &kpi.key, KpiCell::Number(dec!(5))),
            item("c", &kpi.key, KpiCell::Number(dec!(5))),
        ];
        let sorted = sort_by_kpi(&entities, &kpi);
        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let kpi = numeric_kpi(true);
        let entities = vec![
            item("a", &kpi.key, KpiCell::Number(dec!(1))),
            item("b", &kpi.key, KpiCell::Number(dec!(2))),
        ];
        let _ = sort_by_kpi(&entities, &kpi);
        assert_eq!(entities[0].id, "a");
    }

    #[test]
    fn test_sort_boolean_true_first_when_higher_is_better() {
        let kpi = boolean_kpi();
        let entities = vec![
            item("a", &kpi.key, KpiCell::Bool(false)),
            item("b", &kpi.key, KpiCell::Bool(true)),
            item("c", &kpi.key, KpiCell::Null),
        ];
        let sorted = sort_by_kpi(&entities, &kpi);
        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_missing_key_reads_as_null() {
        let kpi = numeric_kpi(true);
        let mut no_value = item("a", "somethingElse", KpiCell::Number(dec!(99)));
        no_value.id = "a".into();
        let entities = vec![no_value, item("b", &kpi.key, KpiCell::Number(dec!(1)))];
        let sorted = sort_by_kpi(&entities, &kpi);
        assert_eq!(sorted[0].id, "b");
    }

    #[test]
    fn test_format_kpi_null_uses_configured_label() {
        let kpi = numeric_kpi(true);
        let t = StaticTranslations::new([("kpi.noBudget".to_string(), "Saknar budget".to_string())]);
        assert_eq!(format_kpi_value(&KpiCell::Null, &kpi, &t, Locale::Sv), "Saknar budget");
    }

    #[test]
    fn test_format_kpi_null_generic_fallback() {
        let mut kpi = numeric_kpi(true);
        kpi.null_label = None;
        assert_eq!(
            format_kpi_value(&KpiCell::Null, &kpi, &KeyEcho, Locale::Sv),
            "noData"
        );
    }

    #[test]
    fn test_format_kpi_boolean_labels() {
        let kpi = boolean_kpi();
        let t = StaticTranslations::new([
            ("kpi.meets".to_string(), "Följer Parisavtalet".to_string()),
            ("kpi.doesNotMeet".to_string(), "Följer inte".to_string()),
        ]);
        assert_eq!(
            format_kpi_value(&KpiCell::Bool(true), &kpi, &t, Locale::Sv),
            "Följer Parisavtalet"
        );
        assert_eq!(
            format_kpi_value(&KpiCell::Bool(false), &kpi, &t, Locale::Sv),
            "Följer inte"
        );
    }

    #[test]
    fn test_format_kpi_number_one_decimal() {
        let kpi = numeric_kpi(true);
        assert_eq!(
            format_kpi_value(&KpiCell::Number(dec!(1234.567)), &kpi, &KeyEcho, Locale::En),
            "1,234.6"
        );
    }

    #[test]
    fn test_with_valid_total_drops_gaps() {
        let points = vec![
            DataPoint { total: Some(dec!(10)), ..DataPoint::empty(2020) },
            DataPoint::empty(2021),
            DataPoint { total: Some(dec!(12)), ..DataPoint::empty(2022) },
        ];
        let filtered = with_valid_total(&points);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[1].year, 2022);
    }

    #[test]
    fn test_in_year_range() {
        let points: Vec<DataPoint> = (1985..=1995).map(DataPoint::empty).collect();
        let filtered = in_year_range(&points, 1990, 1992);
        let years: Vec<Year> = filtered.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1990, 1991, 1992]);
    }

    #[test]
    fn test_with_valid_scope_and_category() {
        let mut p1 = ScopeDataPoint {
            year: 2020,
            total: None,
            scope1: Some(dec!(5)),
            scope2: None,
            scope3: None,
            categories: BTreeMap::new(),
        };
        p1.categories.insert(6, dec!(2));
        let p2 = ScopeDataPoint {
            year: 2021,
            total: None,
            scope1: None,
            scope2: Some(dec!(3)),
            scope3: None,
            categories: BTreeMap::new(),
        };
        let points = vec![p1, p2];
        assert_eq!(with_valid_scope(&points, 1).len(), 1);
        assert_eq!(with_valid_scope(&points, 2).len(), 1);
        assert_eq!(with_valid_scope(&points, 3).len(), 0);
        assert_eq!(with_valid_category(&points, 6).len(), 1);
        assert_eq!(with_valid_category(&points, 1).len(), 0);
    }

    #[test]
    fn test_cap_threshold_percentile_vs_median() {
        // 1..=100: p85 = 85, 2 * median = 101; ceil(101 / 10) * 10 = 110
        let values: Vec<Decimal> = (1..=100).map(Decimal::from).collect();
        let cap = cap_threshold(&values, dec!(1), dec!(10)).unwrap();
        assert_eq!(cap, dec!(110));
    }

    #[test]
    fn test_cap_threshold_min_cap_floor() {
        let values = vec![dec!(1), dec!(2), dec!(3)];
        // max(p85 = 3, 2 * 2 = 4) = 4, floored at 50 * 10 = 500
        let cap = cap_threshold(&values, dec!(50), dec!(10)).unwrap();
        assert_eq!(cap, dec!(500));
    }

    #[test]
    fn test_cap_threshold_ignores_nonpositive_values() {
        let values = vec![dec!(-5), dec!(0), dec!(30)];
        // Only 30 is positive: max(30, 60) = 60; whole units of 10
        let cap = cap_threshold(&values, dec!(1), dec!(10)).unwrap();
        assert_eq!(cap, dec!(60));
    }

    #[test]
    fn test_cap_threshold_rejects_bad_divisor() {
        let err = cap_threshold(&[dec!(1)], dec!(1), Decimal::ZERO).unwrap_err();
        match err {
            KlimatError::InvalidInput { field, .. } => assert_eq!(field, "unit_divisor"),
            other => panic!("Expected InvalidInput, got: {other:?}"),
        }
    }
}
