use klimat_core::ranking::{self, KeyEcho, StaticTranslations};
use klimat_core::types::{BooleanLabels, KpiCell, KpiValue, RankedListItem};
use klimat_core::units::Locale;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn entity(id: &str, cells: &[(&str, KpiCell)]) -> RankedListItem {
    RankedListItem {
        id: id.into(),
        name: id.into(),
        display_name: format!("{id} AB"),
        values: cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}

fn budget_kpi() -> KpiValue {
    KpiValue {
        label: "companies.kpi.budget".into(),
        key: "carbonBudgetTonnes".into(),
        unit: "tCO₂e".into(),
        // Negative = under budget, so lower is better
        higher_is_better: false,
        is_boolean: false,
        boolean_labels: None,
        null_label: Some("companies.kpi.noBudget".into()),
    }
}

fn paris_kpi() -> KpiValue {
    KpiValue {
        label: "companies.kpi.meetsParis".into(),
        key: "meetsParis".into(),
        unit: String::new(),
        higher_is_better: true,
        is_boolean: true,
        boolean_labels: Some(BooleanLabels {
            yes: "companies.kpi.meetsParis.yes".into(),
            no: "companies.kpi.meetsParis.no".into(),
        }),
        null_label: None,
    }
}

fn fleet() -> Vec<RankedListItem> {
    vec![
        entity(
            "volvo",
            &[
                ("carbonBudgetTonnes", KpiCell::Number(dec!(120_000))),
                ("meetsParis", KpiCell::Bool(false)),
            ],
        ),
        entity(
            "ericsson",
            &[
                ("carbonBudgetTonnes", KpiCell::Number(dec!(-40_000))),
                ("meetsParis", KpiCell::Bool(true)),
            ],
        ),
        entity("unreported", &[("meetsParis", KpiCell::Null)]),
        entity(
            "vattenfall",
            &[
                ("carbonBudgetTonnes", KpiCell::Number(dec!(15_000))),
                ("meetsParis", KpiCell::Bool(true)),
            ],
        ),
    ]
}

// ===========================================================================
// Sorting
// ===========================================================================

#[test]
fn test_numeric_sort_lower_is_better() {
    let sorted = ranking::sort_by_kpi(&fleet(), &budget_kpi());
    let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["ericsson", "vattenfall", "volvo", "unreported"]);
}

#[test]
fn test_numeric_sort_null_last_even_when_direction_flips() {
    let mut kpi = budget_kpi();
    kpi.higher_is_better = true;
    let sorted = ranking::sort_by_kpi(&fleet(), &kpi);
    let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["volvo", "vattenfall", "ericsson", "unreported"]);
}

#[test]
fn test_boolean_sort_true_before_false_before_null() {
    let sorted = ranking::sort_by_kpi(&fleet(), &paris_kpi());
    let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
    // true entities keep input order (stable), then false, then null
    assert_eq!(ids, vec!["ericsson", "vattenfall", "volvo", "unreported"]);
}

#[test]
fn test_each_kpi_switch_recomputes_a_fresh_list() {
    let entities = fleet();
    let by_budget = ranking::sort_by_kpi(&entities, &budget_kpi());
    let by_paris = ranking::sort_by_kpi(&entities, &paris_kpi());
    // Input order untouched by both passes
    assert_eq!(entities[0].id, "volvo");
    assert_eq!(by_budget[0].id, "ericsson");
    assert_eq!(by_paris[0].id, "ericsson");
}

// ===========================================================================
// Display formatting
// ===========================================================================

fn swedish_catalogue() -> StaticTranslations {
    StaticTranslations::new([
        (
            "companies.kpi.noBudget".to_string(),
            "Ingen koldioxidbudget".to_string(),
        ),
        (
            "companies.kpi.meetsParis.yes".to_string(),
            "Följer Parisavtalet".to_string(),
        ),
        (
            "companies.kpi.meetsParis.no".to_string(),
            "Följer inte Parisavtalet".to_string(),
        ),
    ])
}

#[test]
fn test_format_each_cell_kind() {
    let t = swedish_catalogue();
    assert_eq!(
        ranking::format_kpi_value(&KpiCell::Null, &budget_kpi(), &t, Locale::Sv),
        "Ingen koldioxidbudget"
    );
    assert_eq!(
        ranking::format_kpi_value(&KpiCell::Bool(true), &paris_kpi(), &t, Locale::Sv),
        "Följer Parisavtalet"
    );
    assert_eq!(
        ranking::format_kpi_value(&KpiCell::Number(dec!(120000.04)), &budget_kpi(), &t, Locale::Sv),
        "120\u{a0}000,0"
    );
}

#[test]
fn test_format_untranslated_keys_echo() {
    assert_eq!(
        ranking::format_kpi_value(&KpiCell::Null, &budget_kpi(), &KeyEcho, Locale::En),
        "companies.kpi.noBudget"
    );
}

// ===========================================================================
// Axis cap
// ===========================================================================

#[test]
fn test_cap_threshold_suppresses_single_outlier() {
    // 19 municipalities around 10-30 kt and one at 900 kt: the cap lands
    // near the cohort, not the outlier.
    let mut values: Vec<_> = (1..=19).map(|i| dec!(10_000) + dec!(1_000) * rust_decimal::Decimal::from(i)).collect();
    values.push(dec!(900_000));
    let cap = ranking::cap_threshold(&values, dec!(10), dec!(1_000)).unwrap();
    assert!(cap < dec!(100_000), "cap {cap} should ignore the outlier");
    assert_eq!(cap % dec!(1_000), dec!(0), "cap must be a whole unit");
}
