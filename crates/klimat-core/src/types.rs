use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Emissions magnitudes in tonnes CO2e. Wraps Decimal to prevent accidental
/// f64 usage.
pub type Tonnes = Decimal;

/// Rates expressed as decimals (0.1172 = 11.72%). Never as percentages.
pub type Rate = Decimal;

/// Percentage points for display values (-12.5 = −12.5%).
pub type Percent = Decimal;

/// Calendar year.
pub type Year = i32;

/// Sparse year-keyed emissions series. BTreeMap keeps years sorted and
/// duplicate-free.
pub type YearSeries = BTreeMap<Year, Tonnes>;

/// First year of the valid display window.
pub const MIN_DISPLAY_YEAR: Year = 1990;

/// Last year of the valid display window.
pub const MAX_DISPLAY_YEAR: Year = 2050;

/// One chart record for a single year. Every value field is independently
/// optional: absence means "no value for this series at this year", never
/// zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub year: Year,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approximated: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_law: Option<Tonnes>,
}

impl DataPoint {
    pub fn empty(year: Year) -> Self {
        DataPoint {
            year,
            total: None,
            approximated: None,
            trend: None,
            carbon_law: None,
        }
    }
}

/// One company record for a single year, broken down by GHG Protocol scope.
/// As with DataPoint, absence of a scope means "not reported", never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeDataPoint {
    pub year: Year,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope1: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope2: Option<Tonnes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope3: Option<Tonnes>,
    /// GHG Protocol Scope 3 category number (1-15) → emissions
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<u32, Tonnes>,
}

/// A raw series point as parsed from upstream JSON, before the year has been
/// validated. A point with no year is malformed, not "year zero".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSeriesPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Tonnes>,
}

/// Localized labels for a boolean KPI's two states.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanLabels {
    /// Translation key shown for `true`
    pub yes: String,
    /// Translation key shown for `false`
    pub no: String,
}

/// A KPI descriptor: names which entity field to rank/format/sort by and
/// how. This is configuration, not a computed value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiValue {
    /// Translation key for the KPI's display label
    pub label: String,
    /// The entity field to read, e.g. "carbonBudgetTonnes"
    pub key: String,
    /// Display unit, e.g. "tCO₂e" or "%"
    pub unit: String,
    /// Sort direction: true = larger values rank first
    pub higher_is_better: bool,
    #[serde(default)]
    pub is_boolean: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_labels: Option<BooleanLabels>,
    /// Translation key shown when an entity has no value for this KPI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_label: Option<String>,
}

/// One entity's value for one KPI key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KpiCell {
    Number(Decimal),
    Bool(bool),
    Null,
}

impl KpiCell {
    pub fn is_null(&self) -> bool {
        matches!(self, KpiCell::Null)
    }
}

/// An entity projected down to the fields a ranked list needs. Recomputed
/// per KPI switch; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedListItem {
    pub id: String,
    pub name: String,
    pub display_name: String,
    /// KPI key → this entity's value for that KPI
    #[serde(default)]
    pub values: BTreeMap<String, KpiCell>,
}

impl RankedListItem {
    /// The entity's cell for the given KPI key; absent keys read as null.
    pub fn cell(&self, key: &str) -> KpiCell {
        self.values.get(key).cloned().unwrap_or(KpiCell::Null)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
