use clap::Args;
use serde_json::Value;
use std::collections::BTreeMap;

use klimat_core::trend;
use klimat_core::types::Tonnes;

use crate::commands::series_from_input;
use crate::input;

/// Arguments for trend analysis
#[derive(Args)]
pub struct TrendArgs {
    /// Path to a year-keyed JSON file, e.g. {"2019": 110000, "2020": 100000}
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for carbon-budget evaluation
#[derive(Args)]
pub struct BudgetArgs {
    /// Path to a year-keyed JSON file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_trend(args: TrendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = read_series(&args.input)?;
    let report = trend::analyze_trend(&series)?;
    Ok(serde_json::to_value(report)?)
}

pub fn run_budget(args: BudgetArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = read_series(&args.input)?;
    let trendline = trend::calculate_trendline(&series);
    let budget = trend::calculate_carbon_budget_tonnes(trendline.as_ref());
    let meets_paris = trendline.as_ref().map(trend::calculate_meets_paris);

    Ok(serde_json::json!({
        "carbonBudgetTonnes": budget,
        "meetsParis": meets_paris,
        "underBudgetSentinel": trend::UNDER_BUDGET_SENTINEL,
    }))
}

fn read_series(
    path: &Option<String>,
) -> Result<klimat_core::types::YearSeries, Box<dyn std::error::Error>> {
    let raw: BTreeMap<String, Option<Tonnes>> = if let Some(path) = path {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a yearly series".into());
    };
    Ok(series_from_input(&raw))
}
