use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use klimat_core::ranking::{self, KeyEcho};
use klimat_core::types::{KpiValue, RankedListItem};
use klimat_core::units::Locale;

use crate::input;

/// Arguments for KPI ranking
#[derive(Args)]
pub struct RankArgs {
    /// Path to a JSON file with {"kpi": {...}, "entities": [...]}
    #[arg(long)]
    pub input: Option<String>,

    /// Also include a formatted display string per entity
    #[arg(long)]
    pub formatted: bool,

    /// Locale for formatted values
    #[arg(long, default_value = "sv")]
    pub locale: String,
}

#[derive(Deserialize)]
struct RankRequest {
    kpi: KpiValue,
    entities: Vec<RankedListItem>,
}

pub fn run_rank(args: RankArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: RankRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for ranking".into());
    };

    let locale = match args.locale.as_str() {
        "en" => Locale::En,
        _ => Locale::Sv,
    };

    let sorted = ranking::sort_by_kpi(&request.entities, &request.kpi);

    let rows: Vec<Value> = sorted
        .iter()
        .enumerate()
        .map(|(i, entity)| {
            let mut row = serde_json::json!({
                "rank": i + 1,
                "id": entity.id,
                "displayName": entity.display_name,
                "value": entity.cell(&request.kpi.key),
            });
            if args.formatted {
                row["formatted"] = Value::String(ranking::format_kpi_value(
                    &entity.cell(&request.kpi.key),
                    &request.kpi,
                    &KeyEcho,
                    locale,
                ));
            }
            row
        })
        .collect();

    Ok(Value::Array(rows))
}
