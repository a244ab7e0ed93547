use clap::Args;
use serde_json::Value;
use std::collections::BTreeMap;

use klimat_core::series;
use klimat_core::types::Tonnes;

use crate::commands::series_from_input;
use crate::input;

/// Arguments for series integration
#[derive(Args)]
pub struct IntegrateArgs {
    /// Path to a year-keyed JSON file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_integrate(args: IntegrateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: BTreeMap<String, Option<Tonnes>> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a yearly series".into());
    };

    let parsed = series_from_input(&raw);
    Ok(serde_json::json!({
        "cumulativeTonnes": series::trapezoidal_integration(&parsed),
        "years": series::available_years(&parsed),
    }))
}
