use clap::Args;
use serde_json::Value;

use klimat_core::transform::municipality::{transform_municipality_emissions, RawMunicipality};
use klimat_core::transform::region::{transform_nation_or_region_emissions, RawRegion};

use crate::input;

/// Arguments for municipality normalization
#[derive(Args)]
pub struct MunicipalityArgs {
    /// Path to a raw municipality JSON payload
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for nation/region normalization
#[derive(Args)]
pub struct RegionArgs {
    /// Path to a raw nation/region JSON payload
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_municipality(args: MunicipalityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: RawMunicipality = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a municipality payload".into());
    };
    let points = transform_municipality_emissions(&raw);
    Ok(serde_json::to_value(points)?)
}

pub fn run_region(args: RegionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw: RawRegion = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for a region payload".into());
    };
    let points = transform_nation_or_region_emissions(&raw);
    Ok(serde_json::to_value(points)?)
}
