mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::ranking::RankArgs;
use commands::series::IntegrateArgs;
use commands::transform::{MunicipalityArgs, RegionArgs};
use commands::trend::{BudgetArgs, TrendArgs};

/// Emissions trend and Paris-compliance calculations
#[derive(Parser)]
#[command(
    name = "kk",
    version,
    about = "Emissions trend and Paris-compliance calculations",
    long_about = "A CLI for the klimat emissions engine: fits emissions trendlines, \
                  evaluates Carbon-Law compliance and carbon budgets, ranks entities \
                  by KPI, and normalizes raw municipality/region API payloads into \
                  chart-ready data points. All arithmetic uses decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a trendline and evaluate Paris alignment for a yearly series
    Trend(TrendArgs),
    /// Carbon-budget delta against the Carbon-Law curve
    Budget(BudgetArgs),
    /// Sort entities by a KPI descriptor
    Rank(RankArgs),
    /// Normalize a raw municipality payload into chart data points
    Municipality(MunicipalityArgs),
    /// Normalize a raw nation/region payload into chart data points
    Region(RegionArgs),
    /// Trapezoid-integrate a yearly series
    Integrate(IntegrateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Trend(args) => commands::trend::run_trend(args),
        Commands::Budget(args) => commands::trend::run_budget(args),
        Commands::Rank(args) => commands::ranking::run_rank(args),
        Commands::Municipality(args) => commands::transform::run_municipality(args),
        Commands::Region(args) => commands::transform::run_region(args),
        Commands::Integrate(args) => commands::series::run_integrate(args),
        Commands::Version => {
            println!("kk {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
