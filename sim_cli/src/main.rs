//! Scenario runner: feed a request JSON to sim_core and print the report

use clap::Parser;
use sim_core::{run_simulation, GearCatalog, KitRegistry, SimulationRequest};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sim_cli", about = "Run a party combat scenario and print the report")]
struct Args {
    /// Scenario file (JSON SimulationRequest)
    scenario: PathBuf,

    /// Gear catalog file (JSON GearCatalog)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Override the scenario's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the full result as JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Also print the battle log
    #[arg(long)]
    log: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let text = std::fs::read_to_string(&args.scenario)
        .map_err(|e| format!("reading {}: {e}", args.scenario.display()))?;
    let mut request: SimulationRequest =
        serde_json::from_str(&text).map_err(|e| format!("parsing scenario: {e}"))?;
    if let Some(seed) = args.seed {
        request.seed = seed;
    }

    let catalog = match &args.catalog {
        None => GearCatalog::new(),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("parsing catalog: {e}"))?
        }
    };

    let registry = KitRegistry::builtin();
    let result = run_simulation(&request, &registry, &catalog).map_err(|e| e.to_string())?;

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&result).map_err(|e| format!("encoding result: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    if args.log {
        for entry in &result.logs {
            println!("{} {}", entry.time, entry.message);
        }
        println!();
    }
    print!("{}", result.report);
    if !result.diagnostics.is_empty() {
        println!("\ndiagnostics:");
        for diagnostic in &result.diagnostics {
            println!("  - {diagnostic}");
        }
    }
    Ok(())
}
