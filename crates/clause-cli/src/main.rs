//! Contract checking demonstrations.
//!
//! Provides the `clause` binary. `list` prints the built-in scenarios and
//! `run` executes one, printing a JSON report of every call it made.

mod scenarios;

use std::process;

use clap::{Parser, Subcommand};
use clause_check::toggle::set_contracts_enabled;
use clause_check::ContractConfig;
use tracing_subscriber::EnvFilter;

/// Runtime contract checking demonstrations.
#[derive(Parser)]
#[command(name = "clause", about = "Runtime contract checking demonstrations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in scenarios.
    List,

    /// Run one scenario and print its report as JSON.
    Run {
        /// Scenario name, as printed by `list`.
        scenario: String,

        /// Turn contract checks off before anything is defined.
        #[arg(long)]
        no_contracts: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::List => {
            for scenario in scenarios::SCENARIOS {
                println!("{:<14} {}", scenario.name, scenario.about);
            }
        }
        Commands::Run {
            scenario,
            no_contracts,
        } => process::exit(run_scenario(&scenario, no_contracts)),
    }
}

/// Execute the run subcommand.
///
/// Returns exit code: 0 = report printed, 1 = unknown scenario or a
/// scenario that could not be set up.
fn run_scenario(name: &str, no_contracts: bool) -> i32 {
    let Some(scenario) = scenarios::find(name) else {
        eprintln!("Error: unknown scenario '{}'", name);
        eprintln!("Run `clause list` for the available scenarios.");
        return 1;
    };

    match report(scenario, no_contracts) {
        Ok(records) => {
            let json = serde_json::to_string_pretty(&records).unwrap_or_else(|e| {
                format!("{{\"error\": \"failed to serialize report: {}\"}}", e)
            });
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: scenario '{}' failed: {:#}", name, e);
            1
        }
    }
}

/// Runs a scenario under the process-wide toggle, first turning it off if
/// asked to.
fn report(
    scenario: &scenarios::Scenario,
    no_contracts: bool,
) -> anyhow::Result<Vec<scenarios::Record>> {
    if no_contracts {
        set_contracts_enabled(false);
    }
    tracing::info!(scenario = scenario.name, no_contracts, "running scenario");
    scenario.run(ContractConfig::default())
}
