//! Blockfrag scenario runner
//!
//! Replays a TOML scenario against a fresh simulator and prints a JSON report

use anyhow::Context;
use blockfrag::{Scenario, SimulatorConfig, Strategy};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "blockfrag")]
#[command(about = "Block storage fragmentation simulator")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file and print the report as JSON
    Run {
        /// Path to the scenario TOML
        scenario: PathBuf,

        /// Override the seed from the scenario config
        #[arg(short, long)]
        seed: Option<u64>,

        /// Override the default strategy (first-fit, best-fit, random)
        #[arg(long, value_parser = parse_strategy)]
        strategy: Option<Strategy>,

        /// Pretty-print the JSON report
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the default configuration as TOML
    Defaults,
}

/// Parse strategy from CLI string
fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse::<Strategy>().map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Run {
            scenario,
            seed,
            strategy,
            pretty,
        } => {
            info!("Loading scenario {:?}", scenario);
            let mut loaded = Scenario::load(&scenario)
                .with_context(|| format!("failed to load scenario {}", scenario.display()))?;

            if let Some(seed) = seed {
                loaded.config.seed = Some(seed);
            }
            if let Some(strategy) = strategy {
                loaded.config.default_strategy = strategy;
            }

            let report = loaded.run().context("scenario run failed")?;
            let json = report
                .to_json(pretty)
                .context("failed to render report")?;
            println!("{}", json);
        }
        Command::Defaults => {
            let toml = toml::to_string(&SimulatorConfig::default())
                .context("failed to render default config")?;
            print!("{}", toml);
        }
    }

    Ok(())
}
