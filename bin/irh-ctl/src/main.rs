//! ---
//! irh_section: "06-binaries"
//! irh_subsection: "binary"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Control CLI for running scenario suites against an endpoint."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use irh_common::HarnessConfig;

mod check;
mod groups;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Servo-group scenario control utility",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    target: Target,
    #[command(subcommand)]
    command: Commands,
}

/// Where to connect and which vessel to provision.
#[derive(Debug, Args)]
pub struct Target {
    #[arg(long, global = true, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "URL", help = "Override the gateway endpoint")]
    endpoint: Option<String>,

    #[arg(long, global = true, value_name = "NAME", help = "Override the scenario vessel")]
    vessel: Option<String>,

    #[arg(long, global = true, help = "Keep other vessels in the save")]
    keep_other_vessels: bool,
}

impl Target {
    /// Configuration with command-line overrides applied.
    pub fn load(&self) -> Result<HarnessConfig> {
        let mut candidates = Vec::new();
        if let Some(path) = &self.config {
            candidates.push(path.clone());
        }
        candidates.push(PathBuf::from("configs/harness.toml"));
        candidates.push(PathBuf::from("configs/harness.dev.toml"));

        let mut config = HarnessConfig::load_with_source(&candidates)?.config;
        if let Some(endpoint) = &self.endpoint {
            config.endpoint.address = endpoint.clone();
        }
        if let Some(vessel) = &self.vessel {
            config.scenario.vessel = vessel.clone();
        }
        if self.keep_other_vessels {
            config.scenario.remove_other_vessels = false;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Provision the scenario and run an expectation suite")]
    Check(check::CheckArgs),
    #[command(about = "Provision the scenario and list its servo groups")]
    Groups,
}

#[tokio::main]
async fn main() -> Result<()> {
    irh_common::init_default();
    let cli = Cli::parse();
    let config = cli.target.load()?;
    match cli.command {
        Commands::Check(args) => check::run(&config, args).await?,
        Commands::Groups => groups::run(&config).await?,
    }
    Ok(())
}
