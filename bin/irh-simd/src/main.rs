//! ---
//! irh_section: "06-binaries"
//! irh_subsection: "binary"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Binary entrypoint for the stand-in service daemon."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use irh_common::{init_tracing, HarnessConfig};
use irh_rpc::GrpcServerBuilder;
use irh_sim::FixtureSimulator;
use tokio::signal;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Fixture-backed robotics service stand-in",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "ADDR", help = "Override the listen address")]
    listen: Option<SocketAddr>,

    #[arg(long, value_name = "DIR", help = "Override the craft fixture root")]
    fixture_root: Option<PathBuf>,

    #[arg(
        long = "seed",
        value_name = "VESSEL",
        help = "Vessel launched into every new save (repeatable, replaces configured seeds)"
    )]
    seeds: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/harness.toml"));
    candidates.push(PathBuf::from("configs/harness.dev.toml"));

    let loaded = HarnessConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    if let Some(listen) = cli.listen {
        config.simulator.listen = listen;
    }
    if let Some(root) = cli.fixture_root {
        config.simulator.fixture_root = root;
    }
    if !cli.seeds.is_empty() {
        config.simulator.seed_vessels = cli.seeds;
    }
    init_tracing("irh-simd", &config.logging)?;
    info!(config = %loaded.source.display(), "configuration loaded");

    let simulator = FixtureSimulator::new(&config.simulator).with_context(|| {
        format!(
            "failed to prepare fixtures under {}",
            config.simulator.fixture_root.display()
        )
    })?;
    let server = GrpcServerBuilder::new(config.simulator.listen, Arc::new(simulator))
        .server_name("irh-simd")
        .spawn()
        .await?;
    info!(
        address = %server.local_addr(),
        fixture_root = %config.simulator.fixture_root.display(),
        "stand-in service listening; waiting for termination signal"
    );

    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");
    server.shutdown().await?;
    Ok(())
}
