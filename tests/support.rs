//! ---
//! irh_section: "15-testing-qa-runbook"
//! irh_subsection: "integration-tests"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Shared setup for the scenario integration suites."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use irh_client::Connection;
use irh_common::{ScenarioConfig, SimulatorConfig};
use irh_rpc::InProcessTransport;
use irh_sim::FixtureSimulator;
use irh_testharness::HarnessFixture;

pub const VESSEL: &str = "InfernalRobotics";

pub fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default()
}

pub fn simulator_config() -> SimulatorConfig {
    SimulatorConfig {
        fixture_root: workspace_root().join("fixtures/crafts"),
        seed_vessels: vec!["Debris".into()],
        ..SimulatorConfig::default()
    }
}

pub fn expectations_path() -> PathBuf {
    workspace_root().join("fixtures/expectations/InfernalRobotics.yaml")
}

pub fn scenario() -> ScenarioConfig {
    ScenarioConfig {
        vessel: VESSEL.into(),
        ..ScenarioConfig::default()
    }
}

pub fn in_process_connection() -> Connection {
    let simulator = FixtureSimulator::new(&simulator_config()).expect("fixtures load");
    Connection::with_transport(
        Arc::new(InProcessTransport::new(Arc::new(simulator))),
        "integration",
    )
}

/// Fresh fixture over its own in-process simulator.
pub async fn fixture() -> HarnessFixture {
    HarnessFixture::setup(in_process_connection(), &scenario())
        .await
        .expect("scenario setup")
}
