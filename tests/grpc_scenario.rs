//! ---
//! irh_section: "15-testing-qa-runbook"
//! irh_subsection: "integration-tests"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "End-to-end servo-group scenario over the gRPC gateway."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
mod support;

use std::sync::Arc;
use std::time::Duration;

use irh_common::EndpointConfig;
use irh_rpc::{GrpcServerBuilder, GrpcServerHandle};
use irh_sim::FixtureSimulator;
use irh_testharness::{ExpectationSet, HarnessFixture, SetupStage};

async fn spawn_gateway() -> GrpcServerHandle {
    let mut config = support::simulator_config();
    config.listen = "127.0.0.1:0".parse().expect("valid address");
    let simulator = FixtureSimulator::new(&config).expect("fixtures load");
    GrpcServerBuilder::new(config.listen, Arc::new(simulator))
        .server_name("grpc-scenario")
        .spawn()
        .await
        .expect("gateway starts")
}

fn endpoint(address: String) -> EndpointConfig {
    EndpointConfig {
        address,
        client_name: "grpc-scenario".into(),
        connect_timeout: Some(Duration::from_secs(2)),
    }
}

#[tokio::test]
async fn expectation_suite_passes_over_grpc() {
    let server = spawn_gateway().await;
    let fixture = HarnessFixture::open(&endpoint(server.endpoint()), &support::scenario())
        .await
        .expect("scenario setup");
    assert_eq!(fixture.connection().transport_name(), "grpc");

    let report = ExpectationSet::from_path(&support::expectations_path())
        .expect("expectations load")
        .suite("grpc")
        .run(&fixture)
        .await;
    assert!(report.all_passed(), "{report}");
    assert_eq!(report.cases.len(), 7);

    fixture.teardown();
    server.shutdown().await.expect("gateway stops");
}

#[tokio::test]
async fn refused_endpoint_fails_setup_at_connect() {
    let server = spawn_gateway().await;
    let address = server.endpoint();
    server.shutdown().await.expect("gateway stops");

    let err = HarnessFixture::open(&endpoint(address), &support::scenario())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), Some(SetupStage::Connect));
}
