//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Scenario fixture setup and teardown."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use irh_client::{Connection, InfernalRobotics, SpaceCenter, Vessel};
use irh_common::{EndpointConfig, ScenarioConfig};
use tracing::{debug, info, warn};

use crate::error::{HarnessError, SetupStage};

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Connection and handles shared by every case of a scenario.
///
/// Built by [`HarnessFixture::setup`], which leaves the remote save holding
/// exactly the scenario vessel (unless removal is disabled) with that vessel
/// active. Cases borrow the fixture; [`HarnessFixture::teardown`] consumes it.
#[derive(Debug)]
pub struct HarnessFixture {
    connection: Connection,
    infernal_robotics: InfernalRobotics,
    space_center: SpaceCenter,
    vessel: Vessel,
    scenario: ScenarioConfig,
}

impl HarnessFixture {
    /// Connect to `endpoint` and run [`HarnessFixture::setup`].
    pub async fn open(endpoint: &EndpointConfig, scenario: &ScenarioConfig) -> Result<Self> {
        let connection = Connection::connect(
            &endpoint.address,
            &endpoint.client_name,
            endpoint.connect_timeout,
        )
        .await
        .map_err(HarnessError::setup(SetupStage::Connect))?;
        Self::setup(connection, scenario).await
    }

    /// Provision the scenario over an established connection.
    pub async fn setup(connection: Connection, scenario: &ScenarioConfig) -> Result<Self> {
        let directory = scenario.directory.to_string_lossy();
        info!(
            vessel = %scenario.vessel,
            directory = %directory,
            client = connection.client_name(),
            "setting up scenario"
        );

        let tools = connection.testing_tools();
        tools
            .new_save()
            .await
            .map_err(HarnessError::setup(SetupStage::NewSave))?;
        tools
            .launch_vessel_from_vab(&scenario.vessel, &directory)
            .await
            .map_err(HarnessError::setup(SetupStage::LaunchVessel))?;
        if scenario.remove_other_vessels {
            tools
                .remove_other_vessels()
                .await
                .map_err(HarnessError::setup(SetupStage::RemoveOtherVessels))?;
        } else {
            debug!("keeping other vessels in the save");
        }

        let infernal_robotics = connection.infernal_robotics();
        let available = infernal_robotics
            .available()
            .await
            .map_err(HarnessError::setup(SetupStage::RoboticsAvailable))?;
        if !available {
            warn!("robotics service unavailable");
            return Err(HarnessError::RoboticsUnavailable);
        }

        let space_center = connection.space_center();
        let vessel = space_center
            .active_vessel()
            .await
            .map_err(HarnessError::setup(SetupStage::ActiveVessel))?
            .ok_or(HarnessError::NoActiveVessel)?;

        info!(vessel = %vessel.id(), "scenario ready");
        Ok(Self {
            connection,
            infernal_robotics,
            space_center,
            vessel,
            scenario: scenario.clone(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn infernal_robotics(&self) -> &InfernalRobotics {
        &self.infernal_robotics
    }

    pub fn space_center(&self) -> &SpaceCenter {
        &self.space_center
    }

    /// The active vessel launched during setup.
    pub fn vessel(&self) -> &Vessel {
        &self.vessel
    }

    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    /// Release the connection. Handles obtained from the fixture stop working.
    pub fn teardown(self) {
        debug!(vessel = %self.scenario.vessel, "tearing down scenario");
        self.connection.close();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use irh_rpc::{InProcessTransport, ObjectId, ProcedureCall, ProcedureHandler, RemoteFault, Value};
    use irh_sim::FixtureSimulator;

    use super::*;

    const PROBE: &str = r#"
name: Probe
parts: [{ key: hinge, name: IR.Hinge.Basic, title: Powered Hinge }]
servos: [{ name: Hinge, part: hinge }]
groups: [{ name: Arm, servos: [Hinge] }]
"#;

    fn connection(handler: Arc<dyn ProcedureHandler>) -> Connection {
        Connection::with_transport(Arc::new(InProcessTransport::new(handler)), "fixture-test")
    }

    fn scenario(vessel: &str) -> ScenarioConfig {
        ScenarioConfig {
            vessel: vessel.into(),
            ..ScenarioConfig::default()
        }
    }

    #[tokio::test]
    async fn setup_launches_requested_vessel() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::write(root.path().join("Probe.craft.yaml"), PROBE).expect("write craft");
        let sim = Arc::new(FixtureSimulator::with_root(root.path()));

        let fixture = HarnessFixture::setup(connection(sim), &scenario("Probe"))
            .await
            .expect("setup succeeds");
        assert_eq!(fixture.vessel().name().await.unwrap(), "Probe");
        assert_eq!(fixture.scenario().vessel, "Probe");
        fixture.teardown();
    }

    #[tokio::test]
    async fn teardown_invalidates_borrowed_handles() {
        let root = tempfile::tempdir().expect("tempdir");
        fs::write(root.path().join("Probe.craft.yaml"), PROBE).expect("write craft");
        let sim = Arc::new(FixtureSimulator::with_root(root.path()));
        let fixture = HarnessFixture::setup(connection(sim), &scenario("Probe"))
            .await
            .expect("setup succeeds");
        let robotics = fixture.infernal_robotics().clone();

        fixture.teardown();
        assert!(robotics.available().await.unwrap_err().is_unreachable());
    }

    #[tokio::test]
    async fn missing_fixture_fails_at_launch() {
        let root = tempfile::tempdir().expect("tempdir");
        let sim = Arc::new(FixtureSimulator::with_root(root.path()));

        let err = HarnessFixture::setup(connection(sim), &scenario("Ghost"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(SetupStage::LaunchVessel));
        match err {
            HarnessError::Setup { source, .. } => {
                assert_eq!(source.fault_name(), Some("FixtureNotFound"))
            }
            other => panic!("unexpected error {other}"),
        }
    }

    struct NoRobotics;

    impl ProcedureHandler for NoRobotics {
        fn handle(&self, call: &ProcedureCall) -> std::result::Result<Value, RemoteFault> {
            match (call.service.as_str(), call.procedure.as_str()) {
                ("InfernalRobotics", "get_Available") => Ok(Value::Bool(false)),
                ("SpaceCenter", "get_ActiveVessel") => Ok(Value::object(ObjectId::new(1))),
                _ => Ok(Value::Null),
            }
        }
    }

    #[tokio::test]
    async fn unavailable_robotics_is_a_setup_error() {
        let err = HarnessFixture::setup(connection(Arc::new(NoRobotics)), &scenario("Any"))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::RoboticsUnavailable));
        assert_eq!(err.stage(), Some(SetupStage::RoboticsAvailable));
    }

    #[tokio::test]
    async fn closed_connection_fails_at_first_stage() {
        let root = tempfile::tempdir().expect("tempdir");
        let conn = connection(Arc::new(FixtureSimulator::with_root(root.path())));
        conn.close();

        let err = HarnessFixture::setup(conn, &scenario("Probe"))
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(SetupStage::NewSave));
    }
}
