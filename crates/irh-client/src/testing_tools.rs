//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Testing-tools service used to provision scenarios."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use irh_rpc::ProcedureCall;

use crate::{Connection, Result};

const SERVICE: &str = "TestingTools";

/// Procedures that put the game into a known state before a scenario runs.
#[derive(Debug, Clone)]
pub struct TestingTools {
    connection: Connection,
}

impl TestingTools {
    pub(crate) fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Replace the current save with a fresh one.
    pub async fn new_save(&self) -> Result<()> {
        self.connection
            .call_unit(ProcedureCall::new(SERVICE, "NewSave"))
            .await
    }

    /// Launch the craft `name` stored under `directory` and make it active.
    pub async fn launch_vessel_from_vab(&self, name: &str, directory: &str) -> Result<()> {
        self.connection
            .call_unit(
                ProcedureCall::new(SERVICE, "LaunchVesselFromVAB")
                    .arg(name)
                    .arg(directory),
            )
            .await
    }

    /// Remove every vessel except the active one.
    pub async fn remove_other_vessels(&self) -> Result<()> {
        self.connection
            .call_unit(ProcedureCall::new(SERVICE, "RemoveOtherVessels"))
            .await
    }
}
