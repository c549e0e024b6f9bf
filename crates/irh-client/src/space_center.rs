//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Space-center service, vessels and parts."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use irh_rpc::ProcedureCall;

use crate::{Connection, Result};

const SERVICE: &str = "SpaceCenter";

/// Entry point to the space-center service.
#[derive(Debug, Clone)]
pub struct SpaceCenter {
    connection: Connection,
}

impl SpaceCenter {
    pub(crate) fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// The vessel currently under control, if any.
    pub async fn active_vessel(&self) -> Result<Option<Vessel>> {
        let id = self
            .connection
            .call_object(ProcedureCall::new(SERVICE, "get_ActiveVessel"))
            .await?;
        Ok(id.map(|id| Vessel::new(id, self.connection.clone())))
    }

    /// Every vessel in the current save.
    pub async fn vessels(&self) -> Result<Vec<Vessel>> {
        let ids = self
            .connection
            .call_objects(ProcedureCall::new(SERVICE, "get_Vessels"))
            .await?;
        Ok(ids
            .into_iter()
            .map(|id| Vessel::new(id, self.connection.clone()))
            .collect())
    }
}

remote_handle!(
    /// A craft in the current save.
    Vessel
);

impl Vessel {
    pub async fn name(&self) -> Result<String> {
        self.connection
            .call_text(ProcedureCall::new(SERVICE, "Vessel_get_Name").arg(self.id))
            .await
    }
}

remote_handle!(
    /// A physical component of a vessel.
    Part
);

impl Part {
    /// Human-readable title, e.g. `Powered Hinge`.
    pub async fn title(&self) -> Result<String> {
        self.connection
            .call_text(ProcedureCall::new(SERVICE, "Part_get_Title").arg(self.id))
            .await
    }

    /// Internal part name.
    pub async fn name(&self) -> Result<String> {
        self.connection
            .call_text(ProcedureCall::new(SERVICE, "Part_get_Name").arg(self.id))
            .await
    }
}
