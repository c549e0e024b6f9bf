//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Robotics service, servo groups and servos."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use irh_rpc::ProcedureCall;

use crate::space_center::{Part, Vessel};
use crate::{Connection, Result};

const SERVICE: &str = "InfernalRobotics";

/// Entry point to the robotics service.
#[derive(Debug, Clone)]
pub struct InfernalRobotics {
    connection: Connection,
}

impl InfernalRobotics {
    pub(crate) fn new(connection: Connection) -> Self {
        Self { connection }
    }

    /// Whether the robotics mod is installed.
    pub async fn available(&self) -> Result<bool> {
        self.connection
            .call_bool(ProcedureCall::new(SERVICE, "get_Available"))
            .await
    }

    /// Whether the mod has finished initialising for the current scene.
    pub async fn ready(&self) -> Result<bool> {
        self.connection
            .call_bool(ProcedureCall::new(SERVICE, "get_Ready"))
            .await
    }

    /// All servo groups on `vessel`, in the vessel's own order.
    pub async fn servo_groups(&self, vessel: &Vessel) -> Result<Vec<ServoGroup>> {
        let ids = self
            .connection
            .call_objects(ProcedureCall::new(SERVICE, "ServoGroups").arg(vessel.id()))
            .await?;
        Ok(ids
            .into_iter()
            .map(|id| ServoGroup::new(id, self.connection.clone()))
            .collect())
    }

    /// The first servo group on `vessel` called `name`, or `None`.
    pub async fn servo_group_with_name(
        &self,
        vessel: &Vessel,
        name: &str,
    ) -> Result<Option<ServoGroup>> {
        let id = self
            .connection
            .call_object(
                ProcedureCall::new(SERVICE, "ServoGroupWithName")
                    .arg(vessel.id())
                    .arg(name),
            )
            .await?;
        Ok(id.map(|id| ServoGroup::new(id, self.connection.clone())))
    }

    /// The first servo anywhere on `vessel` called `name`, or `None`.
    pub async fn servo_with_name(&self, vessel: &Vessel, name: &str) -> Result<Option<Servo>> {
        let id = self
            .connection
            .call_object(
                ProcedureCall::new(SERVICE, "ServoWithName")
                    .arg(vessel.id())
                    .arg(name),
            )
            .await?;
        Ok(id.map(|id| Servo::new(id, self.connection.clone())))
    }
}

remote_handle!(
    /// A named group of servos and the parts hosting them.
    ServoGroup
);

impl ServoGroup {
    fn property(&self, name: &str) -> ProcedureCall {
        ProcedureCall::new(SERVICE, format!("ServoGroup_get_{name}")).arg(self.id)
    }

    pub async fn name(&self) -> Result<String> {
        self.connection.call_text(self.property("Name")).await
    }

    pub async fn speed(&self) -> Result<f64> {
        self.connection.call_number(self.property("Speed")).await
    }

    /// Whether the group is expanded in the in-game editor.
    pub async fn expanded(&self) -> Result<bool> {
        self.connection.call_bool(self.property("Expanded")).await
    }

    pub async fn forward_key(&self) -> Result<String> {
        self.connection.call_text(self.property("ForwardKey")).await
    }

    pub async fn reverse_key(&self) -> Result<String> {
        self.connection.call_text(self.property("ReverseKey")).await
    }

    pub async fn servos(&self) -> Result<Vec<Servo>> {
        let ids = self.connection.call_objects(self.property("Servos")).await?;
        Ok(ids
            .into_iter()
            .map(|id| Servo::new(id, self.connection.clone()))
            .collect())
    }

    /// Distinct parts hosting this group's servos.
    pub async fn parts(&self) -> Result<Vec<Part>> {
        let ids = self.connection.call_objects(self.property("Parts")).await?;
        Ok(ids
            .into_iter()
            .map(|id| Part::new(id, self.connection.clone()))
            .collect())
    }

    /// The first servo in this group called `name`, or `None`.
    pub async fn servo_with_name(&self, name: &str) -> Result<Option<Servo>> {
        let id = self
            .connection
            .call_object(
                ProcedureCall::new(SERVICE, "ServoGroup_ServoWithName")
                    .arg(self.id)
                    .arg(name),
            )
            .await?;
        Ok(id.map(|id| Servo::new(id, self.connection.clone())))
    }
}

remote_handle!(
    /// A controllable joint or actuator.
    Servo
);

impl Servo {
    fn property(&self, name: &str) -> ProcedureCall {
        ProcedureCall::new(SERVICE, format!("Servo_get_{name}")).arg(self.id)
    }

    pub async fn name(&self) -> Result<String> {
        self.connection.call_text(self.property("Name")).await
    }

    /// The part hosting this servo.
    pub async fn part(&self) -> Result<Part> {
        let id = self
            .connection
            .call_required_object(self.property("Part"))
            .await?;
        Ok(Part::new(id, self.connection.clone()))
    }

    pub async fn position(&self) -> Result<f64> {
        self.connection.call_number(self.property("Position")).await
    }

    pub async fn min_position(&self) -> Result<f64> {
        self.connection.call_number(self.property("MinPosition")).await
    }

    pub async fn max_position(&self) -> Result<f64> {
        self.connection.call_number(self.property("MaxPosition")).await
    }

    pub async fn speed(&self) -> Result<f64> {
        self.connection.call_number(self.property("Speed")).await
    }

    pub async fn is_moving(&self) -> Result<bool> {
        self.connection.call_bool(self.property("IsMoving")).await
    }

    pub async fn is_free_moving(&self) -> Result<bool> {
        self.connection.call_bool(self.property("IsFreeMoving")).await
    }

    pub async fn is_locked(&self) -> Result<bool> {
        self.connection.call_bool(self.property("IsLocked")).await
    }
}
