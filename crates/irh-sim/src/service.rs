//! ---
//! irh_section: "04-stand-in-service"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Procedure dispatch for the stand-in services."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::path::Path;

use irh_common::SimulatorConfig;
use irh_rpc::{ObjectId, ProcedureCall, ProcedureHandler, RemoteFault, Value};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::craft::{Craft, CraftGroup, CraftServo, FixtureError, FixtureLibrary};
use crate::save::{ObjectRef, Save, VesselState};

const TESTING_TOOLS: &str = "TestingTools";
const SPACE_CENTER: &str = "SpaceCenter";
const INFERNAL_ROBOTICS: &str = "InfernalRobotics";

type Reply = Result<Value, RemoteFault>;

/// Serves vessel and servo-group state loaded from craft fixtures.
///
/// The save is guarded by a mutex so the gateway can share one simulator
/// across connections; calls are still answered one at a time.
pub struct FixtureSimulator {
    library: FixtureLibrary,
    seed_vessels: Vec<String>,
    save: Mutex<Save>,
}

impl FixtureSimulator {
    /// Build a simulator and populate its first save with the seed vessels.
    pub fn new(config: &SimulatorConfig) -> Result<Self, FixtureError> {
        let simulator = Self {
            library: FixtureLibrary::new(&config.fixture_root),
            seed_vessels: config.seed_vessels.clone(),
            save: Mutex::new(Save::new()),
        };
        simulator.new_save()?;
        Ok(simulator)
    }

    /// Simulator over `root` without seed vessels.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            library: FixtureLibrary::new(root.as_ref()),
            seed_vessels: Vec::new(),
            save: Mutex::new(Save::new()),
        }
    }

    pub fn library(&self) -> &FixtureLibrary {
        &self.library
    }

    fn new_save(&self) -> Result<(), FixtureError> {
        let seeds = self
            .seed_vessels
            .iter()
            .map(|name| self.library.load(Path::new("."), name))
            .collect::<Result<Vec<Craft>, _>>()?;
        let mut save = self.save.lock();
        save.clear();
        for craft in seeds {
            debug!(craft = %craft.name, "seeding vessel");
            save.add(craft);
        }
        info!(vessels = save.vessel_ids().len(), "new save created");
        Ok(())
    }

    fn testing_tools(&self, call: &ProcedureCall) -> Reply {
        let args = Args::new(call);
        match call.procedure.as_str() {
            "NewSave" => {
                args.expect_len(0)?;
                self.new_save().map_err(|err| fixture_fault(call, err))?;
                Ok(Value::Null)
            }
            "LaunchVesselFromVAB" => {
                args.expect_len(2)?;
                let name = args.text(0)?;
                let directory = args.text(1)?;
                let craft = self
                    .library
                    .load(Path::new(directory), name)
                    .map_err(|err| fixture_fault(call, err))?;
                let vessel = self.save.lock().launch(craft);
                info!(craft = name, directory, vessel = %vessel, "vessel launched");
                Ok(Value::Null)
            }
            "RemoveOtherVessels" => {
                args.expect_len(0)?;
                let removed = self
                    .save
                    .lock()
                    .remove_other_vessels()
                    .ok_or_else(|| no_active_vessel(call))?;
                info!(removed, "other vessels removed");
                Ok(Value::Null)
            }
            _ => Err(unknown_procedure(call)),
        }
    }

    fn space_center(&self, call: &ProcedureCall) -> Reply {
        let args = Args::new(call);
        let save = self.save.lock();
        match call.procedure.as_str() {
            "get_ActiveVessel" => {
                args.expect_len(0)?;
                Ok(Value::optional_object(save.active_vessel()))
            }
            "get_Vessels" => {
                args.expect_len(0)?;
                Ok(Value::objects(save.vessel_ids()))
            }
            "Vessel_get_Name" => {
                args.expect_len(1)?;
                let vessel = lookup_vessel(&save, call, args.object(0)?)?;
                Ok(vessel.craft.name.clone().into())
            }
            "Part_get_Title" | "Part_get_Name" => {
                args.expect_len(1)?;
                let (vessel, index) = lookup_part(&save, call, args.object(0)?)?;
                let part = &vessel.craft.parts[index];
                if call.procedure == "Part_get_Title" {
                    Ok(part.title.clone().into())
                } else {
                    Ok(part.name.clone().into())
                }
            }
            _ => Err(unknown_procedure(call)),
        }
    }

    fn infernal_robotics(&self, call: &ProcedureCall) -> Reply {
        let args = Args::new(call);
        let save = self.save.lock();
        match call.procedure.as_str() {
            "get_Available" => {
                args.expect_len(0)?;
                Ok(true.into())
            }
            "get_Ready" => {
                args.expect_len(0)?;
                Ok(save.active_vessel().is_some().into())
            }
            "ServoGroups" => {
                args.expect_len(1)?;
                let vessel = lookup_vessel(&save, call, args.object(0)?)?;
                Ok(Value::objects(vessel.group_ids.iter().copied()))
            }
            "ServoGroupWithName" => {
                args.expect_len(2)?;
                let vessel = lookup_vessel(&save, call, args.object(0)?)?;
                let name = args.text(1)?;
                let found = vessel
                    .craft
                    .groups
                    .iter()
                    .position(|group| group.name == name)
                    .map(|index| vessel.group_ids[index]);
                Ok(Value::optional_object(found))
            }
            "ServoWithName" => {
                args.expect_len(2)?;
                let vessel = lookup_vessel(&save, call, args.object(0)?)?;
                let name = args.text(1)?;
                let found = vessel
                    .craft
                    .servos
                    .iter()
                    .position(|servo| servo.name == name)
                    .map(|index| vessel.servo_ids[index]);
                Ok(Value::optional_object(found))
            }
            "ServoGroup_ServoWithName" => {
                args.expect_len(2)?;
                let (vessel, group) = lookup_group(&save, call, args.object(0)?)?;
                let name = args.text(1)?;
                let found = group
                    .servos
                    .iter()
                    .copied()
                    .find(|&index| vessel.craft.servos[index].name == name)
                    .map(|index| vessel.servo_ids[index]);
                Ok(Value::optional_object(found))
            }
            procedure if procedure.starts_with("ServoGroup_get_") => {
                args.expect_len(1)?;
                let (vessel, group) = lookup_group(&save, call, args.object(0)?)?;
                group_property(call, vessel, group, &procedure["ServoGroup_get_".len()..])
            }
            procedure if procedure.starts_with("Servo_get_") => {
                args.expect_len(1)?;
                let (vessel, servo) = lookup_servo(&save, call, args.object(0)?)?;
                servo_property(call, vessel, servo, &procedure["Servo_get_".len()..])
            }
            _ => Err(unknown_procedure(call)),
        }
    }
}

impl ProcedureHandler for FixtureSimulator {
    fn handle(&self, call: &ProcedureCall) -> Reply {
        match call.service.as_str() {
            TESTING_TOOLS => self.testing_tools(call),
            SPACE_CENTER => self.space_center(call),
            INFERNAL_ROBOTICS => self.infernal_robotics(call),
            other => Err(RemoteFault::new(
                other,
                "UnknownService",
                format!("no service named '{other}'"),
            )),
        }
    }
}

fn group_property(
    call: &ProcedureCall,
    vessel: &VesselState,
    group: &CraftGroup,
    property: &str,
) -> Reply {
    Ok(match property {
        "Name" => group.name.clone().into(),
        "Speed" => group.speed.into(),
        "Expanded" => group.expanded.into(),
        "ForwardKey" => group.forward_key.clone().into(),
        "ReverseKey" => group.reverse_key.clone().into(),
        "Servos" => Value::objects(group.servos.iter().map(|&index| vessel.servo_ids[index])),
        "Parts" => Value::objects(group.parts.iter().map(|&index| vessel.part_ids[index])),
        _ => return Err(unknown_procedure(call)),
    })
}

fn servo_property(
    call: &ProcedureCall,
    vessel: &VesselState,
    servo: &CraftServo,
    property: &str,
) -> Reply {
    Ok(match property {
        "Name" => servo.name.clone().into(),
        "Part" => Value::object(vessel.part_ids[servo.part]),
        "Position" => servo.position.into(),
        "MinPosition" => servo.min_position.into(),
        "MaxPosition" => servo.max_position.into(),
        "Speed" => servo.speed.into(),
        // Nothing moves in a fixture.
        "IsMoving" => false.into(),
        "IsFreeMoving" => servo.free_moving.into(),
        "IsLocked" => servo.locked.into(),
        _ => return Err(unknown_procedure(call)),
    })
}

fn not_found(call: &ProcedureCall, class: &str, id: ObjectId) -> RemoteFault {
    RemoteFault::new(
        &call.service,
        "ObjectNotFound",
        format!("no {class} with id {id} in the current save"),
    )
}

fn owning_vessel<'s>(
    save: &'s Save,
    call: &ProcedureCall,
    vessel: ObjectId,
    class: &str,
    id: ObjectId,
) -> Result<&'s VesselState, RemoteFault> {
    save.vessel(vessel).ok_or_else(|| not_found(call, class, id))
}

fn lookup_vessel<'s>(
    save: &'s Save,
    call: &ProcedureCall,
    id: ObjectId,
) -> Result<&'s VesselState, RemoteFault> {
    match save.resolve(id) {
        Some(ObjectRef::Vessel { vessel }) => owning_vessel(save, call, vessel, "Vessel", id),
        _ => Err(not_found(call, "Vessel", id)),
    }
}

fn lookup_group<'s>(
    save: &'s Save,
    call: &ProcedureCall,
    id: ObjectId,
) -> Result<(&'s VesselState, &'s CraftGroup), RemoteFault> {
    match save.resolve(id) {
        Some(ObjectRef::ServoGroup { vessel, index }) => {
            let vessel = owning_vessel(save, call, vessel, "ServoGroup", id)?;
            Ok((vessel, &vessel.craft.groups[index]))
        }
        _ => Err(not_found(call, "ServoGroup", id)),
    }
}

fn lookup_servo<'s>(
    save: &'s Save,
    call: &ProcedureCall,
    id: ObjectId,
) -> Result<(&'s VesselState, &'s CraftServo), RemoteFault> {
    match save.resolve(id) {
        Some(ObjectRef::Servo { vessel, index }) => {
            let vessel = owning_vessel(save, call, vessel, "Servo", id)?;
            Ok((vessel, &vessel.craft.servos[index]))
        }
        _ => Err(not_found(call, "Servo", id)),
    }
}

fn lookup_part<'s>(
    save: &'s Save,
    call: &ProcedureCall,
    id: ObjectId,
) -> Result<(&'s VesselState, usize), RemoteFault> {
    match save.resolve(id) {
        Some(ObjectRef::Part { vessel, index }) => {
            let vessel = owning_vessel(save, call, vessel, "Part", id)?;
            Ok((vessel, index))
        }
        _ => Err(not_found(call, "Part", id)),
    }
}

fn unknown_procedure(call: &ProcedureCall) -> RemoteFault {
    RemoteFault::new(
        &call.service,
        "UnknownProcedure",
        format!("no procedure named '{}'", call.procedure),
    )
}

fn no_active_vessel(call: &ProcedureCall) -> RemoteFault {
    RemoteFault::new(&call.service, "NoActiveVessel", "there is no active vessel")
}

fn fixture_fault(call: &ProcedureCall, err: FixtureError) -> RemoteFault {
    let name = match err {
        FixtureError::NotFound(_) => "FixtureNotFound",
        FixtureError::OutsideRoot(_) => "InvalidArgument",
        FixtureError::Io { .. } | FixtureError::Parse { .. } | FixtureError::Invalid { .. } => {
            "InvalidFixture"
        }
    };
    RemoteFault::new(&call.service, name, err.to_string())
}

/// Positional argument accessors that fail with `InvalidArgument`.
struct Args<'c> {
    call: &'c ProcedureCall,
}

impl<'c> Args<'c> {
    fn new(call: &'c ProcedureCall) -> Self {
        Self { call }
    }

    fn invalid(&self, description: String) -> RemoteFault {
        RemoteFault::new(&self.call.service, "InvalidArgument", description)
    }

    fn expect_len(&self, expected: usize) -> Result<(), RemoteFault> {
        let actual = self.call.arguments.len();
        if actual == expected {
            Ok(())
        } else {
            Err(self.invalid(format!(
                "{} takes {expected} argument(s), {actual} given",
                self.call
            )))
        }
    }

    fn get(&self, position: usize) -> Result<&'c Value, RemoteFault> {
        self.call
            .arguments
            .get(position)
            .ok_or_else(|| self.invalid(format!("missing argument {position}")))
    }

    fn object(&self, position: usize) -> Result<ObjectId, RemoteFault> {
        self.get(position)?
            .clone()
            .into_required_object()
            .map_err(|err| self.invalid(format!("argument {position}: {err}")))
    }

    fn text(&self, position: usize) -> Result<&'c str, RemoteFault> {
        match self.get(position)? {
            Value::Text(text) => Ok(text.as_str()),
            other => Err(self.invalid(format!(
                "argument {position}: expected text, found {}",
                other.kind()
            ))),
        }
    }
}
