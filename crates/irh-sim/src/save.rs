//! ---
//! irh_section: "04-stand-in-service"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Save state and remote object registry."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use indexmap::IndexMap;
use irh_rpc::ObjectId;

use crate::craft::Craft;

/// What a live object id points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectRef {
    Vessel { vessel: ObjectId },
    ServoGroup { vessel: ObjectId, index: usize },
    Servo { vessel: ObjectId, index: usize },
    Part { vessel: ObjectId, index: usize },
}

impl ObjectRef {
    fn vessel(&self) -> ObjectId {
        match *self {
            ObjectRef::Vessel { vessel }
            | ObjectRef::ServoGroup { vessel, .. }
            | ObjectRef::Servo { vessel, .. }
            | ObjectRef::Part { vessel, .. } => vessel,
        }
    }
}

/// A launched craft together with the ids allocated for its entities.
#[derive(Debug, Clone)]
pub struct VesselState {
    pub id: ObjectId,
    pub craft: Craft,
    pub group_ids: Vec<ObjectId>,
    pub servo_ids: Vec<ObjectId>,
    pub part_ids: Vec<ObjectId>,
}

/// Vessels in the current save. Ids are never reused, even across saves.
#[derive(Debug, Default)]
pub struct Save {
    next_id: u64,
    vessels: IndexMap<ObjectId, VesselState>,
    objects: IndexMap<ObjectId, ObjectRef>,
    active: Option<ObjectId>,
}

impl Save {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId::new(self.next_id)
    }

    /// Drop every vessel. The id counter keeps running.
    pub fn clear(&mut self) {
        self.vessels.clear();
        self.objects.clear();
        self.active = None;
    }

    /// Add a vessel without changing which vessel is active.
    pub fn add(&mut self, craft: Craft) -> ObjectId {
        let vessel = self.allocate();
        self.objects.insert(vessel, ObjectRef::Vessel { vessel });

        let mut part_ids = Vec::with_capacity(craft.parts.len());
        for index in 0..craft.parts.len() {
            let id = self.allocate();
            self.objects.insert(id, ObjectRef::Part { vessel, index });
            part_ids.push(id);
        }
        let mut servo_ids = Vec::with_capacity(craft.servos.len());
        for index in 0..craft.servos.len() {
            let id = self.allocate();
            self.objects.insert(id, ObjectRef::Servo { vessel, index });
            servo_ids.push(id);
        }
        let mut group_ids = Vec::with_capacity(craft.groups.len());
        for index in 0..craft.groups.len() {
            let id = self.allocate();
            self.objects.insert(id, ObjectRef::ServoGroup { vessel, index });
            group_ids.push(id);
        }

        self.vessels.insert(
            vessel,
            VesselState {
                id: vessel,
                craft,
                group_ids,
                servo_ids,
                part_ids,
            },
        );
        vessel
    }

    /// Add a vessel and make it the active one.
    pub fn launch(&mut self, craft: Craft) -> ObjectId {
        let vessel = self.add(craft);
        self.active = Some(vessel);
        vessel
    }

    /// Remove every vessel except the active one, returning how many went.
    /// Without an active vessel nothing is removed and `None` is returned.
    pub fn remove_other_vessels(&mut self) -> Option<usize> {
        let active = self.active?;
        let before = self.vessels.len();
        self.vessels.retain(|id, _| *id == active);
        self.objects.retain(|_, object| object.vessel() == active);
        Some(before - self.vessels.len())
    }

    pub fn active_vessel(&self) -> Option<ObjectId> {
        self.active
    }

    pub fn vessel_ids(&self) -> Vec<ObjectId> {
        self.vessels.keys().copied().collect()
    }

    pub fn resolve(&self, id: ObjectId) -> Option<ObjectRef> {
        self.objects.get(&id).copied()
    }

    pub fn vessel(&self, id: ObjectId) -> Option<&VesselState> {
        self.vessels.get(&id)
    }
}
