//! ---
//! irh_section: "04-stand-in-service"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Stand-in service exports."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! A fixture-backed stand-in for the game's remote services.
//!
//! The stand-in answers the testing-tools, space-center and robotics
//! procedures the harness needs, serving vessel state loaded from craft
//! fixtures. It keeps no physics and moves no servos.

pub mod craft;
pub mod save;
pub mod service;

pub use craft::{Craft, CraftFile, FixtureError, FixtureLibrary};
pub use save::{ObjectRef, Save, VesselState};
pub use service::FixtureSimulator;
