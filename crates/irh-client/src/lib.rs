//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Typed client exports."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Typed client for the remote game services.
//!
//! Every remote entity is a cheap, cloneable handle holding an [`ObjectId`]
//! and the [`Connection`] it came from. Lookups that can find nothing return
//! `Option`, so "not found" never travels through the error path.

#[macro_use]
mod handle;

pub mod connection;
pub mod infernal_robotics;
pub mod space_center;
pub mod testing_tools;

pub use connection::Connection;
pub use infernal_robotics::{InfernalRobotics, Servo, ServoGroup};
pub use irh_rpc::{ObjectId, RpcError as ClientError};
pub use space_center::{Part, SpaceCenter, Vessel};
pub use testing_tools::TestingTools;

pub type Result<T> = std::result::Result<T, ClientError>;
