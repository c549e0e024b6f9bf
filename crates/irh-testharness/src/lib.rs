//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Scenario harness exports."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Scenario harness for the robotics servo-group API.
//!
//! [`HarnessFixture::setup`] provisions a fresh save holding the scenario
//! vessel. A [`Suite`] of [`ScenarioCase`]s then runs against it, and an
//! [`ExpectationSet`] builds such a suite from a YAML file.

pub mod assertions;
pub mod error;
pub mod expectations;
pub mod fixture;
pub mod suite;

pub use error::{CaseFailure, HarnessError, SetupStage};
pub use expectations::{ExpectationSet, GroupExpectation, ServoLookup};
pub use fixture::HarnessFixture;
pub use suite::{CaseOutcome, CaseReport, FnCase, ScenarioCase, Suite, SuiteReport};
