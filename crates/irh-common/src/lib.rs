//! ---
//! irh_section: "01-core-functionality"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Shared primitives for the harness workspace."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Shared primitives for the servo-group scenario harness.
//! This crate exposes configuration loading and tracing setup consumed by
//! the simulator daemon, the control CLI and the integration suites.

pub mod config;
pub mod logging;

pub use config::{
    EndpointConfig, HarnessConfig, LoadedHarnessConfig, LoggingConfig, ScenarioConfig,
    SimulatorConfig,
};
pub use logging::{init_default, init_tracing, LogFormat};
