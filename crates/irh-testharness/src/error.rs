//! ---
//! irh_section: "05-scenario-harness"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Setup and case failure types."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::fmt;
use std::path::PathBuf;

use irh_client::ClientError;
use thiserror::Error;

/// Ordered steps of scenario setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupStage {
    Connect,
    NewSave,
    LaunchVessel,
    RemoveOtherVessels,
    RoboticsAvailable,
    ActiveVessel,
}

impl SetupStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetupStage::Connect => "connect",
            SetupStage::NewSave => "new-save",
            SetupStage::LaunchVessel => "launch-vessel",
            SetupStage::RemoveOtherVessels => "remove-other-vessels",
            SetupStage::RoboticsAvailable => "robotics-available",
            SetupStage::ActiveVessel => "active-vessel",
        }
    }
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("setup failed at {stage}: {source}")]
    Setup {
        stage: SetupStage,
        #[source]
        source: ClientError,
    },
    #[error("setup failed at robotics-available: robotics service reports it is unavailable")]
    RoboticsUnavailable,
    #[error("setup failed at active-vessel: no active vessel after launch")]
    NoActiveVessel,
    #[error("failed to read expectations {path}: {source}")]
    ExpectationsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse expectations {path}: {source}")]
    ExpectationsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl HarnessError {
    pub(crate) fn setup(stage: SetupStage) -> impl FnOnce(ClientError) -> Self {
        move |source| HarnessError::Setup { stage, source }
    }

    /// Setup stage the error was raised in, if it is a setup error.
    pub fn stage(&self) -> Option<SetupStage> {
        match self {
            HarnessError::Setup { stage, .. } => Some(*stage),
            HarnessError::RoboticsUnavailable => Some(SetupStage::RoboticsAvailable),
            HarnessError::NoActiveVessel => Some(SetupStage::ActiveVessel),
            HarnessError::ExpectationsIo { .. } | HarnessError::ExpectationsParse { .. } => None,
        }
    }
}

/// Why a single case did not pass.
#[derive(Debug, Clone, Error)]
pub enum CaseFailure {
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error(transparent)]
    Remote(#[from] ClientError),
}

impl CaseFailure {
    pub fn assertion(message: impl Into<String>) -> Self {
        CaseFailure::Assertion(message.into())
    }

    /// The service can no longer be reached, so later cases cannot run either.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, CaseFailure::Remote(err) if err.is_unreachable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_errors_name_their_stage() {
        let err = HarnessError::setup(SetupStage::LaunchVessel)(ClientError::Unreachable(
            "connection refused".into(),
        ));
        assert_eq!(err.stage(), Some(SetupStage::LaunchVessel));
        assert!(err.to_string().starts_with("setup failed at launch-vessel"));
        assert!(HarnessError::NoActiveVessel
            .to_string()
            .contains("active-vessel"));
    }

    #[test]
    fn only_transport_loss_is_unreachable() {
        assert!(CaseFailure::from(ClientError::Unreachable("gone".into())).is_unreachable());
        assert!(!CaseFailure::from(ClientError::Transport("bad".into())).is_unreachable());
        assert!(!CaseFailure::assertion("mismatch").is_unreachable());
    }
}
