//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Error taxonomy for procedure calls."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use thiserror::Error;

use crate::value::RemoteFault;

pub type Result<T> = std::result::Result<T, RpcError>;

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The service cannot be reached: connection refused, dropped or closed.
    #[error("remote service unreachable: {0}")]
    Unreachable(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote fault {0}")]
    Remote(#[from] RemoteFault),
    #[error("invalid response to {procedure}: {reason}")]
    InvalidResponse { procedure: String, reason: String },
}

impl RpcError {
    /// Whether the failure means the service itself is gone.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RpcError::Unreachable(_))
    }

    /// Name of the remote fault, if the service raised one.
    pub fn fault_name(&self) -> Option<&str> {
        match self {
            RpcError::Remote(fault) => Some(fault.name.as_str()),
            _ => None,
        }
    }
}
