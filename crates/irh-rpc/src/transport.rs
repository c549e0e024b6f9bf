//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Transport and handler seams for procedure calls."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::error::{Result, RpcError};
use crate::value::{ProcedureCall, RemoteFault, Value};

/// Client side of a connection to a remote service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Invoke a procedure and wait for its return value.
    async fn invoke(&self, call: ProcedureCall) -> Result<Value>;
    /// Release the connection. Later calls fail with [`RpcError::Unreachable`].
    fn close(&self);
    /// Human-readable transport name for logging.
    fn name(&self) -> &'static str;
}

/// Server side: executes procedure calls against some service state.
pub trait ProcedureHandler: Send + Sync {
    fn handle(&self, call: &ProcedureCall) -> std::result::Result<Value, RemoteFault>;
}

/// Transport that calls a handler in the same process.
#[derive(Clone)]
pub struct InProcessTransport {
    handler: Arc<dyn ProcedureHandler>,
    closed: Arc<AtomicBool>,
}

impl InProcessTransport {
    pub fn new(handler: Arc<dyn ProcedureHandler>) -> Self {
        Self {
            handler,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl Transport for InProcessTransport {
    async fn invoke(&self, call: ProcedureCall) -> Result<Value> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RpcError::Unreachable("in-process connection closed".into()));
        }
        trace!(procedure = %call, "in-process invoke");
        self.handler.handle(&call).map_err(RpcError::from)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn name(&self) -> &'static str {
        "in_process"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ProcedureHandler for Echo {
        fn handle(&self, call: &ProcedureCall) -> std::result::Result<Value, RemoteFault> {
            match call.procedure.as_str() {
                "Echo" => Ok(call.arguments.first().cloned().unwrap_or(Value::Null)),
                other => Err(RemoteFault::new(
                    &call.service,
                    "UnknownProcedure",
                    format!("no procedure named {other}"),
                )),
            }
        }
    }

    #[tokio::test]
    async fn forwards_calls_to_handler() {
        let transport = InProcessTransport::new(Arc::new(Echo));
        let value = transport
            .invoke(ProcedureCall::new("Test", "Echo").arg("hello"))
            .await
            .expect("echo succeeds");
        assert_eq!(value, Value::Text("hello".into()));
    }

    #[tokio::test]
    async fn surfaces_remote_faults() {
        let transport = InProcessTransport::new(Arc::new(Echo));
        let err = transport
            .invoke(ProcedureCall::new("Test", "Nope"))
            .await
            .unwrap_err();
        assert_eq!(err.fault_name(), Some("UnknownProcedure"));
        assert!(!err.is_unreachable());
    }

    #[tokio::test]
    async fn closed_transport_is_unreachable() {
        let transport = InProcessTransport::new(Arc::new(Echo));
        let clone = transport.clone();
        transport.close();
        let err = clone
            .invoke(ProcedureCall::new("Test", "Echo"))
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
