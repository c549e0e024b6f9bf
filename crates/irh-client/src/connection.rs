//! ---
//! irh_section: "03-client"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Session handle and reply decoding."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use irh_rpc::{
    GrpcTransport, ObjectId, ProcedureCall, RpcError, Transport, TypeMismatch, Value,
};
use tracing::{debug, info};

use crate::infernal_robotics::InfernalRobotics;
use crate::space_center::SpaceCenter;
use crate::testing_tools::TestingTools;
use crate::Result;

/// A session with the remote service. Cloning shares the underlying transport.
#[derive(Clone)]
pub struct Connection {
    transport: Arc<dyn Transport>,
    client_name: Arc<str>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("transport", &self.transport.name())
            .field("client_name", &self.client_name)
            .finish()
    }
}

impl Connection {
    /// Open a gRPC session with the gateway at `endpoint`.
    pub async fn connect(
        endpoint: &str,
        client_name: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let transport = GrpcTransport::connect(endpoint, client_name, connect_timeout).await?;
        info!(endpoint, client = client_name, "session opened");
        Ok(Self::with_transport(Arc::new(transport), client_name))
    }

    /// Wrap an already established transport.
    pub fn with_transport(transport: Arc<dyn Transport>, client_name: &str) -> Self {
        Self {
            transport,
            client_name: Arc::from(client_name),
        }
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.name()
    }

    /// Robotics sub-service.
    pub fn infernal_robotics(&self) -> InfernalRobotics {
        InfernalRobotics::new(self.clone())
    }

    /// Space-center sub-service.
    pub fn space_center(&self) -> SpaceCenter {
        SpaceCenter::new(self.clone())
    }

    /// Testing-tools sub-service used to provision scenarios.
    pub fn testing_tools(&self) -> TestingTools {
        TestingTools::new(self.clone())
    }

    /// Release the session for every clone sharing it.
    pub fn close(&self) {
        debug!(client = %self.client_name, transport = self.transport.name(), "closing session");
        self.transport.close();
    }

    pub(crate) async fn invoke(&self, call: ProcedureCall) -> Result<Value> {
        self.transport.invoke(call).await
    }

    pub(crate) async fn call_unit(&self, call: ProcedureCall) -> Result<()> {
        self.invoke(call).await.map(|_| ())
    }

    pub(crate) async fn call_text(&self, call: ProcedureCall) -> Result<String> {
        let procedure = call.to_string();
        decode(&procedure, self.invoke(call).await?.into_text())
    }

    pub(crate) async fn call_bool(&self, call: ProcedureCall) -> Result<bool> {
        let procedure = call.to_string();
        decode(&procedure, self.invoke(call).await?.into_bool())
    }

    pub(crate) async fn call_number(&self, call: ProcedureCall) -> Result<f64> {
        let procedure = call.to_string();
        decode(&procedure, self.invoke(call).await?.into_number())
    }

    pub(crate) async fn call_object(&self, call: ProcedureCall) -> Result<Option<ObjectId>> {
        let procedure = call.to_string();
        decode(&procedure, self.invoke(call).await?.into_object())
    }

    pub(crate) async fn call_required_object(&self, call: ProcedureCall) -> Result<ObjectId> {
        let procedure = call.to_string();
        decode(&procedure, self.invoke(call).await?.into_required_object())
    }

    pub(crate) async fn call_objects(&self, call: ProcedureCall) -> Result<Vec<ObjectId>> {
        let procedure = call.to_string();
        let items = decode(&procedure, self.invoke(call).await?.into_list())?;
        items
            .into_iter()
            .map(|item| decode(&procedure, item.into_required_object()))
            .collect()
    }
}

fn decode<T>(procedure: &str, decoded: std::result::Result<T, TypeMismatch>) -> Result<T> {
    decoded.map_err(|mismatch| RpcError::InvalidResponse {
        procedure: procedure.to_owned(),
        reason: mismatch.to_string(),
    })
}
