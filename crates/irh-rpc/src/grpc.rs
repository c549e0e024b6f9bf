//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "gRPC gateway server and client transport."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::server::TcpIncoming;
use tonic::transport::{Channel, Endpoint, Server};
use tonic::{Code, Request, Response, Status};
use tracing::{debug, info, warn};

use crate::error::{Result, RpcError};
use crate::transport::{ProcedureHandler, Transport};
use crate::value::{ObjectId, ProcedureCall, RemoteFault, Value};

#[allow(missing_docs)]
pub mod proto {
    tonic::include_proto!("irh.gateway");
}

use proto::gateway_client::GatewayClient;
use proto::gateway_server::{Gateway, GatewayServer};

/// Metadata key carrying the calling client's name.
pub const CLIENT_NAME_HEADER: &str = "x-client-name";

/// Builder for the gateway server.
#[derive(Clone)]
pub struct GrpcServerBuilder {
    listen: SocketAddr,
    handler: Arc<dyn ProcedureHandler>,
    server_name: String,
}

impl GrpcServerBuilder {
    pub fn new(listen: SocketAddr, handler: Arc<dyn ProcedureHandler>) -> Self {
        Self {
            listen,
            handler,
            server_name: "irh-gateway".to_owned(),
        }
    }

    /// Name reported to clients through `GetStatus`.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// Spawn the gateway server and return a handle for coordinated shutdown.
    pub async fn spawn(self) -> anyhow::Result<GrpcServerHandle> {
        let listener = tokio::net::TcpListener::bind(self.listen).await?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, server = %self.server_name, "gateway listening");

        let service = GatewaySvc {
            handler: self.handler,
            server_name: self.server_name,
        };

        let incoming = TcpIncoming::from_listener(listener, true, None)
            .map_err(|err| anyhow::anyhow!("failed to build gateway incoming listener: {err}"))?;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let server = Server::builder()
                .add_service(GatewayServer::new(service))
                .serve_with_incoming_shutdown(incoming, async move {
                    let _ = shutdown_rx.changed().await;
                });
            if let Err(err) = server.await {
                warn!(error = %err, "gateway server exited with error");
            }
        });

        Ok(GrpcServerHandle {
            address: local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Handle returned when spawning the gateway server.
pub struct GrpcServerHandle {
    address: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl GrpcServerHandle {
    /// Socket address the server bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.address
    }

    /// `http://` endpoint clients can connect to.
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Signal shutdown and await task completion.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(()) => Ok(()),
            Err(err) => Err(anyhow::anyhow!(err)),
        }
    }
}

struct GatewaySvc {
    handler: Arc<dyn ProcedureHandler>,
    server_name: String,
}

#[tonic::async_trait]
impl Gateway for GatewaySvc {
    async fn invoke(
        &self,
        request: Request<proto::ProcedureCall>,
    ) -> std::result::Result<Response<proto::ProcedureResult>, Status> {
        let client = request
            .metadata()
            .get(CLIENT_NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("anonymous")
            .to_owned();
        let call = ProcedureCall::from(request.into_inner());

        let result = match self.handler.handle(&call) {
            Ok(value) => {
                debug!(client = %client, procedure = %call, "procedure completed");
                proto::ProcedureResult {
                    value: Some(value.into()),
                    fault: None,
                }
            }
            Err(fault) => {
                debug!(client = %client, procedure = %call, fault = %fault, "procedure raised fault");
                proto::ProcedureResult {
                    value: None,
                    fault: Some(fault.into()),
                }
            }
        };
        Ok(Response::new(result))
    }

    async fn get_status(
        &self,
        _request: Request<proto::Empty>,
    ) -> std::result::Result<Response<proto::ServerStatus>, Status> {
        Ok(Response::new(proto::ServerStatus {
            server: self.server_name.clone(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }))
    }
}

/// Client transport speaking to a gateway over gRPC.
#[derive(Clone)]
pub struct GrpcTransport {
    client: GatewayClient<Channel>,
    client_name: MetadataValue<Ascii>,
    server: proto::ServerStatus,
    closed: Arc<AtomicBool>,
}

impl GrpcTransport {
    /// Connect to `endpoint` and perform the status handshake.
    pub async fn connect(
        endpoint: &str,
        client_name: &str,
        connect_timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Endpoint::from_shared(endpoint.to_owned())
            .map_err(|err| RpcError::Transport(format!("invalid endpoint {endpoint}: {err}")))?;
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let channel = builder
            .connect()
            .await
            .map_err(|err| RpcError::Unreachable(format!("{endpoint}: {err}")))?;
        let client_name = MetadataValue::try_from(client_name)
            .map_err(|err| RpcError::Transport(format!("invalid client name: {err}")))?;

        let mut client = GatewayClient::new(channel);
        let server = client
            .get_status(Request::new(proto::Empty {}))
            .await
            .map_err(status_to_error)?
            .into_inner();
        info!(endpoint, server = %server.server, version = %server.version, "connected to gateway");

        Ok(Self {
            client,
            client_name,
            server,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Name the server reported during the handshake.
    pub fn server_name(&self) -> &str {
        &self.server.server
    }

    /// Version the server reported during the handshake.
    pub fn server_version(&self) -> &str {
        &self.server.version
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn invoke(&self, call: ProcedureCall) -> Result<Value> {
        if self.closed.load(Ordering::Acquire) {
            return Err(RpcError::Unreachable("gateway connection closed".into()));
        }
        let mut request = Request::new(proto::ProcedureCall::from(call));
        request
            .metadata_mut()
            .insert(CLIENT_NAME_HEADER, self.client_name.clone());

        let mut client = self.client.clone();
        let result = client
            .invoke(request)
            .await
            .map_err(status_to_error)?
            .into_inner();
        match (result.fault, result.value) {
            (Some(fault), _) => Err(RpcError::Remote(fault.into())),
            (None, Some(value)) => Ok(value.into()),
            (None, None) => Ok(Value::Null),
        }
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn name(&self) -> &'static str {
        "grpc"
    }
}

// Procedure faults travel in-band. Only statuses that mean the gateway
// cannot be reached are reported as unreachable.
fn status_to_error(status: Status) -> RpcError {
    match status.code() {
        Code::Unavailable | Code::Cancelled | Code::DeadlineExceeded => {
            RpcError::Unreachable(status.message().to_owned())
        }
        _ => RpcError::Transport(status.to_string()),
    }
}

impl From<Value> for proto::Value {
    fn from(value: Value) -> Self {
        use proto::value::Kind;
        let kind = match value {
            Value::Null => None,
            Value::Object(id) => Some(Kind::Object(id.get())),
            Value::Text(text) => Some(Kind::Text(text)),
            Value::Bool(flag) => Some(Kind::Flag(flag)),
            Value::Number(number) => Some(Kind::Number(number)),
            Value::List(items) => Some(Kind::List(proto::ValueList {
                items: items.into_iter().map(Into::into).collect(),
            })),
        };
        Self { kind }
    }
}

impl From<proto::Value> for Value {
    fn from(value: proto::Value) -> Self {
        use proto::value::Kind;
        match value.kind {
            None => Value::Null,
            Some(Kind::Object(raw)) => Value::object(ObjectId::new(raw)),
            Some(Kind::Text(text)) => Value::Text(text),
            Some(Kind::Flag(flag)) => Value::Bool(flag),
            Some(Kind::Number(number)) => Value::Number(number),
            Some(Kind::List(list)) => Value::List(list.items.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<ProcedureCall> for proto::ProcedureCall {
    fn from(call: ProcedureCall) -> Self {
        Self {
            service: call.service,
            procedure: call.procedure,
            arguments: call.arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<proto::ProcedureCall> for ProcedureCall {
    fn from(call: proto::ProcedureCall) -> Self {
        Self {
            service: call.service,
            procedure: call.procedure,
            arguments: call.arguments.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RemoteFault> for proto::Fault {
    fn from(fault: RemoteFault) -> Self {
        Self {
            service: fault.service,
            name: fault.name,
            description: fault.description,
        }
    }
}

impl From<proto::Fault> for RemoteFault {
    fn from(fault: proto::Fault) -> Self {
        RemoteFault::new(fault.service, fault.name, fault.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lookup;

    impl ProcedureHandler for Lookup {
        fn handle(&self, call: &ProcedureCall) -> std::result::Result<Value, RemoteFault> {
            match call.procedure.as_str() {
                "Find" => match call.arguments.first() {
                    Some(Value::Text(name)) if name == "present" => {
                        Ok(Value::object(ObjectId::new(42)))
                    }
                    _ => Ok(Value::Null),
                },
                "Names" => Ok(Value::List(vec!["a".into(), "b".into()])),
                _ => Err(RemoteFault::new(
                    &call.service,
                    "UnknownProcedure",
                    call.procedure.clone(),
                )),
            }
        }
    }

    async fn spawn_lookup() -> GrpcServerHandle {
        GrpcServerBuilder::new("127.0.0.1:0".parse().unwrap(), Arc::new(Lookup))
            .server_name("lookup")
            .spawn()
            .await
            .unwrap()
    }

    #[test]
    fn null_object_decodes_as_null() {
        let wire = proto::Value {
            kind: Some(proto::value::Kind::Object(0)),
        };
        assert_eq!(Value::from(wire), Value::Null);
        assert_eq!(proto::Value::from(Value::Null).kind, None);
    }

    #[test]
    fn only_connectivity_statuses_are_unreachable() {
        for code in [Code::Unavailable, Code::Cancelled, Code::DeadlineExceeded] {
            assert!(status_to_error(Status::new(code, "down")).is_unreachable());
        }
        for code in [
            Code::ResourceExhausted,
            Code::InvalidArgument,
            Code::Internal,
            Code::Unimplemented,
            Code::Unknown,
        ] {
            let err = status_to_error(Status::new(code, "still up"));
            assert!(matches!(err, RpcError::Transport(_)), "{code:?} -> {err:?}");
        }
    }

    #[tokio::test]
    async fn invoke_over_grpc() {
        let handle = spawn_lookup().await;
        let transport = GrpcTransport::connect(&handle.endpoint(), "unit", None)
            .await
            .unwrap();
        assert_eq!(transport.server_name(), "lookup");

        let found = transport
            .invoke(ProcedureCall::new("Test", "Find").arg("present"))
            .await
            .unwrap();
        assert_eq!(found.into_object().unwrap(), Some(ObjectId::new(42)));

        let missing = transport
            .invoke(ProcedureCall::new("Test", "Find").arg("absent"))
            .await
            .unwrap();
        assert_eq!(missing, Value::Null);

        let names = transport
            .invoke(ProcedureCall::new("Test", "Names"))
            .await
            .unwrap();
        assert_eq!(names, Value::List(vec!["a".into(), "b".into()]));

        let err = transport
            .invoke(ProcedureCall::new("Test", "Explode"))
            .await
            .unwrap_err();
        assert_eq!(err.fault_name(), Some("UnknownProcedure"));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn refused_connection_is_unreachable() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = GrpcTransport::connect(
            &format!("http://{addr}"),
            "unit",
            Some(Duration::from_secs(1)),
        )
        .await
        .err()
        .expect("connection should be refused");
        assert!(err.is_unreachable());
    }

    #[tokio::test]
    async fn closed_transport_stops_calling() {
        let handle = spawn_lookup().await;
        let transport = GrpcTransport::connect(&handle.endpoint(), "unit", None)
            .await
            .unwrap();
        transport.close();
        let err = transport
            .invoke(ProcedureCall::new("Test", "Names"))
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
        handle.shutdown().await.unwrap();
    }
}
