//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Procedure-call gateway exports."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
//! Procedure-call plumbing between the harness client and a remote service.
//!
//! A call names a service and a procedure and carries positional [`Value`]s.
//! Clients talk through a [`Transport`]; services implement
//! [`ProcedureHandler`]. [`InProcessTransport`] wires the two together inside
//! one process, while [`GrpcServerBuilder`] and [`GrpcTransport`] carry calls
//! over the network.

pub mod error;
pub mod grpc;
pub mod transport;
pub mod value;

pub use error::{Result, RpcError};
pub use grpc::{proto, GrpcServerBuilder, GrpcServerHandle, GrpcTransport, CLIENT_NAME_HEADER};
pub use transport::{InProcessTransport, ProcedureHandler, Transport};
pub use value::{ObjectId, ProcedureCall, RemoteFault, TypeMismatch, Value};
