//! ---
//! irh_section: "02-rpc-gateway"
//! irh_subsection: "module"
//! irh_type: "source"
//! irh_scope: "code"
//! irh_description: "Procedure call and value model shared by clients and services."
//! irh_version: "v0.1.0"
//! irh_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of a remote object. Id `0` is reserved for the null object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The null object, returned by lookups that found nothing.
    pub const NULL: ObjectId = ObjectId(0);

    /// Wrap a raw wire identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw wire identifier.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the null object.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value carried as a procedure argument or return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Object(ObjectId),
    Text(String),
    Bool(bool),
    Number(f64),
    List(Vec<Value>),
}

/// Raised when a value does not have the shape a caller expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {actual}")]
pub struct TypeMismatch {
    pub expected: &'static str,
    pub actual: &'static str,
}

impl Value {
    /// Object value, collapsing the null id into [`Value::Null`].
    pub fn object(id: ObjectId) -> Self {
        if id.is_null() {
            Value::Null
        } else {
            Value::Object(id)
        }
    }

    /// Object value for an optional id.
    pub fn optional_object(id: Option<ObjectId>) -> Self {
        id.map(Value::object).unwrap_or(Value::Null)
    }

    /// List of object values.
    pub fn objects<I: IntoIterator<Item = ObjectId>>(ids: I) -> Self {
        Value::List(ids.into_iter().map(Value::object).collect())
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::Text(_) => "text",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::List(_) => "list",
        }
    }

    fn mismatch(&self, expected: &'static str) -> TypeMismatch {
        TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }

    /// Interpret as a possibly-null object reference.
    pub fn into_object(self) -> Result<Option<ObjectId>, TypeMismatch> {
        match self {
            Value::Null => Ok(None),
            Value::Object(id) if id.is_null() => Ok(None),
            Value::Object(id) => Ok(Some(id)),
            other => Err(other.mismatch("object")),
        }
    }

    /// Interpret as a non-null object reference.
    pub fn into_required_object(self) -> Result<ObjectId, TypeMismatch> {
        match self.into_object()? {
            Some(id) => Ok(id),
            None => Err(TypeMismatch {
                expected: "object",
                actual: "null",
            }),
        }
    }

    pub fn into_text(self) -> Result<String, TypeMismatch> {
        match self {
            Value::Text(text) => Ok(text),
            other => Err(other.mismatch("text")),
        }
    }

    pub fn into_bool(self) -> Result<bool, TypeMismatch> {
        match self {
            Value::Bool(flag) => Ok(flag),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn into_number(self) -> Result<f64, TypeMismatch> {
        match self {
            Value::Number(number) => Ok(number),
            other => Err(other.mismatch("number")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>, TypeMismatch> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(other.mismatch("list")),
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::object(id)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Bool(flag)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Value::Number(number)
    }
}

/// A single invocation of `service.procedure(arguments...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureCall {
    pub service: String,
    pub procedure: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

impl ProcedureCall {
    pub fn new(service: impl Into<String>, procedure: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            procedure: procedure.into(),
            arguments: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.arguments.push(value.into());
        self
    }
}

impl fmt::Display for ProcedureCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.service, self.procedure)
    }
}

/// An error raised by the remote service while executing a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{service}.{name}: {description}")]
pub struct RemoteFault {
    pub service: String,
    pub name: String,
    pub description: String,
}

impl RemoteFault {
    pub fn new(
        service: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}
