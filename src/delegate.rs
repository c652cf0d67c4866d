//! Delegate trait definitions
//!
//! These are the core abstractions the proxy layer wraps. A delegate is the
//! underlying driver object for one capability kind (connection, statement,
//! result set), exposing the standard synchronous call surface as a generic
//! `invoke` entry point. The proxies implement the same traits, so a proxy
//! is shape-identical to the object it shadows and can be substituted
//! anywhere the raw delegate is expected.

use std::sync::{Arc, Mutex};

use crate::error::ProxyResult;
use crate::value::Value;

/// One intercepted method call: a method identifier plus its argument list
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<Value>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// A call that carries no arguments
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Vec::new())
    }
}

/// Shared handle to a result-set delegate
///
/// The same handle may be held by the generated-keys cache, the execution
/// record and the caller at once, mirroring the reference semantics of the
/// driver object it stands for.
pub type SharedResultSet = Arc<Mutex<dyn ResultSetDelegate>>;

/// What a delegated call produced
pub enum CallOutcome {
    /// The call returned nothing
    None,
    /// A scalar result (update count, flag, metadata value, ...)
    Value(Value),
    /// A result-set handle
    ResultSet(SharedResultSet),
    /// A freshly created statement object (from `create_statement`,
    /// `prepare_statement` or `prepare_call`)
    Statement(Box<dyn StatementDelegate>),
}

impl std::fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::ResultSet(_) => write!(f, "ResultSet(..)"),
            Self::Statement(_) => write!(f, "Statement(..)"),
        }
    }
}

/// Connection-level delegate: the wrapped driver connection
pub trait ConnectionDelegate: Send {
    /// Invokes one method on the underlying connection
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome>;
}

/// Statement-level delegate: plain, prepared and callable statements share
/// this surface; named parameters and out-parameter registration arrive
/// through `invoke` like every other call
pub trait StatementDelegate: Send {
    /// Invokes one method on the underlying statement
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome>;

    /// Retrieves the generated-keys result set from the underlying
    /// statement (the dedicated accessor used for auto-retrieval)
    fn generated_keys(&mut self) -> ProxyResult<SharedResultSet>;
}

/// Result-set delegate
pub trait ResultSetDelegate: Send {
    /// Invokes one method on the underlying result set
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome>;

    /// Whether this result set has been closed
    fn is_closed(&self) -> bool;

    /// Closes this result set; closing an already closed result set is a
    /// no-op
    fn close(&mut self) -> ProxyResult<()>;
}
