// SPDX-License-Identifier: Apache-2.0

//! Execution records
//!
//! One [`ExecutionInfo`] is built per execution-boundary call, filled in as
//! the call proceeds, handed to the listeners before and after delegation,
//! then discarded. It is never shared across concurrent calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::delegate::{CallOutcome, SharedResultSet};
use crate::proxy::parameter::ParameterSetOperation;
use crate::value::Value;

/// The kind of statement a proxy shadows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Plain statement executed with literal query text per call
    Plain,
    /// Prepared statement carrying positional parameters
    Prepared,
    /// Callable statement carrying positional or named parameters
    Callable,
}

impl StatementKind {
    /// Whether this kind binds parameters ahead of execution
    pub fn is_parameterized(&self) -> bool {
        !matches!(self, Self::Plain)
    }
}

/// One query with its parameter sets
///
/// For a parameter batch there is a single `QueryInfo` whose
/// `parameters_list` holds one entry per batch addition; for a text batch
/// there is one `QueryInfo` per queued text with no parameter sets.
#[derive(Debug, Clone, Default)]
pub struct QueryInfo {
    pub query: String,
    pub parameters_list: Vec<Vec<ParameterSetOperation>>,
}

impl QueryInfo {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            parameters_list: Vec::new(),
        }
    }
}

/// The result value captured in an execution record
///
/// A clonable view of [`CallOutcome`]: statement outcomes never reach the
/// recorder (child statements are only created at connection scope), so the
/// record only distinguishes scalar values and result-set handles.
#[derive(Clone, Default)]
pub enum RecordedOutcome {
    #[default]
    None,
    Value(Value),
    ResultSet(SharedResultSet),
}

impl RecordedOutcome {
    pub(crate) fn from_outcome(outcome: &CallOutcome) -> Self {
        match outcome {
            CallOutcome::None | CallOutcome::Statement(_) => Self::None,
            CallOutcome::Value(v) => Self::Value(v.clone()),
            CallOutcome::ResultSet(rs) => Self::ResultSet(std::sync::Arc::clone(rs)),
        }
    }
}

impl std::fmt::Debug for RecordedOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::ResultSet(_) => write!(f, "ResultSet(..)"),
        }
    }
}

/// Full record of one execution-boundary call
pub struct ExecutionInfo {
    /// Logical name of the data source
    pub data_source_name: String,
    /// Id of the connection the statement belongs to
    pub connection_id: String,
    /// Kind of the statement under proxy
    pub statement_kind: StatementKind,
    /// Whether this was a batch execution
    pub batch: bool,
    /// Number of batch entries submitted, 0 for non-batch execution
    pub batch_size: usize,
    /// The invoked method
    pub method: String,
    /// Raw arguments as delegated (query text already transformed)
    pub args: Vec<Value>,
    /// The queries this call executes
    pub queries: Vec<QueryInfo>,
    /// Result of the delegated call, filled on success
    pub result: RecordedOutcome,
    /// Generated-keys handle held after the call, if any
    pub generated_keys: Option<SharedResultSet>,
    /// Wall-clock duration of the delegated call
    pub elapsed: Duration,
    /// Whether the delegated call succeeded
    pub success: bool,
    /// Captured failure message when the delegated call failed
    pub error: Option<String>,
}

impl ExecutionInfo {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        data_source_name: String,
        connection_id: String,
        statement_kind: StatementKind,
        batch: bool,
        batch_size: usize,
        method: String,
        args: Vec<Value>,
        queries: Vec<QueryInfo>,
    ) -> Self {
        Self {
            data_source_name,
            connection_id,
            statement_kind,
            batch,
            batch_size,
            method,
            args,
            queries,
            result: RecordedOutcome::None,
            generated_keys: None,
            elapsed: Duration::ZERO,
            success: false,
            error: None,
        }
    }
}
