//! Call classification
//!
//! Maps an intercepted method name to the category that decides how the
//! proxy handles it. The check order is load-bearing: a method is never in
//! two categories, and passthrough is the catch-all so unrecognized driver
//! extension methods keep working with no side effects, timing or
//! notification.

use crate::execution::StatementKind;

pub const TO_STRING: &str = "to_string";
pub const GET_DATA_SOURCE_NAME: &str = "get_data_source_name";
pub const GET_TARGET: &str = "get_target";
pub const GET_CONNECTION: &str = "get_connection";
pub const ADD_BATCH: &str = "add_batch";
pub const CLEAR_BATCH: &str = "clear_batch";
pub const CLEAR_PARAMETERS: &str = "clear_parameters";
pub const REGISTER_OUT_PARAMETER: &str = "register_out_parameter";
pub const GET_RESULT_SET: &str = "get_result_set";
pub const GET_GENERATED_KEYS: &str = "get_generated_keys";
pub const CREATE_STATEMENT: &str = "create_statement";
pub const PREPARE_STATEMENT: &str = "prepare_statement";
pub const PREPARE_CALL: &str = "prepare_call";
pub const COMMIT: &str = "commit";
pub const ROLLBACK: &str = "rollback";
pub const CLOSE: &str = "close";

/// Identity and self-description calls answered from proxy-local state
pub const IDENTITY_METHODS: &[&str] = &[TO_STRING, GET_DATA_SOURCE_NAME, GET_TARGET];

/// Capability-negotiation calls, delegated untouched
pub const WRAPPER_METHODS: &[&str] = &["unwrap", "is_wrapper_for"];

/// Single-query execution methods
pub const QUERY_EXEC_METHODS: &[&str] =
    &["execute", "execute_query", "execute_update", "execute_large_update"];

/// Batch execution methods
pub const BATCH_EXEC_METHODS: &[&str] = &["execute_batch", "execute_large_batch"];

/// Methods whose return value is a result set
pub const RESULT_SET_RETURNING_METHODS: &[&str] =
    &["execute_query", GET_RESULT_SET, GET_GENERATED_KEYS];

/// Execution methods that can produce generated keys (everything except
/// `execute_query`)
pub const KEY_PRODUCING_METHODS: &[&str] = &[
    "execute",
    "execute_update",
    "execute_large_update",
    "execute_batch",
    "execute_large_batch",
];

/// Batch-control methods; plain statements queue query text, parameterized
/// statements snapshot the bound parameters
pub const BATCH_CONTROL_METHODS: &[&str] = &[ADD_BATCH, CLEAR_BATCH];

/// Parameter-binding and clearing methods (parameterized statements only)
pub const PARAMETER_METHODS: &[&str] = &[
    "set_null",
    "set_boolean",
    "set_byte",
    "set_short",
    "set_int",
    "set_long",
    "set_float",
    "set_double",
    "set_big_decimal",
    "set_string",
    "set_bytes",
    "set_date",
    "set_time",
    "set_timestamp",
    "set_object",
    "set_array",
    "set_blob",
    "set_clob",
    "set_n_string",
    "set_url",
    CLEAR_PARAMETERS,
    REGISTER_OUT_PARAMETER,
];

/// How the statement proxy handles one intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallCategory {
    /// Answered from proxy-local state
    Identity,
    /// Delegated untouched (unwrap-style negotiation)
    Wrapper,
    /// Returns the identifier of the owning connection
    ConnectionRetrieval,
    /// add/clear batch
    BatchControl,
    /// Parameter binding, clearing or out-parameter registration
    ParameterOperation,
    /// Execution-boundary or result-retrieval call, goes through the
    /// execution recorder
    Execution,
    /// Anything else: delegated with no side effects
    Passthrough,
}

/// Classifies a statement-level call. First match wins; the order mirrors
/// the precedence documented on [`CallCategory`].
pub fn classify(kind: StatementKind, method: &str) -> CallCategory {
    if IDENTITY_METHODS.contains(&method) {
        CallCategory::Identity
    } else if WRAPPER_METHODS.contains(&method) {
        CallCategory::Wrapper
    } else if method == GET_CONNECTION {
        CallCategory::ConnectionRetrieval
    } else if kind == StatementKind::Plain && BATCH_CONTROL_METHODS.contains(&method) {
        CallCategory::BatchControl
    } else if kind.is_parameterized() && PARAMETER_METHODS.contains(&method) {
        CallCategory::ParameterOperation
    } else if kind.is_parameterized() && BATCH_CONTROL_METHODS.contains(&method) {
        CallCategory::BatchControl
    } else if is_execution_method(method) {
        CallCategory::Execution
    } else {
        CallCategory::Passthrough
    }
}

/// Whether the recorder path handles this method
pub fn is_execution_method(method: &str) -> bool {
    QUERY_EXEC_METHODS.contains(&method)
        || BATCH_EXEC_METHODS.contains(&method)
        || method == GET_RESULT_SET
        || method == GET_GENERATED_KEYS
}

pub fn is_query_execution(method: &str) -> bool {
    QUERY_EXEC_METHODS.contains(&method)
}

pub fn is_batch_execution(method: &str) -> bool {
    BATCH_EXEC_METHODS.contains(&method)
}

pub fn returns_result_set(method: &str) -> bool {
    RESULT_SET_RETURNING_METHODS.contains(&method)
}

pub fn can_produce_keys(method: &str) -> bool {
    KEY_PRODUCING_METHODS.contains(&method)
}

/// How the connection proxy handles one intercepted call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCallCategory {
    Identity,
    Wrapper,
    /// `create_statement`: wrap the child in a plain statement proxy
    CreateStatement,
    /// `prepare_statement` / `prepare_call`: transform the text, then wrap
    Prepare,
    /// commit / rollback / close, updates lifecycle counters
    Lifecycle,
    Passthrough,
}

/// Classifies a connection-level call; same first-match-wins discipline
pub fn classify_connection(method: &str) -> ConnectionCallCategory {
    if IDENTITY_METHODS.contains(&method) {
        ConnectionCallCategory::Identity
    } else if WRAPPER_METHODS.contains(&method) {
        ConnectionCallCategory::Wrapper
    } else if method == CREATE_STATEMENT {
        ConnectionCallCategory::CreateStatement
    } else if method == PREPARE_STATEMENT || method == PREPARE_CALL {
        ConnectionCallCategory::Prepare
    } else if method == COMMIT || method == ROLLBACK || method == CLOSE {
        ConnectionCallCategory::Lifecycle
    } else {
        ConnectionCallCategory::Passthrough
    }
}
