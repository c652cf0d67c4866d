//! Tracing-based execution listener
//!
//! Emits structured `tracing` events around every execution-boundary call.
//! Rendering beyond the structured fields is left to whatever subscriber
//! the host application installs.

use tracing::{debug, warn};

use crate::error::ProxyResult;
use crate::execution::ExecutionInfo;
use crate::listener::ExecutionListener;

/// Listener that logs executions through `tracing`
#[derive(Debug, Default)]
pub struct TracingExecutionListener;

impl ExecutionListener for TracingExecutionListener {
    fn before_query(&self, exec: &mut ExecutionInfo) -> ProxyResult<()> {
        debug!(
            data_source = %exec.data_source_name,
            connection = %exec.connection_id,
            method = %exec.method,
            batch = exec.batch,
            batch_size = exec.batch_size,
            queries = exec.queries.len(),
            "executing"
        );
        Ok(())
    }

    fn after_query(&self, exec: &mut ExecutionInfo) -> ProxyResult<()> {
        if exec.success {
            debug!(
                data_source = %exec.data_source_name,
                connection = %exec.connection_id,
                method = %exec.method,
                elapsed_ms = exec.elapsed.as_millis() as u64,
                "execution finished"
            );
        } else {
            warn!(
                data_source = %exec.data_source_name,
                connection = %exec.connection_id,
                method = %exec.method,
                elapsed_ms = exec.elapsed.as_millis() as u64,
                error = exec.error.as_deref().unwrap_or("unknown"),
                "execution failed"
            );
        }
        Ok(())
    }
}
