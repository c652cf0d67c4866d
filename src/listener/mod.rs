//! Execution listeners
//!
//! A listener is notified synchronously immediately before and after every
//! execution-boundary call, receiving the full [`ExecutionInfo`]. Listeners
//! observe; they cannot suppress or alter the outcome of the call. A failure
//! raised by a before-notification aborts the call without delegating; a
//! failure raised by an after-notification propagates to the caller, with
//! the delegate call's side effects already in place.

pub mod count;
pub mod logging;

pub use count::{QueryCount, QueryCountListener};
pub use logging::TracingExecutionListener;

use std::sync::Arc;

use crate::error::ProxyResult;
use crate::execution::ExecutionInfo;

/// Before/after notification collaborator for execution-boundary calls
pub trait ExecutionListener: Send + Sync {
    /// Called before the delegated call
    fn before_query(&self, _exec: &mut ExecutionInfo) -> ProxyResult<()> {
        Ok(())
    }

    /// Called after the delegated call, on success and on failure
    fn after_query(&self, _exec: &mut ExecutionInfo) -> ProxyResult<()> {
        Ok(())
    }
}

/// Fans notifications out to a chain of listeners in registration order
///
/// The first failure propagates and stops the chain. An empty composite is
/// the no-op listener.
#[derive(Default)]
pub struct CompositeListener {
    listeners: Vec<Arc<dyn ExecutionListener>>,
}

impl CompositeListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
        self.listeners.push(listener);
        self
    }
}

impl ExecutionListener for CompositeListener {
    fn before_query(&self, exec: &mut ExecutionInfo) -> ProxyResult<()> {
        for listener in &self.listeners {
            listener.before_query(exec)?;
        }
        Ok(())
    }

    fn after_query(&self, exec: &mut ExecutionInfo) -> ProxyResult<()> {
        for listener in &self.listeners {
            listener.after_query(exec)?;
        }
        Ok(())
    }
}
