// SPDX-License-Identifier: Apache-2.0

//! Transparent interception layer for database client drivers
//!
//! Wrap a driver connection with [`proxy_connection`] and every call made
//! through it (and through the statements and result sets it produces) is
//! classified, optionally rewritten, timed and reported to the configured
//! execution listeners, while behaving exactly like the raw object.

pub mod config;
pub mod connection_info;
pub mod delegate;
pub mod error;
pub mod execution;
pub mod listener;
pub mod proxy;
pub mod transform;
pub mod value;

use std::sync::Arc;

pub use config::{ProxyConfig, ProxyConfigBuilder};
pub use connection_info::{ConnectionIdManager, ConnectionInfo};
pub use delegate::{
    CallOutcome, ConnectionDelegate, MethodCall, ResultSetDelegate, SharedResultSet,
    StatementDelegate,
};
pub use error::{ProxyError, ProxyResult};
pub use execution::{ExecutionInfo, QueryInfo, RecordedOutcome, StatementKind};
pub use listener::{
    CompositeListener, ExecutionListener, QueryCount, QueryCountListener, TracingExecutionListener,
};
pub use proxy::{DefaultProxyFactory, ProxyFactory};
pub use transform::{NoOpQueryTransformer, QueryTransformer, TransformInfo};
pub use value::Value;

/// Wraps a raw driver connection in an intercepting proxy
///
/// The returned object is shape-identical to the delegate it wraps; every
/// statement created through it is proxied in turn.
pub fn proxy_connection(
    delegate: Box<dyn ConnectionDelegate>,
    config: Arc<ProxyConfig>,
) -> Box<dyn ConnectionDelegate> {
    let factory = Arc::clone(config.factory());
    factory.create_connection(delegate, config)
}
