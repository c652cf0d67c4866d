//! Child-proxy factory
//!
//! Creation of every proxy kind goes through this trait so a host
//! application can substitute its own wrappers (or decorate the defaults)
//! without touching the interception logic.

use std::sync::{Arc, Mutex};

use crate::config::ProxyConfig;
use crate::connection_info::ConnectionInfo;
use crate::delegate::{ConnectionDelegate, SharedResultSet, StatementDelegate};
use crate::proxy::connection::ConnectionProxy;
use crate::proxy::result_set::ResultSetProxy;
use crate::proxy::statement::StatementProxy;

/// Creates proxies for freshly delegated driver objects
pub trait ProxyFactory: Send + Sync {
    fn create_connection(
        &self,
        delegate: Box<dyn ConnectionDelegate>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn ConnectionDelegate>;

    fn create_statement(
        &self,
        delegate: Box<dyn StatementDelegate>,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate>;

    fn create_prepared(
        &self,
        delegate: Box<dyn StatementDelegate>,
        query: String,
        generate_key: bool,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate>;

    fn create_callable(
        &self,
        delegate: Box<dyn StatementDelegate>,
        query: String,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate>;

    fn create_result_set(
        &self,
        delegate: SharedResultSet,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> SharedResultSet;

    fn create_generated_keys(
        &self,
        delegate: SharedResultSet,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> SharedResultSet;
}

/// Default factory producing the proxies defined in this crate
#[derive(Debug, Default)]
pub struct DefaultProxyFactory;

impl ProxyFactory for DefaultProxyFactory {
    fn create_connection(
        &self,
        delegate: Box<dyn ConnectionDelegate>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn ConnectionDelegate> {
        Box::new(ConnectionProxy::new(delegate, config))
    }

    fn create_statement(
        &self,
        delegate: Box<dyn StatementDelegate>,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate> {
        Box::new(StatementProxy::plain(delegate, connection, config))
    }

    fn create_prepared(
        &self,
        delegate: Box<dyn StatementDelegate>,
        query: String,
        generate_key: bool,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate> {
        Box::new(StatementProxy::prepared(
            delegate,
            query,
            generate_key,
            connection,
            config,
        ))
    }

    fn create_callable(
        &self,
        delegate: Box<dyn StatementDelegate>,
        query: String,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Box<dyn StatementDelegate> {
        Box::new(StatementProxy::callable(delegate, query, connection, config))
    }

    fn create_result_set(
        &self,
        delegate: SharedResultSet,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> SharedResultSet {
        Arc::new(Mutex::new(ResultSetProxy::new(delegate, connection, config)))
    }

    fn create_generated_keys(
        &self,
        delegate: SharedResultSet,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> SharedResultSet {
        Arc::new(Mutex::new(ResultSetProxy::new(delegate, connection, config)))
    }
}
