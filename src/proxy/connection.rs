// SPDX-License-Identifier: Apache-2.0

//! Connection proxy
//!
//! Connection-level counterpart of the statement proxy, with a simpler
//! state machine: no parameter tracking. Prepare calls run the query
//! transformation gateway and wrap the returned statement in a child proxy;
//! commit/rollback/close update the shared lifecycle counters.

use std::sync::Arc;

use tracing::debug;

use crate::config::ProxyConfig;
use crate::connection_info::ConnectionInfo;
use crate::delegate::{CallOutcome, ConnectionDelegate, MethodCall};
use crate::error::{ProxyError, ProxyResult};
use crate::execution::StatementKind;
use crate::proxy::generated_keys;
use crate::proxy::methods::{self, ConnectionCallCategory};
use crate::transform::TransformInfo;
use crate::value::Value;

/// Proxy for one connection delegate
pub struct ConnectionProxy {
    delegate: Box<dyn ConnectionDelegate>,
    connection: Arc<ConnectionInfo>,
    config: Arc<ProxyConfig>,
}

impl ConnectionProxy {
    /// Wraps a raw connection, registering a fresh connection id
    pub fn new(delegate: Box<dyn ConnectionDelegate>, config: Arc<ProxyConfig>) -> Self {
        let id = config.connection_id_manager().next_id();
        let connection = Arc::new(ConnectionInfo::new(config.data_source_name(), id));
        Self {
            delegate,
            connection,
            config,
        }
    }

    /// The lifecycle record shared with child statement proxies
    pub fn connection_info(&self) -> &Arc<ConnectionInfo> {
        &self.connection
    }

    fn handle_identity(&self, call: &MethodCall) -> ProxyResult<CallOutcome> {
        match call.method.as_str() {
            methods::TO_STRING => Ok(CallOutcome::Value(Value::Text(format!(
                "ConnectionProxy [{}]",
                self.connection.data_source_name()
            )))),
            methods::GET_DATA_SOURCE_NAME => Ok(CallOutcome::Value(Value::Text(
                self.connection.data_source_name().to_string(),
            ))),
            _ => Err(ProxyError::unsupported(call.method.clone())),
        }
    }

    fn handle_create_statement(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        let method = call.method.clone();
        match self.delegate.invoke(call)? {
            CallOutcome::Statement(inner) => {
                let proxy = self.config.factory().create_statement(
                    inner,
                    Arc::clone(&self.connection),
                    Arc::clone(&self.config),
                );
                Ok(CallOutcome::Statement(proxy))
            }
            _ => Err(ProxyError::unexpected_outcome(method, "a statement")),
        }
    }

    fn handle_prepare(&mut self, mut call: MethodCall) -> ProxyResult<CallOutcome> {
        let is_prepare_call = call.method == methods::PREPARE_CALL;
        let kind = if is_prepare_call {
            StatementKind::Callable
        } else {
            StatementKind::Prepared
        };

        let mut prepared_query: Option<String> = None;
        let mut generate_key = false;

        if let Some(Value::Text(sql)) = call.args.first().cloned() {
            let info = TransformInfo {
                statement_kind: kind,
                data_source_name: self.connection.data_source_name(),
                query: &sql,
                batch: false,
                count: 0,
            };
            let transformed = self.config.transformer().transform(&info)?;
            call.args[0] = Value::Text(transformed.clone());
            prepared_query = Some(transformed);

            if !is_prepare_call {
                // auto-generated-keys request made at preparation time
                generate_key = generated_keys::is_auto_generate_enabled(&call.args);
            }
        }

        let outcome = self.delegate.invoke(call)?;
        match outcome {
            CallOutcome::Statement(inner) => {
                // a prepare variant without query text yields an unwrapped
                // statement, as there is nothing to record against
                let query = match prepared_query {
                    Some(query) => query,
                    None => return Ok(CallOutcome::Statement(inner)),
                };
                let proxy = if is_prepare_call {
                    self.config.factory().create_callable(
                        inner,
                        query,
                        Arc::clone(&self.connection),
                        Arc::clone(&self.config),
                    )
                } else {
                    self.config.factory().create_prepared(
                        inner,
                        query,
                        generate_key,
                        Arc::clone(&self.connection),
                        Arc::clone(&self.config),
                    )
                };
                Ok(CallOutcome::Statement(proxy))
            }
            other => Ok(other),
        }
    }

    fn handle_lifecycle(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        let method = call.method.clone();
        let outcome = self.delegate.invoke(call)?;

        // counters move only after the delegate call actually occurred
        match method.as_str() {
            methods::COMMIT => self.connection.increment_commit_count(),
            methods::ROLLBACK => self.connection.increment_rollback_count(),
            _ => {
                self.connection.mark_closed();
                self.config
                    .connection_id_manager()
                    .add_closed_id(self.connection.connection_id());
                debug!(
                    data_source = %self.connection.data_source_name(),
                    connection = %self.connection.connection_id(),
                    "connection closed"
                );
            }
        }

        Ok(outcome)
    }
}

impl ConnectionDelegate for ConnectionProxy {
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        match methods::classify_connection(&call.method) {
            ConnectionCallCategory::Identity => self.handle_identity(&call),
            ConnectionCallCategory::Wrapper | ConnectionCallCategory::Passthrough => {
                self.delegate.invoke(call)
            }
            ConnectionCallCategory::CreateStatement => self.handle_create_statement(call),
            ConnectionCallCategory::Prepare => self.handle_prepare(call),
            ConnectionCallCategory::Lifecycle => self.handle_lifecycle(call),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::{ResultSetDelegate, SharedResultSet, StatementDelegate};
    use crate::proxy::generated_keys::RETURN_GENERATED_KEYS;
    use crate::transform::QueryTransformer;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeResultSet {
        closed: bool,
    }

    impl ResultSetDelegate for FakeResultSet {
        fn invoke(&mut self, _call: MethodCall) -> ProxyResult<CallOutcome> {
            Ok(CallOutcome::None)
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        fn close(&mut self) -> ProxyResult<()> {
            self.closed = true;
            Ok(())
        }
    }

    struct MockStatement {
        log: Arc<Mutex<Vec<MethodCall>>>,
        keys_served: Arc<AtomicUsize>,
    }

    impl StatementDelegate for MockStatement {
        fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
            self.log.lock().unwrap().push(call.clone());
            let outcome = match call.method.as_str() {
                "execute_update" => CallOutcome::Value(Value::Int(1)),
                _ => CallOutcome::None,
            };
            Ok(outcome)
        }

        fn generated_keys(&mut self) -> ProxyResult<SharedResultSet> {
            self.keys_served.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Mutex::new(FakeResultSet { closed: false })))
        }
    }

    struct MockConnection {
        log: Arc<Mutex<Vec<MethodCall>>>,
        statement_log: Arc<Mutex<Vec<MethodCall>>>,
        keys_served: Arc<AtomicUsize>,
        fail_method: Option<&'static str>,
    }

    impl MockConnection {
        fn child(&self) -> Box<dyn StatementDelegate> {
            Box::new(MockStatement {
                log: Arc::clone(&self.statement_log),
                keys_served: Arc::clone(&self.keys_served),
            })
        }
    }

    impl ConnectionDelegate for MockConnection {
        fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
            self.log.lock().unwrap().push(call.clone());
            if self.fail_method == Some(call.method.as_str()) {
                return Err(ProxyError::driver("boom"));
            }
            let outcome = match call.method.as_str() {
                "create_statement" | "prepare_statement" | "prepare_call" => {
                    CallOutcome::Statement(self.child())
                }
                _ => CallOutcome::None,
            };
            Ok(outcome)
        }
    }

    #[derive(Default)]
    struct Fixture {
        log: Arc<Mutex<Vec<MethodCall>>>,
        statement_log: Arc<Mutex<Vec<MethodCall>>>,
        keys_served: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn proxy(&self, config: ProxyConfig) -> ConnectionProxy {
            self.proxy_failing(config, None)
        }

        fn proxy_failing(&self, config: ProxyConfig, fail: Option<&'static str>) -> ConnectionProxy {
            ConnectionProxy::new(
                Box::new(MockConnection {
                    log: Arc::clone(&self.log),
                    statement_log: Arc::clone(&self.statement_log),
                    keys_served: Arc::clone(&self.keys_served),
                    fail_method: fail,
                }),
                Arc::new(config),
            )
        }

        fn delegated(&self) -> Vec<MethodCall> {
            self.log.lock().unwrap().clone()
        }
    }

    struct TagTransformer;

    impl QueryTransformer for TagTransformer {
        fn transform(&self, info: &TransformInfo<'_>) -> ProxyResult<String> {
            Ok(format!("{} -- tagged", info.query))
        }
    }

    struct FailingTransformer;

    impl QueryTransformer for FailingTransformer {
        fn transform(&self, _info: &TransformInfo<'_>) -> ProxyResult<String> {
            Err(ProxyError::transform("rewrite rejected"))
        }
    }

    fn config() -> ProxyConfig {
        ProxyConfig::builder().data_source_name("ds").build()
    }

    fn child_statement(outcome: CallOutcome) -> Box<dyn StatementDelegate> {
        match outcome {
            CallOutcome::Statement(statement) => statement,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_identity_answers_locally() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy(config());

        let outcome = proxy.invoke(MethodCall::bare("to_string")).unwrap();
        assert_eq!(
            outcome_text(outcome),
            "ConnectionProxy [ds]"
        );
        assert!(fixture.delegated().is_empty());
    }

    fn outcome_text(outcome: CallOutcome) -> String {
        match outcome {
            CallOutcome::Value(Value::Text(text)) => text,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_create_statement_returns_wrapped_child() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy(config());

        let outcome = proxy.invoke(MethodCall::bare("create_statement")).unwrap();
        let mut child = child_statement(outcome);

        // the identity call is answered by the wrapper, not the mock
        let answer = child.invoke(MethodCall::bare("to_string")).unwrap();
        assert_eq!(outcome_text(answer), "StatementProxy [ds]");
        assert!(fixture.statement_log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_prepare_rewrites_text_before_delegation() {
        let fixture = Fixture::default();
        let config = ProxyConfig::builder()
            .data_source_name("ds")
            .transformer(Arc::new(TagTransformer))
            .build();
        let mut proxy = fixture.proxy(config);

        let outcome = proxy
            .invoke(MethodCall::new(
                "prepare_statement",
                vec![Value::from("SELECT * FROM t WHERE id = ?")],
            ))
            .unwrap();

        let delegated = fixture.delegated();
        assert_eq!(
            delegated[0].args[0],
            Value::from("SELECT * FROM t WHERE id = ? -- tagged")
        );

        let mut child = child_statement(outcome);
        let answer = child.invoke(MethodCall::bare("to_string")).unwrap();
        assert_eq!(outcome_text(answer), "StatementProxy [ds]");
    }

    #[test]
    fn test_transformer_failure_aborts_prepare_before_delegation() {
        let fixture = Fixture::default();
        let config = ProxyConfig::builder()
            .data_source_name("ds")
            .transformer(Arc::new(FailingTransformer))
            .build();
        let mut proxy = fixture.proxy(config);

        let err = proxy
            .invoke(MethodCall::new(
                "prepare_statement",
                vec![Value::from("SELECT * FROM t WHERE id = ?")],
            ))
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transform { .. }));
        assert!(fixture.delegated().is_empty());
    }

    #[test]
    fn test_prepare_records_key_request_for_the_child() {
        let fixture = Fixture::default();
        let config = ProxyConfig::builder()
            .data_source_name("ds")
            .auto_retrieve_generated_keys(true)
            .build();
        let mut proxy = fixture.proxy(config);

        let outcome = proxy
            .invoke(MethodCall::new(
                "prepare_statement",
                vec![
                    Value::from("INSERT INTO t VALUES (?)"),
                    Value::Int(RETURN_GENERATED_KEYS),
                ],
            ))
            .unwrap();

        // executing through the child triggers key auto-retrieval
        let mut child = child_statement(outcome);
        child.invoke(MethodCall::bare("execute_update")).unwrap();
        assert_eq!(fixture.keys_served.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prepare_call_never_requests_keys() {
        let fixture = Fixture::default();
        let config = ProxyConfig::builder()
            .data_source_name("ds")
            .auto_retrieve_generated_keys(true)
            .build();
        let mut proxy = fixture.proxy(config);

        let outcome = proxy
            .invoke(MethodCall::new(
                "prepare_call",
                vec![Value::from("{call p(?)}"), Value::Int(RETURN_GENERATED_KEYS)],
            ))
            .unwrap();

        let mut child = child_statement(outcome);
        child.invoke(MethodCall::bare("execute_update")).unwrap();
        assert_eq!(fixture.keys_served.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prepare_without_text_yields_unwrapped_statement() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy(config());

        let outcome = proxy.invoke(MethodCall::bare("prepare_statement")).unwrap();
        let mut child = child_statement(outcome);

        // the identity call reaches the mock directly
        let answer = child.invoke(MethodCall::bare("to_string")).unwrap();
        assert!(matches!(answer, CallOutcome::None));
        assert_eq!(fixture.statement_log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_lifecycle_counters_track_successful_calls() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy(config());

        proxy.invoke(MethodCall::bare("commit")).unwrap();
        proxy.invoke(MethodCall::bare("commit")).unwrap();
        proxy.invoke(MethodCall::bare("rollback")).unwrap();

        let info = proxy.connection_info();
        assert_eq!(info.commit_count(), 2);
        assert_eq!(info.rollback_count(), 1);
        assert!(!info.is_closed());
    }

    #[test]
    fn test_failed_lifecycle_call_moves_no_counter() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy_failing(config(), Some("commit"));

        let err = proxy.invoke(MethodCall::bare("commit")).unwrap_err();
        assert!(matches!(err, ProxyError::Driver { .. }));
        assert_eq!(proxy.connection_info().commit_count(), 0);
    }

    #[test]
    fn test_close_registers_the_connection_id() {
        let fixture = Fixture::default();
        let config = config();
        let mut proxy = fixture.proxy(config);

        let id = proxy.connection_info().connection_id().to_string();
        let manager = Arc::clone(proxy.config.connection_id_manager());
        assert!(!manager.is_closed(&id));

        proxy.invoke(MethodCall::bare("close")).unwrap();
        assert!(proxy.connection_info().is_closed());
        assert!(manager.is_closed(&id));
        assert_eq!(manager.closed_count(), 1);
    }

    #[test]
    fn test_unknown_methods_pass_through() {
        let fixture = Fixture::default();
        let mut proxy = fixture.proxy(config());

        proxy
            .invoke(MethodCall::new("set_auto_commit", vec![Value::Bool(false)]))
            .unwrap();
        let delegated = fixture.delegated();
        assert_eq!(delegated.len(), 1);
        assert_eq!(delegated[0].method, "set_auto_commit");
    }

    #[test]
    fn test_each_proxy_gets_a_distinct_id() {
        let fixture = Fixture::default();
        let shared = Arc::new(crate::connection_info::ConnectionIdManager::new());
        let config_a = ProxyConfig::builder()
            .data_source_name("ds")
            .connection_id_manager(Arc::clone(&shared))
            .build();
        let config_b = ProxyConfig::builder()
            .data_source_name("ds")
            .connection_id_manager(shared)
            .build();

        let a = fixture.proxy(config_a);
        let b = fixture.proxy(config_b);
        assert_ne!(
            a.connection_info().connection_id(),
            b.connection_info().connection_id()
        );
    }
}
