// SPDX-License-Identifier: Apache-2.0

//! Statement proxy
//!
//! Shared proxy logic for plain, prepared and callable statements. Each
//! intercepted call is classified and either answered locally, captured as
//! parameter-binding state, rewritten before delegation, or treated as an
//! execution boundary: timed, recorded, and bracketed by before/after
//! listener notifications.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::ProxyConfig;
use crate::connection_info::ConnectionInfo;
use crate::delegate::{CallOutcome, MethodCall, SharedResultSet, StatementDelegate};
use crate::error::{ProxyError, ProxyResult};
use crate::execution::{ExecutionInfo, QueryInfo, RecordedOutcome, StatementKind};
use crate::proxy::generated_keys::{self, GeneratedKeysCache};
use crate::proxy::methods::{self, CallCategory};
use crate::proxy::parameter::{ParameterKey, ParameterRegistry, ParameterSetOperation};
use crate::transform::TransformInfo;
use crate::value::Value;

/// Proxy for one statement delegate of any kind
pub struct StatementProxy {
    delegate: Box<dyn StatementDelegate>,
    kind: StatementKind,
    /// Query text a prepared or callable statement was created with,
    /// already transformed at preparation time
    query: Option<String>,
    connection: Arc<ConnectionInfo>,
    config: Arc<ProxyConfig>,
    parameters: ParameterRegistry,
    /// Queued query texts of a plain-statement batch
    batch_queries: Vec<String>,
    keys: GeneratedKeysCache,
    /// Whether auto-generated keys were requested when the statement was
    /// prepared
    generate_key: bool,
}

impl StatementProxy {
    /// Wraps a plain statement
    pub fn plain(
        delegate: Box<dyn StatementDelegate>,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            delegate,
            kind: StatementKind::Plain,
            query: None,
            connection,
            config,
            parameters: ParameterRegistry::new(),
            batch_queries: Vec::new(),
            keys: GeneratedKeysCache::new(),
            generate_key: false,
        }
    }

    /// Wraps a prepared statement carrying its query text and the
    /// auto-generated-keys request made at preparation time
    pub fn prepared(
        delegate: Box<dyn StatementDelegate>,
        query: impl Into<String>,
        generate_key: bool,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            delegate,
            kind: StatementKind::Prepared,
            query: Some(query.into()),
            connection,
            config,
            parameters: ParameterRegistry::new(),
            batch_queries: Vec::new(),
            keys: GeneratedKeysCache::new(),
            generate_key,
        }
    }

    /// Wraps a callable statement carrying its call text
    pub fn callable(
        delegate: Box<dyn StatementDelegate>,
        query: impl Into<String>,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            delegate,
            kind: StatementKind::Callable,
            query: Some(query.into()),
            connection,
            config,
            parameters: ParameterRegistry::new(),
            batch_queries: Vec::new(),
            keys: GeneratedKeysCache::new(),
            generate_key: false,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    fn handle_identity(&self, call: &MethodCall) -> ProxyResult<CallOutcome> {
        match call.method.as_str() {
            methods::TO_STRING => Ok(CallOutcome::Value(Value::Text(format!(
                "StatementProxy [{}]",
                self.connection.data_source_name()
            )))),
            methods::GET_DATA_SOURCE_NAME => Ok(CallOutcome::Value(Value::Text(
                self.connection.data_source_name().to_string(),
            ))),
            // the delegate stays owned by the proxy; there is no way to
            // hand it back through the call surface
            _ => Err(ProxyError::unsupported(call.method.clone())),
        }
    }

    fn handle_batch_control(&mut self, mut call: MethodCall) -> ProxyResult<CallOutcome> {
        if self.kind == StatementKind::Plain {
            if call.method == methods::ADD_BATCH {
                if let Some(Value::Text(sql)) = call.args.first().cloned() {
                    let info = TransformInfo {
                        statement_kind: StatementKind::Plain,
                        data_source_name: self.connection.data_source_name(),
                        query: &sql,
                        batch: true,
                        count: self.batch_queries.len(),
                    };
                    let transformed = self.config.transformer().transform(&info)?;
                    call.args[0] = Value::Text(transformed.clone());
                    self.batch_queries.push(transformed);
                }
            } else {
                self.batch_queries.clear();
            }
        } else if call.method == methods::ADD_BATCH {
            self.parameters.snapshot_to_batch();
        } else {
            self.parameters.clear_batch();
        }

        // proceed with the (possibly rewritten) call, no notification
        self.delegate.invoke(call)
    }

    fn handle_parameter_operation(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        if call.method == methods::CLEAR_PARAMETERS {
            self.parameters.clear_current();
        } else if let Some(key) = call.args.first().and_then(ParameterKey::from_value) {
            self.parameters
                .bind(key, ParameterSetOperation::new(&call.method, call.args.clone()));
        }
        // a binding call whose first argument is neither an index nor a
        // name is delegated untouched

        self.delegate.invoke(call)
    }

    /// Execution recorder: wraps exactly one delegated call
    fn record_execution(&mut self, mut call: MethodCall) -> ProxyResult<CallOutcome> {
        let method = call.method.clone();
        let is_batch = methods::is_batch_execution(&method);
        let is_get_keys = method == methods::GET_GENERATED_KEYS;
        let is_get_result_set = method == methods::GET_RESULT_SET;

        let mut queries: Vec<QueryInfo> = Vec::new();
        let mut batch_size = 0usize;

        if is_batch {
            if self.kind == StatementKind::Plain {
                batch_size = self.batch_queries.len();
                for sql in std::mem::take(&mut self.batch_queries) {
                    queries.push(QueryInfo::new(sql));
                }
            } else {
                // one query with multiple parameter sets
                let mut query_info = QueryInfo::new(self.query.clone().unwrap_or_default());
                query_info.parameters_list = self.parameters.collect_for_batch_execution();
                batch_size = query_info.parameters_list.len();
                queries.push(query_info);
            }
        } else if methods::is_query_execution(&method) {
            if self.kind == StatementKind::Plain {
                if let Some(Value::Text(sql)) = call.args.first().cloned() {
                    let info = TransformInfo {
                        statement_kind: StatementKind::Plain,
                        data_source_name: self.connection.data_source_name(),
                        query: &sql,
                        batch: false,
                        count: 0,
                    };
                    let transformed = self.config.transformer().transform(&info)?;
                    call.args[0] = Value::Text(transformed.clone());
                    queries.push(QueryInfo::new(transformed));
                }
            } else {
                let mut query_info = QueryInfo::new(self.query.clone().unwrap_or_default());
                query_info
                    .parameters_list
                    .push(self.parameters.collect_for_single_execution());
                queries.push(query_info);
            }
        }

        // a live cached handle short-circuits generated-keys retrieval;
        // a closed one was just evicted and the call falls through
        if is_get_keys {
            if let Some(handle) = self.keys.get() {
                return Ok(CallOutcome::ResultSet(handle));
            }
        }

        let mut exec = ExecutionInfo::new(
            self.connection.data_source_name().to_string(),
            self.connection.connection_id().to_string(),
            self.kind,
            is_batch,
            batch_size,
            method.clone(),
            call.args.clone(),
            queries,
        );

        // result retrieval is auxiliary: it delegates but is not an
        // execution boundary
        let notify = !is_get_keys && !is_get_result_set;

        if notify {
            self.config.listener().before_query(&mut exec)?;
        }

        let outcome = self.delegate_and_capture(call, &mut exec, is_batch, is_get_keys);

        let mut follow_up: ProxyResult<()> = Ok(());
        if notify {
            follow_up = self.config.listener().after_query(&mut exec);
        }

        // auto-close the auto-retrieved keys; the result of an explicit
        // generated-keys retrieval is left in the caller's hands
        if !is_get_keys && self.config.auto_close_generated_keys() {
            if let Some(handle) = self.keys.get() {
                debug!(
                    data_source = %self.connection.data_source_name(),
                    "closing auto-retrieved generated keys"
                );
                let closed = handle.lock().unwrap().close();
                self.keys.invalidate();
                if follow_up.is_ok() {
                    follow_up = closed;
                }
            }
        }

        match outcome {
            Ok(value) => {
                follow_up?;
                Ok(value)
            }
            // the delegate's fault is never masked by a follow-up failure
            Err(e) => Err(e),
        }
    }

    /// Times the delegated call, captures the outcome into the record, and
    /// applies result-set wrapping and generated-keys retrieval policy
    fn delegate_and_capture(
        &mut self,
        call: MethodCall,
        exec: &mut ExecutionInfo,
        is_batch: bool,
        is_get_keys: bool,
    ) -> ProxyResult<CallOutcome> {
        let method = call.method.clone();

        let start = Instant::now();
        let result = self.delegate.invoke(call);
        exec.elapsed = start.elapsed();

        let mut outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                exec.success = false;
                exec.error = Some(e.to_string());
                return Err(e);
            }
        };

        let wrap_keys = is_get_keys && self.config.generated_keys_proxy_enabled();
        let wrap_result_set = !is_get_keys
            && methods::returns_result_set(&method)
            && self.config.result_set_proxy_enabled();

        if wrap_keys || wrap_result_set {
            outcome = match outcome {
                CallOutcome::ResultSet(inner) => {
                    let factory = Arc::clone(self.config.factory());
                    let wrapped = if wrap_keys {
                        factory.create_generated_keys(
                            inner,
                            Arc::clone(&self.connection),
                            Arc::clone(&self.config),
                        )
                    } else {
                        factory.create_result_set(
                            inner,
                            Arc::clone(&self.connection),
                            Arc::clone(&self.config),
                        )
                    };
                    CallOutcome::ResultSet(wrapped)
                }
                other => other,
            };
        }

        if self.config.auto_retrieve_generated_keys() {
            if is_get_keys {
                // refresh the cache with the explicitly retrieved handle
                if let CallOutcome::ResultSet(handle) = &outcome {
                    self.keys.put(Arc::clone(handle));
                }
            } else if methods::can_produce_keys(&method)
                && self.should_retrieve_keys(is_batch, &exec.args)
            {
                let mut handle = self.delegate.generated_keys()?;
                if self.config.generated_keys_proxy_enabled() {
                    let factory = Arc::clone(self.config.factory());
                    handle = factory.create_generated_keys(
                        handle,
                        Arc::clone(&self.connection),
                        Arc::clone(&self.config),
                    );
                }
                self.keys.put(handle);
            }
        }

        exec.result = RecordedOutcome::from_outcome(&outcome);
        exec.generated_keys = self.keys.get();
        exec.success = true;
        Ok(outcome)
    }

    /// The auto-retrieval policy matrix: which flag decides depends on
    /// {batch vs single} x {plain vs parameterized}
    fn should_retrieve_keys(&self, is_batch: bool, args: &[Value]) -> bool {
        let plain = self.kind == StatementKind::Plain;
        if is_batch {
            if plain {
                self.config.retrieve_generated_keys_for_batch_plain()
            } else {
                self.generate_key && self.config.retrieve_generated_keys_for_batch_parameterized()
            }
        } else if plain {
            // decided per call by the caller-supplied request flag
            generated_keys::is_auto_generate_enabled(args)
        } else {
            self.generate_key
        }
    }
}

impl StatementDelegate for StatementProxy {
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        match methods::classify(self.kind, &call.method) {
            CallCategory::Identity => self.handle_identity(&call),
            CallCategory::Wrapper | CallCategory::Passthrough => self.delegate.invoke(call),
            CallCategory::ConnectionRetrieval => Ok(CallOutcome::Value(Value::Text(
                self.connection.connection_id().to_string(),
            ))),
            CallCategory::BatchControl => self.handle_batch_control(call),
            CallCategory::ParameterOperation => self.handle_parameter_operation(call),
            CallCategory::Execution => self.record_execution(call),
        }
    }

    fn generated_keys(&mut self) -> ProxyResult<SharedResultSet> {
        match self.invoke(MethodCall::bare(methods::GET_GENERATED_KEYS))? {
            CallOutcome::ResultSet(handle) => Ok(handle),
            _ => Err(ProxyError::unexpected_outcome(
                methods::GET_GENERATED_KEYS,
                "a result set",
            )),
        }
    }
}
