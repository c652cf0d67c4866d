//! Result-set proxy
//!
//! A thin pass-through wrapper created when result-set or generated-keys
//! proxying is enabled. It keeps the delegate's shape so callers and the
//! generated-keys cache handle it exactly like the raw result set.

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::connection_info::ConnectionInfo;
use crate::delegate::{CallOutcome, MethodCall, ResultSetDelegate, SharedResultSet};
use crate::error::ProxyResult;
use crate::proxy::methods;
use crate::value::Value;

pub struct ResultSetProxy {
    delegate: SharedResultSet,
    connection: Arc<ConnectionInfo>,
    #[allow(dead_code)]
    config: Arc<ProxyConfig>,
}

impl ResultSetProxy {
    pub fn new(
        delegate: SharedResultSet,
        connection: Arc<ConnectionInfo>,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            delegate,
            connection,
            config,
        }
    }
}

impl ResultSetDelegate for ResultSetProxy {
    fn invoke(&mut self, call: MethodCall) -> ProxyResult<CallOutcome> {
        match call.method.as_str() {
            methods::TO_STRING => Ok(CallOutcome::Value(Value::Text(format!(
                "ResultSetProxy [{}]",
                self.connection.data_source_name()
            )))),
            methods::GET_DATA_SOURCE_NAME => Ok(CallOutcome::Value(Value::Text(
                self.connection.data_source_name().to_string(),
            ))),
            _ => self.delegate.lock().unwrap().invoke(call),
        }
    }

    fn is_closed(&self) -> bool {
        self.delegate.lock().unwrap().is_closed()
    }

    fn close(&mut self) -> ProxyResult<()> {
        self.delegate.lock().unwrap().close()
    }
}
