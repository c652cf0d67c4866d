//! Proxy configuration
//!
//! Collaborators and policy flags shared read-only by every proxy instance.
//! Built once through [`ProxyConfigBuilder`], then treated as immutable and
//! shared via `Arc`.

use std::sync::Arc;

use crate::connection_info::ConnectionIdManager;
use crate::listener::{CompositeListener, ExecutionListener};
use crate::proxy::factory::{DefaultProxyFactory, ProxyFactory};
use crate::transform::{NoOpQueryTransformer, QueryTransformer};

/// Immutable configuration shared by every proxy created from it
pub struct ProxyConfig {
    data_source_name: String,
    transformer: Arc<dyn QueryTransformer>,
    listener: Arc<dyn ExecutionListener>,
    factory: Arc<dyn ProxyFactory>,
    connection_id_manager: Arc<ConnectionIdManager>,
    result_set_proxy_enabled: bool,
    generated_keys_proxy_enabled: bool,
    auto_retrieve_generated_keys: bool,
    auto_close_generated_keys: bool,
    retrieve_generated_keys_for_batch_plain: bool,
    retrieve_generated_keys_for_batch_parameterized: bool,
}

impl ProxyConfig {
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::default()
    }

    /// Logical name of the data source, stamped into every record
    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn transformer(&self) -> &Arc<dyn QueryTransformer> {
        &self.transformer
    }

    pub fn listener(&self) -> &Arc<dyn ExecutionListener> {
        &self.listener
    }

    pub fn factory(&self) -> &Arc<dyn ProxyFactory> {
        &self.factory
    }

    pub fn connection_id_manager(&self) -> &Arc<ConnectionIdManager> {
        &self.connection_id_manager
    }

    /// Whether result sets returned by result-returning calls are wrapped
    pub fn result_set_proxy_enabled(&self) -> bool {
        self.result_set_proxy_enabled
    }

    /// Whether generated-keys result sets are wrapped
    pub fn generated_keys_proxy_enabled(&self) -> bool {
        self.generated_keys_proxy_enabled
    }

    /// Whether generated keys are retrieved automatically after key
    /// producing executions
    pub fn auto_retrieve_generated_keys(&self) -> bool {
        self.auto_retrieve_generated_keys
    }

    /// Whether an auto-retrieved generated-keys handle is closed at the end
    /// of the execution call
    pub fn auto_close_generated_keys(&self) -> bool {
        self.auto_close_generated_keys
    }

    /// Auto-retrieval policy for batch execution on plain statements
    pub fn retrieve_generated_keys_for_batch_plain(&self) -> bool {
        self.retrieve_generated_keys_for_batch_plain
    }

    /// Auto-retrieval policy for batch execution on prepared or callable
    /// statements (combined with the per-statement creation flag)
    pub fn retrieve_generated_keys_for_batch_parameterized(&self) -> bool {
        self.retrieve_generated_keys_for_batch_parameterized
    }
}

/// Builder for [`ProxyConfig`]
pub struct ProxyConfigBuilder {
    data_source_name: String,
    transformer: Arc<dyn QueryTransformer>,
    listener: Arc<dyn ExecutionListener>,
    factory: Arc<dyn ProxyFactory>,
    connection_id_manager: Arc<ConnectionIdManager>,
    result_set_proxy_enabled: bool,
    generated_keys_proxy_enabled: bool,
    auto_retrieve_generated_keys: bool,
    auto_close_generated_keys: bool,
    retrieve_generated_keys_for_batch_plain: bool,
    retrieve_generated_keys_for_batch_parameterized: bool,
}

impl Default for ProxyConfigBuilder {
    fn default() -> Self {
        Self {
            data_source_name: String::new(),
            transformer: Arc::new(NoOpQueryTransformer),
            listener: Arc::new(CompositeListener::new()),
            factory: Arc::new(DefaultProxyFactory),
            connection_id_manager: Arc::new(ConnectionIdManager::new()),
            result_set_proxy_enabled: false,
            generated_keys_proxy_enabled: false,
            auto_retrieve_generated_keys: false,
            auto_close_generated_keys: false,
            retrieve_generated_keys_for_batch_plain: false,
            retrieve_generated_keys_for_batch_parameterized: false,
        }
    }
}

impl ProxyConfigBuilder {
    pub fn data_source_name(mut self, name: impl Into<String>) -> Self {
        self.data_source_name = name.into();
        self
    }

    pub fn transformer(mut self, transformer: Arc<dyn QueryTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn listener(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn factory(mut self, factory: Arc<dyn ProxyFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn connection_id_manager(mut self, manager: Arc<ConnectionIdManager>) -> Self {
        self.connection_id_manager = manager;
        self
    }

    pub fn result_set_proxy_enabled(mut self, enabled: bool) -> Self {
        self.result_set_proxy_enabled = enabled;
        self
    }

    pub fn generated_keys_proxy_enabled(mut self, enabled: bool) -> Self {
        self.generated_keys_proxy_enabled = enabled;
        self
    }

    pub fn auto_retrieve_generated_keys(mut self, enabled: bool) -> Self {
        self.auto_retrieve_generated_keys = enabled;
        self
    }

    pub fn auto_close_generated_keys(mut self, enabled: bool) -> Self {
        self.auto_close_generated_keys = enabled;
        self
    }

    pub fn retrieve_generated_keys_for_batch_plain(mut self, enabled: bool) -> Self {
        self.retrieve_generated_keys_for_batch_plain = enabled;
        self
    }

    pub fn retrieve_generated_keys_for_batch_parameterized(mut self, enabled: bool) -> Self {
        self.retrieve_generated_keys_for_batch_parameterized = enabled;
        self
    }

    pub fn build(self) -> ProxyConfig {
        ProxyConfig {
            data_source_name: self.data_source_name,
            transformer: self.transformer,
            listener: self.listener,
            factory: self.factory,
            connection_id_manager: self.connection_id_manager,
            result_set_proxy_enabled: self.result_set_proxy_enabled,
            generated_keys_proxy_enabled: self.generated_keys_proxy_enabled,
            auto_retrieve_generated_keys: self.auto_retrieve_generated_keys,
            auto_close_generated_keys: self.auto_close_generated_keys,
            retrieve_generated_keys_for_batch_plain: self.retrieve_generated_keys_for_batch_plain,
            retrieve_generated_keys_for_batch_parameterized: self
                .retrieve_generated_keys_for_batch_parameterized,
        }
    }
}
