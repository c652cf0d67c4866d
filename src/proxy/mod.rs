//! Proxy implementations
//!
//! One concrete proxy type per capability kind, each implementing the
//! delegate trait of the object it wraps.

pub mod connection;
pub mod factory;
pub mod generated_keys;
pub mod methods;
pub mod parameter;
pub mod result_set;
pub mod statement;

pub use connection::ConnectionProxy;
pub use factory::{DefaultProxyFactory, ProxyFactory};
pub use generated_keys::GeneratedKeysCache;
pub use methods::{CallCategory, ConnectionCallCategory};
pub use parameter::{ParameterKey, ParameterRegistry, ParameterSetOperation};
pub use result_set::ResultSetProxy;
pub use statement::StatementProxy;
