//! Query transformation collaborator
//!
//! The proxies never rewrite query text themselves; whenever a call
//! introduces or executes text (prepare, plain-text execute, add-to-batch)
//! they hand the full context to an injected [`QueryTransformer`] and send
//! the returned text to the driver verbatim. A transformer failure is fatal
//! for that call and propagates before any delegation or notification.

use crate::error::ProxyResult;
use crate::execution::StatementKind;

/// Context handed to the transformer for one rewrite decision
#[derive(Debug, Clone, Copy)]
pub struct TransformInfo<'a> {
    /// The kind of statement the text is destined for
    pub statement_kind: StatementKind,
    /// Logical name of the data source
    pub data_source_name: &'a str,
    /// Original query text as supplied by the caller
    pub query: &'a str,
    /// Whether this text is being added to a batch
    pub batch: bool,
    /// Index of this entry within the batch, 0 for non-batch calls
    pub count: usize,
}

/// Rewrites query text before it reaches the driver
pub trait QueryTransformer: Send + Sync {
    /// Returns the text to send to the driver in place of `info.query`
    fn transform(&self, info: &TransformInfo<'_>) -> ProxyResult<String>;
}

/// Default transformer: returns the query unchanged
#[derive(Debug, Default)]
pub struct NoOpQueryTransformer;

impl QueryTransformer for NoOpQueryTransformer {
    fn transform(&self, info: &TransformInfo<'_>) -> ProxyResult<String> {
        Ok(info.query.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_returns_input() {
        let info = TransformInfo {
            statement_kind: StatementKind::Plain,
            data_source_name: "ds",
            query: "SELECT 1",
            batch: false,
            count: 0,
        };
        assert_eq!(NoOpQueryTransformer.transform(&info).unwrap(), "SELECT 1");
    }
}
