//! Parameter binding state
//!
//! Tracks the current and batched parameter bindings of one parameterized
//! statement proxy. Re-binding a key overwrites the previous operation but
//! keeps the key's original position, because insertion order reflects
//! binding order for display purposes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::proxy::methods::REGISTER_OUT_PARAMETER;
use crate::value::Value;

/// Identifies a bound parameter by 1-based position or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKey {
    Index(u32),
    Name(String),
}

impl ParameterKey {
    /// Builds a key from the first argument of a binding call, if it is a
    /// positive index or a name
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) if *i > 0 => Some(Self::Index(*i as u32)),
            Value::Text(name) => Some(Self::Name(name.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// Immutable snapshot of one parameter-binding call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSetOperation {
    /// The binding method, e.g. `set_string` or `register_out_parameter`
    pub method: String,
    /// Arguments exactly as supplied by the caller
    pub args: Vec<Value>,
}

impl ParameterSetOperation {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }

    /// Whether this operation registered an output parameter
    pub fn is_register_out_parameter(&self) -> bool {
        self.method == REGISTER_OUT_PARAMETER
    }

    /// The key this operation bound, derived from its first argument
    pub fn key(&self) -> Option<ParameterKey> {
        self.args.first().and_then(ParameterKey::from_value)
    }
}

type ParameterMap = IndexMap<ParameterKey, ParameterSetOperation>;

/// Current and batched parameter bindings of one statement proxy
#[derive(Debug, Default)]
pub struct ParameterRegistry {
    current: ParameterMap,
    batch: Vec<ParameterMap>,
}

impl ParameterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the entry for `key`; the key keeps its original position
    pub fn bind(&mut self, key: ParameterKey, operation: ParameterSetOperation) {
        self.current.insert(key, operation);
    }

    /// Empties the current mapping (a "clear parameters" call)
    pub fn clear_current(&mut self) {
        self.current.clear();
    }

    /// Copies the current mapping as a new batch entry, then empties it
    ///
    /// The copy is independent: later bindings never mutate an already
    /// collected batch entry.
    pub fn snapshot_to_batch(&mut self) {
        let snapshot = self.current.clone();
        self.batch.push(snapshot);
        self.current.clear();
    }

    /// Discards the accumulated batch entries
    pub fn clear_batch(&mut self) {
        self.batch.clear();
    }

    /// Returns the current bindings as one parameter set, in binding order,
    /// leaving the registry untouched
    pub fn collect_for_single_execution(&self) -> Vec<ParameterSetOperation> {
        self.current.values().cloned().collect()
    }

    /// Returns the accumulated batch as parameter sets in call order and
    /// clears the batch (batch execution consumes it)
    pub fn collect_for_batch_execution(&mut self) -> Vec<Vec<ParameterSetOperation>> {
        self.batch
            .drain(..)
            .map(|set| set.into_values().collect())
            .collect()
    }
}
