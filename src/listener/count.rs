// SPDX-License-Identifier: Apache-2.0

//! Query-count listener
//!
//! Aggregates per-data-source execution counts: totals, success/failure and
//! a breakdown by leading SQL keyword. Classification looks at the first
//! word of each recorded query only; the interception core itself never
//! parses SQL.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, ProxyResult};
use crate::execution::ExecutionInfo;
use crate::listener::ExecutionListener;

/// Coarse query classification by leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryOperation {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl QueryOperation {
    /// Classifies a query by its first word
    pub fn classify(query: &str) -> Self {
        let first_word = query
            .trim()
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_uppercase();

        match first_word.as_str() {
            "SELECT" => Self::Select,
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

/// Snapshot of accumulated execution counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCount {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub select: u64,
    pub insert: u64,
    pub update: u64,
    pub delete: u64,
    pub other: u64,
    /// Total elapsed time across executions, in milliseconds
    pub time_ms: u64,
    /// Start of the counting period
    pub period_start: DateTime<Utc>,
}

impl QueryCount {
    fn new() -> Self {
        Self {
            total: 0,
            success: 0,
            failure: 0,
            select: 0,
            insert: 0,
            update: 0,
            delete: 0,
            other: 0,
            time_ms: 0,
            period_start: Utc::now(),
        }
    }
}

impl Default for QueryCount {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that maintains a [`QueryCount`] across executions
#[derive(Debug, Default)]
pub struct QueryCountListener {
    count: RwLock<QueryCount>,
}

impl QueryCountListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current counts
    pub fn snapshot(&self) -> QueryCount {
        self.count.read().unwrap().clone()
    }

    /// Resets all counters and restarts the counting period
    pub fn reset(&self) {
        *self.count.write().unwrap() = QueryCount::new();
    }

    /// Exports the current counts as JSON
    pub fn export(&self) -> ProxyResult<String> {
        serde_json::to_string(&self.snapshot())
            .map_err(|e| ProxyError::listener(format!("failed to serialize query counts: {e}")))
    }
}

impl ExecutionListener for QueryCountListener {
    fn after_query(&self, exec: &mut ExecutionInfo) -> ProxyResult<()> {
        let mut count = self.count.write().unwrap();

        count.total += 1;
        if exec.success {
            count.success += 1;
        } else {
            count.failure += 1;
        }
        count.time_ms += exec.elapsed.as_millis() as u64;

        for query_info in &exec.queries {
            match QueryOperation::classify(&query_info.query) {
                QueryOperation::Select => count.select += 1,
                QueryOperation::Insert => count.insert += 1,
                QueryOperation::Update => count.update += 1,
                QueryOperation::Delete => count.delete += 1,
                QueryOperation::Other => count.other += 1,
            }
        }

        Ok(())
    }
}
