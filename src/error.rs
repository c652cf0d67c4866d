// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for the proxy layer
//!
//! Everything the proxies surface to callers goes through [`ProxyError`].
//! Delegate faults are carried verbatim: there is no wrapper to unwrap on
//! the caller side, the original cause is the error value itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all proxy operations
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ProxyError {
    #[error("Driver call failed: {message}")]
    Driver { message: String },

    #[error("Query transformation failed: {message}")]
    Transform { message: String },

    #[error("Execution listener failed: {message}")]
    Listener { message: String },

    #[error("Method not supported by delegate: {method}")]
    Unsupported { method: String },

    #[error("Call '{method}' returned an unexpected outcome, expected {expected}")]
    UnexpectedOutcome { method: String, expected: String },
}

impl ProxyError {
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver { message: msg.into() }
    }

    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform { message: msg.into() }
    }

    pub fn listener(msg: impl Into<String>) -> Self {
        Self::Listener { message: msg.into() }
    }

    pub fn unsupported(method: impl Into<String>) -> Self {
        Self::Unsupported { method: method.into() }
    }

    pub fn unexpected_outcome(method: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnexpectedOutcome {
            method: method.into(),
            expected: expected.into(),
        }
    }
}

/// Result type alias for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;
