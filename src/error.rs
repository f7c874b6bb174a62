//! Error types for pool admission
//!
//! A rejected admission carries every violation found, so one response tells
//! the user everything that has to be fixed.

use thiserror::Error;

use crate::admission::Violation;

/// Main error type for pool admission
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pool specification or transition is not allowed
    #[error("ManagedMachinePool {pool} rejected: {}", join_violations(.violations))]
    Rejected {
        /// Name of the pool under admission
        pool: String,
        /// Every violation found, in evaluation order
        violations: Vec<Violation>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Webhook server error
    #[error("server error [{context}]: {message}")]
    Server {
        /// Description of what failed
        message: String,
        /// Where the error occurred (e.g., "config", "tls", "listener")
        context: String,
    },
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Turn a violation list into a result: empty means accepted
    pub fn reject_if_any(pool: impl Into<String>, violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Rejected {
                pool: pool.into(),
                violations,
            })
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a server error with context
    pub fn server(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Server {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Violations carried by a rejection, empty for every other variant
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Rejected { violations, .. } => violations,
            _ => &[],
        }
    }

    /// Returns true if this error is a user-facing rejection
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
