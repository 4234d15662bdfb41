//! Unified error types for the costing engine.
//!
//! Errors fall into two groups: client errors (a reference that does not resolve, malformed
//! input) and server errors (storage or configuration failures). Any error raised inside a
//! unit of work aborts it and rolls the whole transaction back.

use std::fmt;
use thiserror::Error;

/// The kind of catalog entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A raw material
    Material,
    /// A finished product
    Product,
    /// A catalog service (painting, welding, ...)
    Service,
    /// A worker
    Worker,
    /// A production process
    Process,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Material => "material",
            Self::Product => "product",
            Self::Service => "service",
            Self::Worker => "worker",
            Self::Process => "process",
        };
        f.write_str(label)
    }
}

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An explicit identifier did not resolve to an active entity
    #[error("{kind} not found: {reference}")]
    ReferenceNotFound {
        /// What was being looked up
        kind: EntityKind,
        /// The identifier or name supplied by the caller
        reference: String,
    },

    /// The product targeted by a flow does not exist or is retired
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Product identifier
        id: i64,
    },

    /// The process targeted by a flow does not exist or is retired
    #[error("Process not found: {id}")]
    ProcessNotFound {
        /// Process identifier
        id: i64,
    },

    /// Malformed input (blank name, non-positive id or quantity)
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Human readable description
        message: String,
    },

    /// A monetary amount was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// An active catalog entry already uses this name
    #[error("Name already in use: {name}")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// Storage failure during a read, write or recompute
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description
        message: String,
    },

    /// I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::ReferenceNotFound`] keyed by numeric id.
    #[must_use]
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        Self::ReferenceNotFound {
            kind,
            reference: id.to_string(),
        }
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::ReferenceNotFound { .. }
                | Self::ProductNotFound { .. }
                | Self::ProcessNotFound { .. }
                | Self::InvalidInput { .. }
                | Self::InvalidAmount { .. }
                | Self::DuplicateName { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
